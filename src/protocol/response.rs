//! Response message types

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        error::{DriverResult, status_code},
        types::PowerState,
    },
    protocol::ioctl::ConfigRequest,
    stack::InterfaceInfo,
};

/// Responses the controller sends back to a control client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    /// Ioctl outcome with the (possibly filled in) request
    Ioctl(IoctlResponse),

    /// Interface listing
    Interfaces(InterfacesResponse),

    /// Virtual interface attached
    Attached(AttachResponse),

    /// Plain acknowledgement
    Ack(AckResponse),
}

/// Response for an ioctl request
///
/// Driver failures are not JSON-RPC errors: the status code travels back the
/// way the stack would see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IoctlResponse {
    pub status: String,
    pub errno: i32,
    pub request: ConfigRequest,
}

/// Response for list_interfaces
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfacesResponse {
    pub status: String,
    pub power_state: PowerState,
    pub interfaces: Vec<InterfaceInfo>,
}

/// Response for attach_virtual
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachResponse {
    pub status: String,
    pub interface: InterfaceInfo,
}

/// Response for requests with nothing to report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AckResponse {
    pub status: String,
}

impl IoctlResponse {
    pub fn from_result(result: &DriverResult<()>, request: ConfigRequest) -> Self {
        let errno = status_code(result);
        Self {
            status: if errno == 0 { "ok" } else { "error" }.to_string(),
            errno,
            request,
        }
    }
}

impl InterfacesResponse {
    pub fn ok(power_state: PowerState, interfaces: Vec<InterfaceInfo>) -> Self {
        Self {
            status: "ok".to_string(),
            power_state,
            interfaces,
        }
    }
}

impl AttachResponse {
    pub fn ok(interface: InterfaceInfo) -> Self {
        Self {
            status: "ok".to_string(),
            interface,
        }
    }
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            error::{DriverError, errno},
            types::MacAddress,
        },
        protocol::ioctl::RequestType,
        stack::InterfaceKind,
    };

    fn wlan0() -> InterfaceInfo {
        InterfaceInfo {
            name: "wlan0".to_string(),
            address: MacAddress::new([2, 0, 0, 0, 0, 0xaa]),
            kind: InterfaceKind::Primary,
            registered: true,
        }
    }

    #[test]
    fn test_ioctl_response_success() {
        let request = ConfigRequest::new(RequestType::CHANNEL).with_value(6);
        let response = IoctlResponse::from_result(&Ok(()), request);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains(r#""status":"ok""#));
        assert!(json.contains(r#""errno":0"#));
        assert!(json.contains(r#""value":6"#));
    }

    #[test]
    fn test_ioctl_response_failure_carries_errno() {
        let request = ConfigRequest::new(RequestType::RSSI);
        let response = IoctlResponse::from_result(&Err(DriverError::NotSupported), request);

        assert_eq!(response.status, "error");
        assert_eq!(response.errno, errno::EOPNOTSUPP);
    }

    #[test]
    fn test_interfaces_response() {
        let response = InterfacesResponse::ok(PowerState::Awake, vec![wlan0()]);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains(r#""power_state":"awake""#));
        assert!(json.contains(r#""name":"wlan0""#));
        assert!(json.contains(r#""address":"02:00:00:00:00:aa""#));
        assert!(json.contains(r#""kind":"primary""#));

        let deserialized: InterfacesResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, response);
    }

    #[test]
    fn test_untagged_response_picks_variant() {
        let json = serde_json::to_string(&Response::Attached(AttachResponse::ok(wlan0()))).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, Response::Attached(_)));

        let ack: Response = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(ack, Response::Ack(AckResponse::ok()));
    }
}
