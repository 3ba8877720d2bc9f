//! JSON-RPC 2.0 message envelope

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::{Value, json};

use crate::{
    core::error::{ControllerError, DriverError},
    protocol::{notification::Notification, request::Request, response::Response},
};

pub const JSONRPC_VERSION: &str = "2.0";

/// The `"jsonrpc"` member; any other version string fails to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version;

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let version = String::deserialize(deserializer)?;
        if version == JSONRPC_VERSION {
            Ok(Version)
        } else {
            Err(D::Error::custom(format!(
                "unsupported jsonrpc version {version:?}"
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: Version,
    #[serde(flatten)]
    pub request: Request,
    pub id: RequestId,
}

/// Exactly one of `result` and `error` is set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: RequestId,
}

/// Server-initiated message without an id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcNotification {
    pub jsonrpc: Version,
    #[serde(flatten)]
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// Error codes used on the control socket
///
/// `-32700..=-32600` are reserved by JSON-RPC, the `-320xx` range is ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidParams,
    NotAttached,
    InvalidState,
    DriverError,
}

impl ErrorCode {
    pub const fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::NotAttached => -32001,
            ErrorCode::InvalidState => -32002,
            ErrorCode::DriverError => -32003,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, "Parse error")
    }

    /// `data.errno` carries the driver status code
    pub fn driver(error: DriverError) -> Self {
        Self {
            data: Some(json!({ "errno": error.errno() })),
            ..Self::new(ErrorCode::DriverError, error.to_string())
        }
    }
}

impl From<&ControllerError> for JsonRpcError {
    fn from(error: &ControllerError) -> Self {
        let code = match error {
            ControllerError::EnableRejected(e) | ControllerError::Driver(e) => {
                return Self::driver(*e);
            }
            ControllerError::PrimaryNotAttached | ControllerError::NotAttached(_) => {
                ErrorCode::NotAttached
            }
            ControllerError::AddressInUse(_)
            | ControllerError::InvalidHardwareAddress(_)
            | ControllerError::InvalidInterfaceName(_) => ErrorCode::InvalidParams,
            ControllerError::WorkLoopUnavailable
            | ControllerError::AlreadyAttached
            | ControllerError::TxSuspended => ErrorCode::InvalidState,
        };
        Self::new(code, error.to_string())
    }
}

impl JsonRpcRequest {
    pub fn new(request: Request, id: RequestId) -> Self {
        Self {
            jsonrpc: Version,
            request,
            id,
        }
    }
}

impl JsonRpcResponse {
    pub fn success(result: Response, id: RequestId) -> Self {
        Self::from_result(Ok(result), id)
    }

    pub fn error(error: JsonRpcError, id: RequestId) -> Self {
        Self::from_result(Err(error), id)
    }

    pub fn from_result(result: Result<Response, JsonRpcError>, id: RequestId) -> Self {
        let (result, error) = match result {
            Ok(response) => (Some(response), None),
            Err(error) => (None, Some(error)),
        };
        Self {
            jsonrpc: Version,
            result,
            error,
            id,
        }
    }
}

impl From<Notification> for JsonRpcNotification {
    fn from(notification: Notification) -> Self {
        Self {
            jsonrpc: Version,
            notification,
        }
    }
}
