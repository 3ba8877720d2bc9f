//! 802.11 configuration request encoding
//!
//! The stack issues one of two ioctl commands carrying a [`ConfigRequest`].
//! The request type selects what is read or written; payload layouts are
//! defined per request type by the driver.

use serde::{Deserialize, Serialize};

/// `_IOW('i', 200, struct apple80211req)`
pub const SIOCSA80211: u64 = 0x8028_69C8;
/// `_IOWR('i', 201, struct apple80211req)`
pub const SIOCGA80211: u64 = 0xC028_69C9;

/// Maximum interface name length, terminator included
pub const IFNAMSIZ: usize = 16;

/// Direction of a configuration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoctlCommand {
    Get,
    Set,
}

impl IoctlCommand {
    /// Decode an ioctl command, `None` for anything not 802.11
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            SIOCGA80211 => Some(IoctlCommand::Get),
            SIOCSA80211 => Some(IoctlCommand::Set),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            IoctlCommand::Get => SIOCGA80211,
            IoctlCommand::Set => SIOCSA80211,
        }
    }
}

/// Request type carried in a configuration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestType(pub u32);

impl RequestType {
    pub const SSID: RequestType = RequestType(1);
    pub const AUTH_TYPE: RequestType = RequestType(2);
    pub const CIPHER_KEY: RequestType = RequestType(3);
    pub const CHANNEL: RequestType = RequestType(4);
    pub const POWERSAVE: RequestType = RequestType(5);
    pub const PROTMODE: RequestType = RequestType(6);
    pub const TXPOWER: RequestType = RequestType(7);
    pub const RATE: RequestType = RequestType(8);
    pub const BSSID: RequestType = RequestType(9);
    pub const SCAN_REQ: RequestType = RequestType(10);
    pub const SCAN_RESULT: RequestType = RequestType(11);
    pub const CARD_CAPABILITIES: RequestType = RequestType(12);
    pub const STATE: RequestType = RequestType(13);
    pub const PHY_MODE: RequestType = RequestType(14);
    pub const OP_MODE: RequestType = RequestType(15);
    pub const RSSI: RequestType = RequestType(16);
    pub const NOISE: RequestType = RequestType(17);
    pub const POWER: RequestType = RequestType(19);
    pub const ASSOCIATE: RequestType = RequestType(20);
    pub const DISASSOCIATE: RequestType = RequestType(22);
    pub const DRIVER_VERSION: RequestType = RequestType(43);
    pub const COUNTRY_CODE: RequestType = RequestType(51);
}

/// Configuration request envelope
///
/// Gets fill `value` and/or `data` in place; sets read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    /// Target interface; filled in by dispatch when empty
    #[serde(default)]
    pub if_name: String,
    pub request_type: RequestType,
    #[serde(default)]
    pub value: i32,
    #[serde(default, with = "hex_payload")]
    pub data: Vec<u8>,
}

impl ConfigRequest {
    pub fn new(request_type: RequestType) -> Self {
        Self {
            if_name: String::new(),
            request_type,
            value: 0,
            data: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    pub fn for_interface(mut self, if_name: impl Into<String>) -> Self {
        self.if_name = if_name.into();
        self
    }
}

/// Payload bytes travel hex-encoded in JSON
mod hex_payload {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
