//! Provider the controller was matched against

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bus device backing a controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub vendor_id: u16,
    pub device_id: u16,
}

impl Provider {
    pub fn new(name: impl Into<String>, vendor_id: u16, device_id: u16) -> Self {
        Self {
            name: name.into(),
            vendor_id,
            device_id,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:04x}:{:04x}]",
            self.name, self.vendor_id, self.device_id
        )
    }
}
