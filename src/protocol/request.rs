//! Request message types

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        logging::DebugFlags,
        types::{MacAddress, PowerState, VirtualInterfaceRole},
    },
    protocol::ioctl::{ConfigRequest, IoctlCommand},
};

/// Requests a control client sends to the controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", content = "params")]
#[serde(rename_all = "snake_case")]
pub enum Request {
    /// Issue a configuration request against an interface
    Ioctl(IoctlParams),

    /// List attached interfaces
    ListInterfaces,

    /// Attach a virtual interface
    AttachVirtual(AttachVirtualParams),

    /// Detach a virtual interface by name
    DetachVirtual(DetachVirtualParams),

    /// Deliver a system power transition
    SetPowerState(SetPowerStateParams),

    /// Change the debug categories of one interface
    SetDebugFlags(SetDebugFlagsParams),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IoctlParams {
    pub if_name: String,
    pub command: IoctlCommand,
    pub request: ConfigRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachVirtualParams {
    pub address: MacAddress,
    pub role: VirtualInterfaceRole,
    /// Make the interface visible to the stack right away
    #[serde(default = "default_register")]
    pub register: bool,
}

fn default_register() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetachVirtualParams {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetPowerStateParams {
    pub state: PowerState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetDebugFlagsParams {
    pub if_name: String,
    /// `all`, a number (`0x..` or decimal) or a comma separated list of names
    pub flags: String,
}

impl SetDebugFlagsParams {
    pub fn decode_flags(&self) -> Result<DebugFlags, String> {
        self.flags
            .parse()
            .map_err(|e| format!("invalid debug flags {:?}: {e}", self.flags))
    }
}
