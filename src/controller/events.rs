//! Lifecycle notifications broadcast by the controller

use serde::{Deserialize, Serialize};

use crate::{
    core::types::PowerState,
    stack::{InterfaceInfo, InterfaceKind},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerEvent {
    InterfaceAttached(InterfaceInfo),
    InterfaceDetached { name: String, kind: InterfaceKind },
    PowerStateChanged(PowerState),
}
