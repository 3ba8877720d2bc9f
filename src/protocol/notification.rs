//! Notification message types (server-to-client events)

use serde::{Deserialize, Serialize};

use crate::{
    controller::ControllerEvent,
    core::types::PowerState,
    stack::{InterfaceInfo, InterfaceKind},
};

/// Server-to-client notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", content = "params")]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    InterfaceAttached(InterfaceInfo),

    InterfaceDetached(InterfaceDetachedParams),

    PowerStateChanged(PowerStateChangedParams),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceDetachedParams {
    pub name: String,
    pub kind: InterfaceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PowerStateChangedParams {
    pub state: PowerState,
}

impl From<ControllerEvent> for Notification {
    fn from(event: ControllerEvent) -> Self {
        match event {
            ControllerEvent::InterfaceAttached(info) => Notification::InterfaceAttached(info),
            ControllerEvent::InterfaceDetached { name, kind } => {
                Notification::InterfaceDetached(InterfaceDetachedParams { name, kind })
            }
            ControllerEvent::PowerStateChanged(state) => {
                Notification::PowerStateChanged(PowerStateChangedParams { state })
            }
        }
    }
}
