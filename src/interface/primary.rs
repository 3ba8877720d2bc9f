//! Primary interface: the radio's endpoint in the network stack

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    core::{
        logging::{DebugFlags, DebugGate, InterfaceLogger},
        types::{MacAddress, Packet},
    },
    interface::Endpoint,
    stack::{BpfTap, DataLinkReceiver, InterfaceInfo, InterfaceKind},
};

/// Primary network interface of a controller
///
/// Exactly one exists per attached controller. The controller keeps an `Arc`
/// handle; visibility in the stack is tracked by the stack's registry.
#[derive(Debug)]
pub struct Interface {
    endpoint: Endpoint,
    registered: AtomicBool,
}

impl Interface {
    pub(crate) fn new(name: String, address: MacAddress, flags: DebugFlags) -> Self {
        Self {
            endpoint: Endpoint::new(name, address, flags),
            registered: AtomicBool::new(false),
        }
    }

    /// BSD name, e.g. `wlan0`
    pub fn name(&self) -> &str {
        self.endpoint.logger.name()
    }

    pub fn hardware_address(&self) -> MacAddress {
        self.endpoint.address
    }

    pub fn debug_flags(&self) -> DebugFlags {
        self.endpoint.logger.flags()
    }

    pub fn set_debug_flags(&self, flags: DebugFlags) {
        self.endpoint.logger.set_flags(flags);
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub(crate) fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::Release);
    }

    /// Claim the receive side of the data link; only the first caller gets it
    pub fn take_receiver(&self) -> Option<DataLinkReceiver> {
        self.endpoint.take_receiver()
    }

    /// Passive taps attached to this interface
    pub fn tap(&self) -> &BpfTap {
        &self.endpoint.tap
    }

    pub fn rx_packets(&self) -> u64 {
        self.endpoint.data_link.delivered()
    }

    pub fn rx_dropped(&self) -> u64 {
        self.endpoint.data_link.dropped()
    }

    pub(crate) fn input(&self, packet: Packet) -> bool {
        self.endpoint.input(packet)
    }

    pub fn info(&self) -> InterfaceInfo {
        InterfaceInfo {
            name: self.name().to_string(),
            address: self.hardware_address(),
            kind: InterfaceKind::Primary,
            registered: self.is_registered(),
        }
    }
}

impl DebugGate for Interface {
    fn logger(&self) -> Option<&InterfaceLogger> {
        Some(&self.endpoint.logger)
    }
}
