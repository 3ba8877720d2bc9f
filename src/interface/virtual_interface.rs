//! Virtual interfaces sharing the radio with the primary interface

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    core::{
        logging::{DebugFlags, DebugGate, InterfaceLogger},
        types::{MacAddress, Packet, VirtualInterfaceRole},
    },
    interface::Endpoint,
    stack::{BpfTap, DataLinkReceiver, InterfaceInfo, InterfaceKind},
};

/// Additional logical endpoint (extra SSID, soft AP, P2P) on the same radio
#[derive(Debug)]
pub struct VirtualInterface {
    endpoint: Endpoint,
    role: VirtualInterfaceRole,
    attached: AtomicBool,
    registered: AtomicBool,
}

impl VirtualInterface {
    pub(crate) fn new(
        name: String,
        address: MacAddress,
        role: VirtualInterfaceRole,
        flags: DebugFlags,
    ) -> Self {
        Self {
            endpoint: Endpoint::new(name, address, flags),
            role,
            attached: AtomicBool::new(false),
            registered: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        self.endpoint.logger.name()
    }

    pub fn hardware_address(&self) -> MacAddress {
        self.endpoint.address
    }

    pub fn role(&self) -> VirtualInterfaceRole {
        self.role
    }

    pub fn debug_flags(&self) -> DebugFlags {
        self.endpoint.logger.flags()
    }

    pub fn set_debug_flags(&self, flags: DebugFlags) {
        self.endpoint.logger.set_flags(flags);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    pub(crate) fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::Release);
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub(crate) fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::Release);
    }

    pub fn take_receiver(&self) -> Option<DataLinkReceiver> {
        self.endpoint.take_receiver()
    }

    pub fn tap(&self) -> &BpfTap {
        &self.endpoint.tap
    }

    pub fn rx_packets(&self) -> u64 {
        self.endpoint.data_link.delivered()
    }

    pub(crate) fn input(&self, packet: Packet) -> bool {
        self.endpoint.input(packet)
    }

    pub fn info(&self) -> InterfaceInfo {
        InterfaceInfo {
            name: self.name().to_string(),
            address: self.hardware_address(),
            kind: InterfaceKind::Virtual,
            registered: self.is_registered(),
        }
    }
}

impl DebugGate for VirtualInterface {
    fn logger(&self) -> Option<&InterfaceLogger> {
        Some(&self.endpoint.logger)
    }
}
