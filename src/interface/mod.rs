//! Network interfaces bound to a controller

pub mod primary;
pub mod virtual_interface;

pub use {primary::Interface, virtual_interface::VirtualInterface};

use std::sync::{Mutex, PoisonError};

use crate::{
    core::{
        logging::{DebugFlags, InterfaceLogger},
        types::{MacAddress, Packet},
    },
    stack::{BpfTap, DataLink, DataLinkReceiver, data_link},
};

/// State shared by primary and virtual interfaces
#[derive(Debug)]
pub(crate) struct Endpoint {
    address: MacAddress,
    logger: InterfaceLogger,
    data_link: DataLink,
    receiver: Mutex<Option<DataLinkReceiver>>,
    tap: BpfTap,
}

impl Endpoint {
    fn new(name: String, address: MacAddress, flags: DebugFlags) -> Self {
        let (data_link, receiver) = data_link();
        Self {
            address,
            logger: InterfaceLogger::new(name, flags),
            data_link,
            receiver: Mutex::new(Some(receiver)),
            tap: BpfTap::new(),
        }
    }

    fn take_receiver(&self) -> Option<DataLinkReceiver> {
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn input(&self, packet: Packet) -> bool {
        self.data_link.input(packet)
    }
}

/// Either kind of interface, as resolved from an interface name
#[derive(Debug, Clone, Copy)]
pub enum InterfaceRef<'a> {
    Primary(&'a Interface),
    Virtual(&'a VirtualInterface),
}

impl InterfaceRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            InterfaceRef::Primary(intf) => intf.name(),
            InterfaceRef::Virtual(vif) => vif.name(),
        }
    }

    pub fn hardware_address(&self) -> MacAddress {
        match self {
            InterfaceRef::Primary(intf) => intf.hardware_address(),
            InterfaceRef::Virtual(vif) => vif.hardware_address(),
        }
    }
}
