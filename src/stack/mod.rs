//! Host network stack collaborators seen by the controller

pub mod bpf;
pub mod data_link;
pub mod output_queue;
pub mod provider;
pub mod registry;

pub use {
    bpf::{BpfTap, TapDirection, TappedPacket},
    data_link::{DataLink, DataLinkReceiver, data_link},
    output_queue::{OutputQueue, OutputQueueDrain},
    provider::Provider,
    registry::{InterfaceInfo, InterfaceKind, Stack},
};
