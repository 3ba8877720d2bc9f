//! 802.11 controller
//!
//! The generic half of a wireless network driver: a [`Controller`] attaches a
//! primary network interface plus any number of virtual interfaces, moves
//! packets between a [`WirelessDriver`] and the host stack, and funnels every
//! 802.11 configuration ioctl into the driver's `request` hook.
//!
//! A [`LoopbackDriver`] software radio is bundled; the `wlan-controller`
//! binary serves it over a Unix socket (JSON-RPC 2.0).

pub mod config;
pub mod controller;
pub mod core;
pub mod driver;
pub mod interface;
pub mod protocol;
pub mod stack;
pub mod transport;
pub mod workloop;

pub use controller::{Controller, ControllerEvent, IoctlTarget};
pub use core::{
    error::{ControllerError, DriverError, TransportError},
    logging::DebugFlags,
    types::{Dlt, MacAddress, Packet, PowerState, VirtualInterfaceRole},
};
pub use driver::{LoopbackDriver, WirelessDriver};
pub use interface::{Interface, VirtualInterface};
pub use workloop::WorkLoop;
