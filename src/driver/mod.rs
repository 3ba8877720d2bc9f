//! Driver contract and bundled drivers

pub mod loopback_driver;
#[cfg(test)]
pub mod mock_driver;
pub mod wireless_driver;

pub use loopback_driver::LoopbackDriver;
#[cfg(test)]
pub use mock_driver::MockDriver;
pub use wireless_driver::WirelessDriver;
