//! Driver-facing contract of the 802.11 controller

use trait_variant::make;

use crate::{
    core::{
        error::{DriverError, DriverResult},
        types::{CountryCodeOp, Dlt, FeatureCode, MacAddress, Packet, PowerState},
    },
    interface::{Interface, InterfaceRef, VirtualInterface},
    protocol::ioctl::{ConfigRequest, IoctlCommand, RequestType},
};

/// Hardware-specific half of an 802.11 controller
///
/// A concrete driver implements [`request`](Self::request) and
/// [`hardware_address`](Self::hardware_address). Every other hook has a
/// default meaning "not supported" (or "nothing to do"), so a minimal driver
/// only answers configuration requests.
///
/// All hooks are called by [`Controller`](crate::controller::Controller);
/// configuration requests and attach/detach hooks run inside the work loop,
/// [`output_packet`](Self::output_packet) may run concurrently with them.
///
/// `make(Send)` rewrites each `async fn` into a method returning a `Send`
/// future but keeps default bodies as written, so those bodies are `async`
/// blocks.
#[make(Send)]
pub trait WirelessDriver: Send + Sync + 'static {
    /// Handle one configuration request for the primary interface
    ///
    /// This is the only channel through which 802.11 configuration (channel,
    /// power, scan, association, keys, ...) reaches the driver. Must not block
    /// indefinitely; long hardware operations complete through later requests.
    async fn request(
        &self,
        command: IoctlCommand,
        request_type: RequestType,
        interface: &Interface,
        request: &mut ConfigRequest,
    ) -> DriverResult<()>;

    /// Permanent hardware address of the radio
    async fn hardware_address(&self) -> DriverResult<MacAddress>;

    /// Handle one configuration request for a virtual interface
    async fn virtual_request(
        &self,
        _command: IoctlCommand,
        _request_type: RequestType,
        _vif: &VirtualInterface,
        _request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        async { Err(DriverError::NotSupported) }
    }

    /// Transmit one packet handed down by the output queue
    async fn output_packet(&self, _interface: &Interface, _packet: Packet) -> DriverResult<()> {
        async { Err(DriverError::NotSupported) }
    }

    /// Switch monitor mode; `dlt` selects the capture header format
    async fn monitor_mode_set_enabled(
        &self,
        _interface: &Interface,
        _enabled: bool,
        _dlt: Dlt,
    ) -> DriverResult<()> {
        async { Err(DriverError::NotSupported) }
    }

    /// Packets queued in hardware but not yet on air
    fn hardware_output_queue_depth(&self, _interface: &Interface) -> u32 {
        0
    }

    async fn perform_country_code_operation(
        &self,
        _interface: &Interface,
        _op: CountryCodeOp,
    ) -> DriverResult<()> {
        async { Err(DriverError::NotSupported) }
    }

    /// Opt into an optional capability; success binds the driver to it
    async fn enable_feature(&self, _feature: FeatureCode) -> DriverResult<()> {
        async { Err(DriverError::NotSupported) }
    }

    /// Halt in-flight DMA; on success no packet is delivered afterwards
    async fn stop_dma(&self) -> DriverResult<()> {
        async { Err(DriverError::NotSupported) }
    }

    /// Whether the host RSN supplicant handles key management
    fn use_rsn_supplicant(&self, _interface: InterfaceRef<'_>) -> bool {
        true
    }

    /// The primary interface is attached; hardware bring-up needing the
    /// data link may start
    async fn data_link_layer_attach_complete(&self, _interface: &Interface) {
        async {}
    }

    /// Allocate per-vif hardware resources; an error aborts the attach
    async fn enable_virtual_interface(&self, _vif: &VirtualInterface) -> DriverResult<()> {
        async { Ok(()) }
    }

    /// Release what `enable_virtual_interface` allocated
    async fn disable_virtual_interface(&self, _vif: &VirtualInterface) -> DriverResult<()> {
        async { Ok(()) }
    }

    /// Program the vif's address into the hardware
    async fn set_virtual_hardware_address(&self, _vif: &VirtualInterface, _addr: MacAddress) {
        async {}
    }

    /// System power state changed; outbound traffic stays suspended while
    /// sleeping
    async fn system_power_state_changed(&self, _state: PowerState) {
        async {}
    }
}
