//! Mock driver for testing

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    core::{
        error::{DriverError, DriverResult},
        types::{MacAddress, Packet, PowerState},
    },
    driver::WirelessDriver,
    interface::{Interface, VirtualInterface},
    protocol::ioctl::{ConfigRequest, IoctlCommand, RequestType},
};

/// Which driver entry point a request reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchTarget {
    Primary(String),
    Virtual(String),
}

/// One recorded configuration request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub target: DispatchTarget,
    pub command: IoctlCommand,
    pub request_type: RequestType,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<RecordedRequest>,
    request_failure: Option<DriverError>,
    address_failure: Option<DriverError>,
    enable_failure: Option<DriverError>,
    dma_failure: Option<DriverError>,
    dma_stops: usize,
    attach_completed: Vec<String>,
    programmed_addresses: Vec<(String, MacAddress)>,
    disabled: Vec<String>,
    transmitted: Vec<Packet>,
    power_states: Vec<PowerState>,
}

/// Mock driver recording every hook the controller calls
///
/// Only the hooks tests need are overridden; monitor mode, features and
/// country code keep their "not supported" defaults.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    inner: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub const ADDRESS: MacAddress = MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0xaa]);
    pub const SSID: &'static [u8] = b"mock-net";

    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next configuration requests fail
    pub async fn set_request_failure(&self, failure: Option<DriverError>) {
        self.inner.lock().await.request_failure = failure;
    }

    /// Make `hardware_address` fail
    pub async fn set_address_failure(&self, failure: Option<DriverError>) {
        self.inner.lock().await.address_failure = failure;
    }

    /// Make `enable_virtual_interface` refuse
    pub async fn set_enable_failure(&self, failure: Option<DriverError>) {
        self.inner.lock().await.enable_failure = failure;
    }

    /// Make `stop_dma` fail
    pub async fn set_dma_failure(&self, failure: Option<DriverError>) {
        self.inner.lock().await.dma_failure = failure;
    }

    pub async fn dma_stops(&self) -> usize {
        self.inner.lock().await.dma_stops
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().await.requests.clone()
    }

    pub async fn attach_completed(&self) -> Vec<String> {
        self.inner.lock().await.attach_completed.clone()
    }

    pub async fn programmed_addresses(&self) -> Vec<(String, MacAddress)> {
        self.inner.lock().await.programmed_addresses.clone()
    }

    pub async fn disabled(&self) -> Vec<String> {
        self.inner.lock().await.disabled.clone()
    }

    pub async fn transmitted(&self) -> Vec<Packet> {
        self.inner.lock().await.transmitted.clone()
    }

    pub async fn power_states(&self) -> Vec<PowerState> {
        self.inner.lock().await.power_states.clone()
    }
}

impl WirelessDriver for MockDriver {
    async fn request(
        &self,
        command: IoctlCommand,
        request_type: RequestType,
        interface: &Interface,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        state.requests.push(RecordedRequest {
            target: DispatchTarget::Primary(interface.name().to_string()),
            command,
            request_type,
        });

        if let Some(failure) = state.request_failure {
            return Err(failure);
        }

        if command == IoctlCommand::Get && request_type == RequestType::SSID {
            request.data = Self::SSID.to_vec();
        }
        Ok(())
    }

    async fn hardware_address(&self) -> DriverResult<MacAddress> {
        match self.inner.lock().await.address_failure {
            Some(failure) => Err(failure),
            None => Ok(Self::ADDRESS),
        }
    }

    async fn virtual_request(
        &self,
        command: IoctlCommand,
        request_type: RequestType,
        vif: &VirtualInterface,
        _request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        state.requests.push(RecordedRequest {
            target: DispatchTarget::Virtual(vif.name().to_string()),
            command,
            request_type,
        });

        match state.request_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    async fn output_packet(&self, _interface: &Interface, packet: Packet) -> DriverResult<()> {
        self.inner.lock().await.transmitted.push(packet);
        Ok(())
    }

    async fn stop_dma(&self) -> DriverResult<()> {
        let mut state = self.inner.lock().await;
        if let Some(failure) = state.dma_failure {
            return Err(failure);
        }
        state.dma_stops += 1;
        Ok(())
    }

    async fn data_link_layer_attach_complete(&self, interface: &Interface) {
        self.inner
            .lock()
            .await
            .attach_completed
            .push(interface.name().to_string());
    }

    async fn enable_virtual_interface(&self, _vif: &VirtualInterface) -> DriverResult<()> {
        match self.inner.lock().await.enable_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    async fn disable_virtual_interface(&self, vif: &VirtualInterface) -> DriverResult<()> {
        self.inner.lock().await.disabled.push(vif.name().to_string());
        Ok(())
    }

    async fn set_virtual_hardware_address(&self, vif: &VirtualInterface, addr: MacAddress) {
        self.inner
            .lock()
            .await
            .programmed_addresses
            .push((vif.name().to_string(), addr));
    }

    async fn system_power_state_changed(&self, state: PowerState) {
        self.inner.lock().await.power_states.push(state);
    }
}
