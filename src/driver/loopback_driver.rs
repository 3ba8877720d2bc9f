//! Software radio that loops transmitted frames back to the receive path

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    core::{
        error::{DriverError, DriverResult},
        types::{
            CountryCodeOp, Dlt, FeatureCode, MacAddress, Packet, PowerState, VirtualInterfaceRole,
        },
    },
    driver::WirelessDriver,
    interface::{Interface, InterfaceRef, VirtualInterface},
    protocol::ioctl::{ConfigRequest, IoctlCommand, RequestType},
};

/// Frames the radio holds while powered off
pub const TX_RING_DEPTH: usize = 64;

/// Virtual interfaces the radio can serve at once
pub const MAX_VIRTUAL_INTERFACES: usize = 4;

const MAX_SSID_LEN: usize = 32;
const MAX_TXPOWER_DBM: i32 = 30;
const WORLD_COUNTRY_CODE: &[u8; 2] = b"00";

/// Operating mode bits reported by `OP_MODE`
pub mod op_mode {
    pub const STA: i32 = 0x1;
    pub const IBSS: i32 = 0x2;
    pub const HOSTAP: i32 = 0x8;
    pub const MONITOR: i32 = 0x10;
}

/// Association state reported by `STATE`
pub mod link_state {
    pub const INIT: i32 = 0;
    pub const RUN: i32 = 4;
}

/// Capability bits reported by `CARD_CAPABILITIES`
pub mod capability {
    pub const MONITOR: u32 = 1 << 0;
    pub const HOSTAP: u32 = 1 << 1;
    pub const COUNTRY_CODE: u32 = 1 << 2;
    pub const IEEE80211N: u32 = 1 << 3;
}

#[derive(Debug, Default)]
struct VirtualState {
    address: Option<MacAddress>,
    ssid: Vec<u8>,
    op_mode: i32,
}

#[derive(Debug)]
struct RadioState {
    ssid: Vec<u8>,
    channel: i32,
    powered: bool,
    txpower: i32,
    op_mode: i32,
    country_code: [u8; 2],
    ieee80211n: bool,
    monitor: Option<Dlt>,
    dma_stopped: bool,
    power_state: PowerState,
    tx_ring: VecDeque<Packet>,
    virtuals: HashMap<String, VirtualState>,
}

impl Default for RadioState {
    fn default() -> Self {
        Self {
            ssid: Vec::new(),
            channel: 1,
            powered: true,
            txpower: 20,
            op_mode: op_mode::STA,
            country_code: *WORLD_COUNTRY_CODE,
            ieee80211n: false,
            monitor: None,
            dma_stopped: false,
            power_state: PowerState::Unknown,
            tx_ring: VecDeque::with_capacity(TX_RING_DEPTH),
            virtuals: HashMap::new(),
        }
    }
}

impl RadioState {
    fn is_sleeping(&self) -> bool {
        self.power_state == PowerState::Sleeping
    }

    /// Frames may go on air: powered, awake and DMA running
    fn can_transmit(&self) -> bool {
        self.powered && !self.is_sleeping() && !self.dma_stopped
    }

    fn capabilities(&self) -> u32 {
        let mut caps = capability::MONITOR | capability::HOSTAP | capability::COUNTRY_CODE;
        if self.ieee80211n {
            caps |= capability::IEEE80211N;
        }
        caps
    }
}

/// Reference driver backed by an in-memory radio
///
/// Transmitted frames are mirrored to the interface's taps and handed back to
/// its data link. While the radio is powered off or the system sleeps, frames
/// wait in a ring of [`TX_RING_DEPTH`] entries; they go out on the next
/// power-on request or transmit once the radio is powered and awake.
#[derive(Debug, Clone)]
pub struct LoopbackDriver {
    address: MacAddress,
    state: Arc<Mutex<RadioState>>,
    queued: Arc<AtomicU32>,
}

impl LoopbackDriver {
    pub fn new(address: MacAddress) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(RadioState::default())),
            queued: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Monitor capture format, if monitor mode is on
    pub async fn monitor_dlt(&self) -> Option<Dlt> {
        self.state.lock().await.monitor
    }

    pub async fn country_code(&self) -> [u8; 2] {
        self.state.lock().await.country_code
    }

    /// Address programmed for a virtual interface
    pub async fn virtual_address(&self, name: &str) -> Option<MacAddress> {
        self.state
            .lock()
            .await
            .virtuals
            .get(name)
            .and_then(|vif| vif.address)
    }

    fn transmit(&self, interface: &Interface, packet: Packet) {
        interface.tap().output(Dlt::EN10MB, packet.clone());
        if !interface.input(packet) {
            debug!(interface = %interface.name(), "loopback receive queue full");
        }
    }

    fn flush_ring(&self, interface: &Interface, state: &mut RadioState) {
        while let Some(packet) = state.tx_ring.pop_front() {
            self.transmit(interface, packet);
        }
        self.queued.store(0, Ordering::Release);
    }

    fn get(
        &self,
        request_type: RequestType,
        state: &RadioState,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        match request_type {
            RequestType::SSID => {
                request.data = state.ssid.clone();
                request.value = state.ssid.len() as i32;
            }
            RequestType::CHANNEL => request.value = state.channel,
            RequestType::POWER => request.value = i32::from(state.powered),
            RequestType::TXPOWER => request.value = state.txpower,
            RequestType::OP_MODE => {
                request.value = match state.monitor {
                    Some(_) => state.op_mode | op_mode::MONITOR,
                    None => state.op_mode,
                }
            }
            RequestType::STATE => {
                request.value = if state.powered && !state.ssid.is_empty() {
                    link_state::RUN
                } else {
                    link_state::INIT
                }
            }
            RequestType::CARD_CAPABILITIES => {
                request.data = state.capabilities().to_le_bytes().to_vec();
            }
            RequestType::COUNTRY_CODE => request.data = state.country_code.to_vec(),
            RequestType::DRIVER_VERSION => {
                request.data = env!("CARGO_PKG_VERSION").as_bytes().to_vec();
            }
            _ => return Err(DriverError::NotSupported),
        }
        Ok(())
    }

    fn set(
        &self,
        request_type: RequestType,
        interface: &Interface,
        state: &mut RadioState,
        request: &ConfigRequest,
    ) -> DriverResult<()> {
        match request_type {
            RequestType::SSID => {
                if state.is_sleeping() {
                    return Err(DriverError::Busy);
                }
                if request.data.len() > MAX_SSID_LEN {
                    return Err(DriverError::InvalidArgument);
                }
                state.ssid = request.data.clone();
            }
            RequestType::CHANNEL => {
                if !valid_channel(request.value) {
                    return Err(DriverError::InvalidArgument);
                }
                state.channel = request.value;
            }
            RequestType::POWER => {
                state.powered = request.value != 0;
                if state.can_transmit() {
                    self.flush_ring(interface, state);
                }
            }
            RequestType::TXPOWER => {
                if !(0..=MAX_TXPOWER_DBM).contains(&request.value) {
                    return Err(DriverError::InvalidArgument);
                }
                state.txpower = request.value;
            }
            RequestType::OP_MODE => match request.value {
                op_mode::STA | op_mode::IBSS | op_mode::HOSTAP => state.op_mode = request.value,
                _ => return Err(DriverError::InvalidArgument),
            },
            RequestType::COUNTRY_CODE => {
                let code: [u8; 2] = request
                    .data
                    .as_slice()
                    .try_into()
                    .map_err(|_| DriverError::InvalidArgument)?;
                if !code.iter().all(u8::is_ascii_alphanumeric) {
                    return Err(DriverError::InvalidArgument);
                }
                state.country_code = code.map(|c| c.to_ascii_uppercase());
            }
            _ => return Err(DriverError::NotSupported),
        }
        Ok(())
    }
}

fn valid_channel(channel: i32) -> bool {
    (1..=14).contains(&channel) || (36..=165).contains(&channel)
}

impl WirelessDriver for LoopbackDriver {
    async fn request(
        &self,
        command: IoctlCommand,
        request_type: RequestType,
        interface: &Interface,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        match command {
            IoctlCommand::Get => self.get(request_type, &state, request),
            IoctlCommand::Set => self.set(request_type, interface, &mut state, request),
        }
    }

    async fn hardware_address(&self) -> DriverResult<MacAddress> {
        Ok(self.address)
    }

    async fn virtual_request(
        &self,
        command: IoctlCommand,
        request_type: RequestType,
        vif: &VirtualInterface,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        let sleeping = state.is_sleeping();
        let vstate = state
            .virtuals
            .get_mut(vif.name())
            .ok_or(DriverError::NoDevice)?;

        match (command, request_type) {
            (IoctlCommand::Get, RequestType::SSID) => {
                request.data = vstate.ssid.clone();
                request.value = vstate.ssid.len() as i32;
            }
            (IoctlCommand::Set, RequestType::SSID) => {
                if sleeping {
                    return Err(DriverError::Busy);
                }
                if request.data.len() > MAX_SSID_LEN {
                    return Err(DriverError::InvalidArgument);
                }
                vstate.ssid = request.data.clone();
            }
            (IoctlCommand::Get, RequestType::OP_MODE) => request.value = vstate.op_mode,
            (IoctlCommand::Get, RequestType::BSSID) => {
                let bssid = vstate.address.unwrap_or(vif.hardware_address());
                request.data = bssid.octets().to_vec();
            }
            _ => return Err(DriverError::NotSupported),
        }
        Ok(())
    }

    async fn output_packet(&self, interface: &Interface, packet: Packet) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        if state.dma_stopped {
            return Err(DriverError::Io);
        }

        if state.can_transmit() {
            self.flush_ring(interface, &mut state);
            self.transmit(interface, packet);
            return Ok(());
        }

        if state.tx_ring.len() >= TX_RING_DEPTH {
            return Err(DriverError::Busy);
        }
        state.tx_ring.push_back(packet);
        self.queued.store(state.tx_ring.len() as u32, Ordering::Release);
        Ok(())
    }

    async fn monitor_mode_set_enabled(
        &self,
        _interface: &Interface,
        enabled: bool,
        dlt: Dlt,
    ) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        if !enabled {
            state.monitor = None;
            return Ok(());
        }

        match dlt {
            Dlt::IEEE802_11
            | Dlt::IEEE802_11_RADIO
            | Dlt::PRISM_HEADER
            | Dlt::IEEE802_11_RADIO_AVS => {
                state.monitor = Some(dlt);
                Ok(())
            }
            _ => Err(DriverError::InvalidArgument),
        }
    }

    fn hardware_output_queue_depth(&self, _interface: &Interface) -> u32 {
        self.queued.load(Ordering::Acquire)
    }

    async fn perform_country_code_operation(
        &self,
        _interface: &Interface,
        op: CountryCodeOp,
    ) -> DriverResult<()> {
        match op {
            CountryCodeOp::Reset => {
                self.state.lock().await.country_code = *WORLD_COUNTRY_CODE;
                info!("country code reset to world default");
            }
        }
        Ok(())
    }

    async fn enable_feature(&self, feature: FeatureCode) -> DriverResult<()> {
        match feature {
            FeatureCode::Ieee80211n => self.state.lock().await.ieee80211n = true,
        }
        Ok(())
    }

    async fn stop_dma(&self) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        state.dma_stopped = true;
        state.tx_ring.clear();
        self.queued.store(0, Ordering::Release);
        Ok(())
    }

    fn use_rsn_supplicant(&self, interface: InterfaceRef<'_>) -> bool {
        // SoftAP handles its own key exchange
        match interface {
            InterfaceRef::Primary(_) => true,
            InterfaceRef::Virtual(vif) => vif.role() != VirtualInterfaceRole::SoftAp,
        }
    }

    async fn data_link_layer_attach_complete(&self, interface: &Interface) {
        info!(interface = %interface.name(), address = %self.address, "loopback radio up");
    }

    async fn enable_virtual_interface(&self, vif: &VirtualInterface) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        if state.virtuals.len() >= MAX_VIRTUAL_INTERFACES {
            return Err(DriverError::NoMemory);
        }

        let op_mode = match vif.role() {
            VirtualInterfaceRole::SoftAp | VirtualInterfaceRole::P2pGo => op_mode::HOSTAP,
            _ => op_mode::STA,
        };
        state.virtuals.insert(
            vif.name().to_string(),
            VirtualState {
                op_mode,
                ..VirtualState::default()
            },
        );
        Ok(())
    }

    async fn disable_virtual_interface(&self, vif: &VirtualInterface) -> DriverResult<()> {
        self.state
            .lock()
            .await
            .virtuals
            .remove(vif.name())
            .map(|_| ())
            .ok_or(DriverError::NoDevice)
    }

    async fn set_virtual_hardware_address(&self, vif: &VirtualInterface, addr: MacAddress) {
        if let Some(vstate) = self.state.lock().await.virtuals.get_mut(vif.name()) {
            vstate.address = Some(addr);
        }
    }

    async fn system_power_state_changed(&self, power_state: PowerState) {
        let mut state = self.state.lock().await;
        state.power_state = power_state;
        if power_state == PowerState::Awake {
            state.dma_stopped = false;
        }
    }
}
