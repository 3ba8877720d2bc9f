//! Generic half of an 802.11 controller
//!
//! [`Controller`] binds a [`WirelessDriver`] to the host stack: it owns the
//! work loop, the primary interface handle and the virtual interfaces, routes
//! packets in both directions and dispatches configuration requests.
//!
//! Bring-up order: [`create_work_loop`](Controller::create_work_loop) (done
//! implicitly by attach), [`attach_interface`](Controller::attach_interface),
//! then any number of virtual interfaces. Transport and dispatch report
//! "not attached" until the primary interface exists.

mod attach;
mod dispatch;
mod events;
mod hooks;
mod transport;

pub use {dispatch::IoctlTarget, events::ControllerEvent};

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

use tokio::sync::{Mutex, RwLock, broadcast};

use crate::{
    core::{error::ControllerResult, logging::DebugFlags, types::PowerState},
    driver::WirelessDriver,
    interface::{Interface, VirtualInterface},
    stack::{
        OutputQueue, OutputQueueDrain, Provider, Stack, output_queue::OUTPUT_QUEUE_CAPACITY,
    },
    workloop::WorkLoop,
};

const EVENT_BACKLOG: usize = 64;

/// Default name prefix of the primary interface
pub const DEFAULT_INTERFACE_PREFIX: &str = "wlan";

/// 802.11 controller instance
pub struct Controller<D: WirelessDriver> {
    driver: D,
    provider: Provider,
    stack: Arc<Stack>,
    interface_prefix: String,
    debug_flags: DebugFlags,
    work_loop: RwLock<Option<Arc<WorkLoop>>>,
    primary: RwLock<Option<Arc<Interface>>>,
    virtuals: RwLock<Vec<Arc<VirtualInterface>>>,
    output_queue: OutputQueue,
    output_drain: Mutex<Option<OutputQueueDrain>>,
    power_state: AtomicU8,
    dma_stopped: AtomicBool,
    events: broadcast::Sender<ControllerEvent>,
}

impl<D: WirelessDriver> Controller<D> {
    /// Create a controller for `driver`, matched against `provider`
    pub fn new(driver: D, provider: Provider, stack: Arc<Stack>) -> Self {
        let (output_queue, output_drain) = OutputQueue::new(OUTPUT_QUEUE_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_BACKLOG);

        Self {
            driver,
            provider,
            stack,
            interface_prefix: DEFAULT_INTERFACE_PREFIX.to_string(),
            debug_flags: DebugFlags::ERROR,
            work_loop: RwLock::new(None),
            primary: RwLock::new(None),
            virtuals: RwLock::new(Vec::new()),
            output_queue,
            output_drain: Mutex::new(Some(output_drain)),
            power_state: AtomicU8::new(PowerState::Unknown.into()),
            dma_stopped: AtomicBool::new(false),
            events,
        }
    }

    /// Name prefix for the primary interface (`wlan` gives `wlan0`)
    pub fn with_interface_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.interface_prefix = prefix.into();
        self
    }

    /// Debug categories new interfaces start with
    pub fn with_debug_flags(mut self, flags: DebugFlags) -> Self {
        self.debug_flags = flags;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn stack(&self) -> &Arc<Stack> {
        &self.stack
    }

    /// Create the work loop if it does not exist yet
    ///
    /// Fails when the caller is not running inside a tokio runtime.
    pub async fn create_work_loop(&self) -> ControllerResult<Arc<WorkLoop>> {
        let mut slot = self.work_loop.write().await;
        if let Some(work_loop) = slot.as_ref() {
            return Ok(work_loop.clone());
        }

        let work_loop = Arc::new(WorkLoop::new(format!("{}-workloop", self.provider.name))?);
        *slot = Some(work_loop.clone());
        Ok(work_loop)
    }

    pub async fn work_loop(&self) -> Option<Arc<WorkLoop>> {
        self.work_loop.read().await.clone()
    }

    /// Queue the stack uses to hand packets to
    /// [`request_packet_tx`](Self::request_packet_tx)
    pub fn output_queue(&self) -> &OutputQueue {
        &self.output_queue
    }

    /// Primary interface, once attached
    pub async fn network_interface(&self) -> Option<Arc<Interface>> {
        self.primary.read().await.clone()
    }

    /// Attached virtual interfaces in attach order
    pub async fn virtual_interfaces(&self) -> Vec<Arc<VirtualInterface>> {
        self.virtuals.read().await.clone()
    }

    /// Attached interfaces, primary included
    pub async fn interface_count(&self) -> usize {
        let primary = usize::from(self.primary.read().await.is_some());
        primary + self.virtuals.read().await.len()
    }

    /// Lifecycle notifications (attach, detach, power)
    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn power_state(&self) -> PowerState {
        PowerState::try_from(self.power_state.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn is_dma_stopped(&self) -> bool {
        self.dma_stopped.load(Ordering::Acquire)
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscriber is fine
        let _ = self.events.send(event);
    }
}
