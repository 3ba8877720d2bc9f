//! Packet transport between the driver and the stack

use std::sync::{Arc, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    controller::Controller,
    core::{
        error::{ControllerError, ControllerResult, DriverError, DriverResult},
        logging::DebugFlags,
        types::{Dlt, Packet, PowerState},
    },
    driver::WirelessDriver,
    interface::VirtualInterface,
    log_80211,
};

impl<D: WirelessDriver> Controller<D> {
    /// Hand a received packet to the primary interface's data link
    ///
    /// Packets are delivered in call order. Dropped when DMA is stopped, when
    /// no primary interface is attached or when the data link is full.
    pub async fn input_packet(&self, packet: Packet) {
        if self.is_dma_stopped() {
            debug!(len = packet.len(), "dma stopped, dropping received packet");
            return;
        }

        let Some(interface) = self.network_interface().await else {
            debug!(len = packet.len(), "no interface attached, dropping received packet");
            return;
        };

        log_80211!(interface, DebugFlags::RX, len = packet.len(), "input packet");
        if !interface.input(packet) {
            log_80211!(interface, DebugFlags::ERROR, dropped = interface.rx_dropped(), "data link full, packet dropped");
        }
    }

    /// Hand a received packet to a virtual interface's data link
    pub fn input_packet_on(&self, vif: &VirtualInterface, packet: Packet) {
        if self.is_dma_stopped() || !vif.is_attached() {
            return;
        }

        log_80211!(vif, DebugFlags::RX, len = packet.len(), "input packet");
        if !vif.input(packet) {
            log_80211!(vif, DebugFlags::ERROR, "data link full, packet dropped");
        }
    }

    /// Deliver a captured frame with an optional capture header to taps
    ///
    /// Nothing reaches the taps once DMA is stopped.
    pub async fn input_monitor_packet(&self, packet: Packet, dlt: Dlt, header: Option<&[u8]>) {
        if self.is_dma_stopped() {
            return;
        }
        let Some(interface) = self.network_interface().await else {
            return;
        };

        log_80211!(interface, DebugFlags::MONITOR, ?dlt, len = packet.len(), "monitor packet");
        interface.tap().input(dlt, header, packet);
    }

    /// Mirror an outbound packet to taps
    pub async fn bpf_output_packet(&self, dlt: Dlt, packet: Packet) {
        if self.is_dma_stopped() {
            return;
        }
        if let Some(interface) = self.network_interface().await {
            interface.tap().output(dlt, packet);
        }
    }

    /// Transmit one packet through the driver
    ///
    /// Refused with [`ControllerError::TxSuspended`] while the system sleeps
    /// or after DMA was stopped. Does not take the work-loop gate.
    pub async fn request_packet_tx(&self, packet: Packet) -> ControllerResult<()> {
        if self.power_state() == PowerState::Sleeping || self.is_dma_stopped() {
            return Err(ControllerError::TxSuspended);
        }

        let interface = self
            .network_interface()
            .await
            .ok_or(ControllerError::PrimaryNotAttached)?;

        log_80211!(interface, DebugFlags::TX, len = packet.len(), "output packet");
        self.driver.output_packet(&interface, packet).await.map_err(|e| {
            log_80211!(interface, DebugFlags::ERROR, error = %e, "transmit failed");
            ControllerError::Driver(e)
        })
    }

    /// Switch monitor mode on the primary interface
    pub async fn monitor_mode_set_enabled(&self, enabled: bool, dlt: Dlt) -> DriverResult<()> {
        let interface = self.network_interface().await.ok_or(DriverError::NoDevice)?;

        log_80211!(interface, DebugFlags::MONITOR, enabled, ?dlt, "monitor mode");
        self.driver
            .monitor_mode_set_enabled(&interface, enabled, dlt)
            .await
    }

    /// Packets queued in hardware, 0 without an interface
    pub async fn hardware_output_queue_depth(&self) -> u32 {
        match self.network_interface().await {
            Some(interface) => self.driver.hardware_output_queue_depth(&interface),
            None => 0,
        }
    }

    /// Start feeding the output queue into [`request_packet_tx`](Self::request_packet_tx)
    ///
    /// The task stops when the controller is dropped. Can only be started
    /// once; later calls return `None` inside the result.
    pub async fn start_output_queue(self: &Arc<Self>) -> ControllerResult<Option<JoinHandle<()>>> {
        let work_loop = self.create_work_loop().await?;
        let Some(mut drain) = self.output_drain.lock().await.take() else {
            return Ok(None);
        };

        let controller: Weak<Self> = Arc::downgrade(self);
        let handle = work_loop.spawn(async move {
            while let Some(packet) = drain.next().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if let Err(e) = controller.request_packet_tx(packet).await {
                    warn!(error = %e, "output queue packet not transmitted");
                }
            }
            debug!("output queue drained");
        });

        Ok(Some(handle))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::{
        controller::tests::controller,
        core::types::{MacAddress, VirtualInterfaceRole},
        driver::MockDriver,
        stack::TapDirection,
    };

    fn packet(tag: u8) -> Packet {
        Packet::new(vec![tag; 4])
    }

    #[tokio::test]
    async fn test_input_order_preserved() {
        let controller = controller(MockDriver::new());
        let primary = controller.attach_interface(true).await.unwrap();
        let mut receiver = primary.take_receiver().unwrap();

        for tag in 1..=3 {
            controller.input_packet(packet(tag)).await;
        }

        assert_eq!(receiver.recv().await, Some(packet(1)));
        assert_eq!(receiver.recv().await, Some(packet(2)));
        assert_eq!(receiver.recv().await, Some(packet(3)));
        assert_eq!(primary.rx_packets(), 3);
        assert!(primary.take_receiver().is_none());
    }

    #[tokio::test]
    async fn test_input_without_interface_is_dropped() {
        let controller = controller(MockDriver::new());
        controller.input_packet(packet(1)).await;
        assert_eq!(controller.interface_count().await, 0);
    }

    #[tokio::test]
    async fn test_input_on_virtual_interface() {
        let controller = controller(MockDriver::new());
        let primary = controller.attach_interface(true).await.unwrap();
        let vif = controller
            .attach_virtual_interface(
                MacAddress::new([2, 0, 0, 0, 0, 1]),
                VirtualInterfaceRole::SoftAp,
                true,
            )
            .await
            .unwrap();
        let mut receiver = vif.take_receiver().unwrap();

        controller.input_packet_on(&vif, packet(7));
        assert_eq!(receiver.try_recv(), Some(packet(7)));
        assert_eq!(primary.rx_packets(), 0);

        controller.detach_virtual_interface(&vif).await.unwrap();
        controller.input_packet_on(&vif, packet(8));
        assert_eq!(receiver.try_recv(), None);
    }

    #[tokio::test]
    async fn test_monitor_taps() {
        let controller = controller(MockDriver::new());
        let primary = controller.attach_interface(true).await.unwrap();
        let mut tap = primary.tap().subscribe();

        controller
            .input_monitor_packet(packet(1), Dlt::IEEE802_11_RADIO, Some(&[0xaa, 0xbb]))
            .await;
        controller.bpf_output_packet(Dlt::EN10MB, packet(2)).await;

        let captured = tap.recv().await.unwrap();
        assert_eq!(captured.dlt, Dlt::IEEE802_11_RADIO);
        assert_eq!(captured.direction, TapDirection::In);
        assert_eq!(captured.frame(), vec![0xaa, 0xbb, 1, 1, 1, 1]);

        let mirrored = tap.recv().await.unwrap();
        assert_eq!(mirrored.direction, TapDirection::Out);
        assert_eq!(mirrored.header, None);
    }

    #[tokio::test]
    async fn test_taps_silent_after_stop_dma() {
        let controller = controller(MockDriver::new());
        let primary = controller.attach_interface(true).await.unwrap();
        let mut tap = primary.tap().subscribe();

        controller.stop_dma().await.unwrap();
        controller
            .input_monitor_packet(packet(1), Dlt::IEEE802_11_RADIO, None)
            .await;
        controller.bpf_output_packet(Dlt::EN10MB, packet(2)).await;
        assert_eq!(tap.try_recv(), Err(TryRecvError::Empty));

        controller.set_system_power_state(PowerState::Awake).await;
        controller
            .input_monitor_packet(packet(3), Dlt::IEEE802_11_RADIO, None)
            .await;
        assert_eq!(tap.recv().await.unwrap().packet, packet(3));
    }

    #[tokio::test]
    async fn test_packet_tx_reaches_driver() {
        let driver = MockDriver::new();
        let controller = controller(driver.clone());

        assert_eq!(
            controller.request_packet_tx(packet(1)).await.unwrap_err(),
            ControllerError::PrimaryNotAttached
        );

        controller.attach_interface(true).await.unwrap();
        assert_ok!(controller.request_packet_tx(packet(2)).await);
        assert_eq!(driver.transmitted().await, vec![packet(2)]);
    }

    #[tokio::test]
    async fn test_packet_tx_suspended_while_sleeping() {
        let driver = MockDriver::new();
        let controller = controller(driver.clone());
        controller.attach_interface(true).await.unwrap();

        controller.set_system_power_state(PowerState::Sleeping).await;
        assert_eq!(
            controller.request_packet_tx(packet(1)).await.unwrap_err(),
            ControllerError::TxSuspended
        );

        controller.set_system_power_state(PowerState::Awake).await;
        assert_ok!(controller.request_packet_tx(packet(2)).await);
        assert_eq!(driver.transmitted().await, vec![packet(2)]);
    }

    #[tokio::test]
    async fn test_monitor_mode_defaults() {
        let controller = controller(MockDriver::new());
        assert_eq!(
            controller
                .monitor_mode_set_enabled(true, Dlt::IEEE802_11)
                .await
                .unwrap_err(),
            DriverError::NoDevice
        );

        controller.attach_interface(true).await.unwrap();
        assert_err!(controller.monitor_mode_set_enabled(true, Dlt::IEEE802_11).await);
        assert_eq!(controller.hardware_output_queue_depth().await, 0);
    }

    #[tokio::test]
    async fn test_output_queue_feeds_driver() {
        let driver = MockDriver::new();
        let controller = Arc::new(controller(driver.clone()));
        controller.attach_interface(true).await.unwrap();

        let task = controller.start_output_queue().await.unwrap();
        assert!(task.is_some());
        assert!(controller.start_output_queue().await.unwrap().is_none());

        controller.output_queue().enqueue(packet(1)).unwrap();
        controller.output_queue().enqueue(packet(2)).unwrap();

        for _ in 0..100 {
            if driver.transmitted().await.len() == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(driver.transmitted().await, vec![packet(1), packet(2)]);
    }
}
