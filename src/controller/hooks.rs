//! Capability, DMA and power hooks

use std::sync::atomic::Ordering;

use tracing::{info, warn};

use crate::{
    controller::{Controller, ControllerEvent},
    core::{
        error::{DriverError, DriverResult},
        types::{CountryCodeOp, FeatureCode, PowerState},
    },
    driver::WirelessDriver,
    interface::InterfaceRef,
};

impl<D: WirelessDriver> Controller<D> {
    /// Ask the driver to opt into `feature`
    pub async fn enable_feature(&self, feature: FeatureCode) -> DriverResult<()> {
        let result = self.driver.enable_feature(feature).await;
        match &result {
            Ok(()) => info!(?feature, "feature enabled"),
            Err(e) => warn!(?feature, error = %e, "feature not enabled"),
        }
        result
    }

    pub async fn perform_country_code_operation(&self, op: CountryCodeOp) -> DriverResult<()> {
        let interface = self.network_interface().await.ok_or(DriverError::NoDevice)?;
        self.driver
            .perform_country_code_operation(&interface, op)
            .await
    }

    /// Halt DMA; once the driver confirms, no packet moves in either direction
    pub async fn stop_dma(&self) -> DriverResult<()> {
        self.driver.stop_dma().await?;
        self.dma_stopped.store(true, Ordering::Release);
        warn!(provider = %self.provider, "dma stopped");
        Ok(())
    }

    /// Record a system power transition and forward it to the driver
    ///
    /// Outbound traffic stays suspended while [`PowerState::Sleeping`]. Waking
    /// up also resumes a stopped DMA engine.
    pub async fn set_system_power_state(&self, state: PowerState) {
        let previous = self.power_state.swap(state.into(), Ordering::AcqRel);
        if state == PowerState::Awake {
            self.dma_stopped.store(false, Ordering::Release);
        }

        info!(from = ?PowerState::try_from(previous).unwrap_or_default(), to = ?state, "system power state changed");
        self.driver.system_power_state_changed(state).await;
        self.emit(ControllerEvent::PowerStateChanged(state));
    }

    /// Whether the host RSN supplicant handles key management for `target`
    pub fn use_rsn_supplicant(&self, target: InterfaceRef<'_>) -> bool {
        self.driver.use_rsn_supplicant(target)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        controller::tests::controller,
        core::types::{Dlt, MacAddress, Packet, VirtualInterfaceRole},
        driver::MockDriver,
        interface::Interface,
        protocol::ioctl::{ConfigRequest, IoctlCommand, RequestType, SIOCGA80211},
        stack::{Provider, Stack},
    };
    use std::sync::Arc;

    /// Implements only what every driver must
    struct MinimalDriver;

    impl WirelessDriver for MinimalDriver {
        async fn request(
            &self,
            _command: IoctlCommand,
            _request_type: RequestType,
            _interface: &Interface,
            request: &mut ConfigRequest,
        ) -> DriverResult<()> {
            request.value = 1;
            Ok(())
        }

        async fn hardware_address(&self) -> DriverResult<MacAddress> {
            Ok(MacAddress::new([0x02, 0, 0, 0, 0, 0x10]))
        }
    }

    fn minimal() -> Controller<MinimalDriver> {
        Controller::new(
            MinimalDriver,
            Provider::new("minimal", 0, 0),
            Arc::new(Stack::new()),
        )
    }

    #[tokio::test]
    async fn test_minimal_driver_optional_hooks_not_supported() {
        let controller = minimal();
        let primary = controller.attach_interface(true).await.unwrap();

        let mut request = ConfigRequest::new(RequestType::STATE);
        controller
            .ioctl(primary.name(), SIOCGA80211, &mut request)
            .await
            .unwrap();
        assert_eq!(request.value, 1);

        assert_eq!(
            controller.monitor_mode_set_enabled(true, Dlt::IEEE802_11).await,
            Err(DriverError::NotSupported)
        );
        assert_eq!(
            controller.enable_feature(FeatureCode::Ieee80211n).await,
            Err(DriverError::NotSupported)
        );
        assert_eq!(
            controller
                .perform_country_code_operation(CountryCodeOp::Reset)
                .await,
            Err(DriverError::NotSupported)
        );
        assert_eq!(controller.stop_dma().await, Err(DriverError::NotSupported));
        assert!(!controller.is_dma_stopped());
        assert_eq!(controller.hardware_output_queue_depth().await, 0);
        assert!(controller.use_rsn_supplicant(InterfaceRef::Primary(&primary)));
    }

    #[tokio::test]
    async fn test_minimal_driver_virtual_requests_not_supported() {
        let controller = minimal();
        controller.attach_interface(true).await.unwrap();
        let vif = controller
            .attach_virtual_interface(
                MacAddress::new([2, 0, 0, 0, 0, 1]),
                VirtualInterfaceRole::Station,
                false,
            )
            .await
            .unwrap();

        let mut request = ConfigRequest::new(RequestType::SSID);
        let result = controller.ioctl(vif.name(), SIOCGA80211, &mut request).await;
        assert_eq!(result, Err(DriverError::NotSupported));

        let tx = controller.request_packet_tx(Packet::new(vec![0; 14])).await;
        assert!(tx.is_err());
    }

    #[tokio::test]
    async fn test_stop_dma_halts_traffic() {
        let driver = MockDriver::new();
        let controller = controller(driver.clone());
        let primary = controller.attach_interface(true).await.unwrap();
        let mut receiver = primary.take_receiver().unwrap();

        controller.stop_dma().await.unwrap();
        assert!(controller.is_dma_stopped());
        assert_eq!(driver.dma_stops().await, 1);

        controller.input_packet(Packet::new(vec![1])).await;
        assert_eq!(receiver.try_recv(), None);
        assert!(controller.request_packet_tx(Packet::new(vec![2])).await.is_err());
        assert!(driver.transmitted().await.is_empty());

        controller.set_system_power_state(PowerState::Awake).await;
        controller.input_packet(Packet::new(vec![3])).await;
        assert_eq!(receiver.try_recv(), Some(Packet::new(vec![3])));
    }

    #[tokio::test]
    async fn test_stop_dma_failure_keeps_traffic_flowing() {
        let driver = MockDriver::new();
        driver.set_dma_failure(Some(DriverError::Busy)).await;
        let controller = controller(driver.clone());
        let primary = controller.attach_interface(true).await.unwrap();
        let mut receiver = primary.take_receiver().unwrap();

        assert_eq!(controller.stop_dma().await, Err(DriverError::Busy));
        assert!(!controller.is_dma_stopped());
        assert_eq!(driver.dma_stops().await, 0);

        controller.input_packet(Packet::new(vec![1])).await;
        assert_eq!(receiver.try_recv(), Some(Packet::new(vec![1])));
    }

    #[tokio::test]
    async fn test_power_state_forwarded_and_broadcast() {
        let driver = MockDriver::new();
        let controller = controller(driver.clone());
        let mut events = controller.subscribe_events();
        assert_eq!(controller.power_state(), PowerState::Unknown);

        controller.set_system_power_state(PowerState::Sleeping).await;
        controller.set_system_power_state(PowerState::Awake).await;

        assert_eq!(controller.power_state(), PowerState::Awake);
        assert_eq!(
            driver.power_states().await,
            vec![PowerState::Sleeping, PowerState::Awake]
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ControllerEvent::PowerStateChanged(PowerState::Sleeping)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ControllerEvent::PowerStateChanged(PowerState::Awake)
        );
    }

    #[tokio::test]
    async fn test_country_code_requires_interface() {
        let controller = controller(MockDriver::new());
        assert_eq!(
            controller
                .perform_country_code_operation(CountryCodeOp::Reset)
                .await,
            Err(DriverError::NoDevice)
        );
    }
}
