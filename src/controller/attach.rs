//! Interface attachment: primary interface and virtual interfaces

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    controller::{Controller, ControllerEvent},
    core::{
        error::{ControllerError, ControllerResult},
        logging::DebugFlags,
        types::{MacAddress, VirtualInterfaceRole},
    },
    driver::WirelessDriver,
    interface::{Interface, VirtualInterface},
    log_80211,
    stack::InterfaceKind,
};

impl<D: WirelessDriver> Controller<D> {
    /// Create and bind the primary interface
    ///
    /// Creates the work loop first if needed. With `register` the interface
    /// becomes visible to the stack right away. A second call fails with
    /// [`ControllerError::AlreadyAttached`] and leaves the attached interface
    /// alone. The driver's `data_link_layer_attach_complete` runs last.
    pub async fn attach_interface(&self, register: bool) -> ControllerResult<Arc<Interface>> {
        let work_loop = self.create_work_loop().await?;
        work_loop.run_action(self.attach_primary(register)).await
    }

    /// Tear down every interface: virtual interfaces first, then the primary
    ///
    /// The whole teardown holds the work-loop gate, so no virtual interface
    /// can be attached halfway through.
    pub async fn detach_interface(&self) -> ControllerResult<()> {
        let Some(work_loop) = self.work_loop().await else {
            return Err(ControllerError::PrimaryNotAttached);
        };

        work_loop.run_action(self.detach_all()).await
    }

    /// Build an unattached virtual interface
    ///
    /// The name is the next free one for `role` but stays unreserved until
    /// the interface is attached.
    pub async fn create_virtual_interface(
        &self,
        address: MacAddress,
        role: VirtualInterfaceRole,
    ) -> ControllerResult<VirtualInterface> {
        if !address.is_valid_unicast() {
            return Err(ControllerError::InvalidHardwareAddress(address));
        }

        let name = self.stack.next_name(role.name_prefix()).await;
        Ok(VirtualInterface::new(name, address, role, self.debug_flags))
    }

    /// Create and attach a virtual interface sharing the radio
    ///
    /// Fails without touching the interface set when the primary interface is
    /// not attached, the address is taken, or the driver's
    /// `enable_virtual_interface` refuses.
    pub async fn attach_virtual_interface(
        &self,
        address: MacAddress,
        role: VirtualInterfaceRole,
        register: bool,
    ) -> ControllerResult<Arc<VirtualInterface>> {
        let work_loop = self
            .work_loop()
            .await
            .ok_or(ControllerError::PrimaryNotAttached)?;

        work_loop
            .run_action(self.attach_virtual(address, role, register))
            .await
    }

    /// Detach a virtual interface
    ///
    /// Detaching an interface that is not attached is reported as
    /// [`ControllerError::NotAttached`]; nothing else changes.
    pub async fn detach_virtual_interface(&self, vif: &VirtualInterface) -> ControllerResult<()> {
        let work_loop = self
            .work_loop()
            .await
            .ok_or_else(|| ControllerError::NotAttached(vif.name().to_string()))?;

        work_loop.run_action(self.detach_virtual(vif)).await
    }

    /// Attached virtual interface by name
    pub async fn find_virtual_interface(&self, name: &str) -> Option<Arc<VirtualInterface>> {
        self.virtuals
            .read()
            .await
            .iter()
            .find(|vif| vif.name() == name)
            .cloned()
    }

    async fn attach_primary(&self, register: bool) -> ControllerResult<Arc<Interface>> {
        if let Some(existing) = self.primary.read().await.as_ref() {
            warn!(interface = %existing.name(), "primary interface already attached");
            return Err(ControllerError::AlreadyAttached);
        }

        let address = self.driver.hardware_address().await?;
        if !address.is_valid_unicast() {
            return Err(ControllerError::InvalidHardwareAddress(address));
        }

        let name = self.stack.reserve_name(&self.interface_prefix).await?;
        let interface = Arc::new(Interface::new(name, address, self.debug_flags));
        if register {
            self.stack.register(interface.info()).await;
            interface.set_registered(true);
        }
        *self.primary.write().await = Some(interface.clone());

        info!(interface = %interface.name(), %address, provider = %self.provider, "primary interface attached");
        self.driver.data_link_layer_attach_complete(&interface).await;
        self.emit(ControllerEvent::InterfaceAttached(interface.info()));

        Ok(interface)
    }

    async fn detach_all(&self) -> ControllerResult<()> {
        if self.primary.read().await.is_none() {
            return Err(ControllerError::PrimaryNotAttached);
        }

        let virtuals = self.virtuals.read().await.clone();
        for vif in virtuals {
            self.detach_virtual(&vif).await?;
        }
        self.detach_primary().await
    }

    async fn detach_primary(&self) -> ControllerResult<()> {
        let interface = self
            .primary
            .write()
            .await
            .take()
            .ok_or(ControllerError::PrimaryNotAttached)?;

        if interface.is_registered() {
            self.stack.unregister(interface.name()).await;
            interface.set_registered(false);
        }
        self.stack.release_name(interface.name()).await;

        info!(interface = %interface.name(), "primary interface detached");
        self.emit(ControllerEvent::InterfaceDetached {
            name: interface.name().to_string(),
            kind: InterfaceKind::Primary,
        });
        Ok(())
    }

    async fn attach_virtual(
        &self,
        address: MacAddress,
        role: VirtualInterfaceRole,
        register: bool,
    ) -> ControllerResult<Arc<VirtualInterface>> {
        let primary = self
            .network_interface()
            .await
            .ok_or(ControllerError::PrimaryNotAttached)?;

        if self.address_in_use(&primary, address).await {
            log_80211!(primary, DebugFlags::ERROR, %address, "virtual interface address in use");
            return Err(ControllerError::AddressInUse(address));
        }

        if !address.is_valid_unicast() {
            return Err(ControllerError::InvalidHardwareAddress(address));
        }

        let name = self.stack.reserve_name(role.name_prefix()).await?;
        let vif = Arc::new(VirtualInterface::new(name, address, role, self.debug_flags));
        if let Err(e) = self.driver.enable_virtual_interface(&vif).await {
            warn!(interface = %vif.name(), error = %e, "driver rejected virtual interface");
            self.stack.release_name(vif.name()).await;
            return Err(ControllerError::EnableRejected(e));
        }

        self.driver.set_virtual_hardware_address(&vif, address).await;
        vif.set_attached(true);
        self.virtuals.write().await.push(vif.clone());

        if register {
            self.stack.register(vif.info()).await;
            vif.set_registered(true);
        }

        log_80211!(primary, DebugFlags::ATTACH, vif = %vif.name(), ?role, "virtual interface attached");
        self.emit(ControllerEvent::InterfaceAttached(vif.info()));
        Ok(vif)
    }

    async fn detach_virtual(&self, vif: &VirtualInterface) -> ControllerResult<()> {
        let removed = {
            let mut virtuals = self.virtuals.write().await;
            virtuals
                .iter()
                .position(|attached| std::ptr::eq(Arc::as_ptr(attached), vif))
                .map(|index| virtuals.remove(index))
        };

        let Some(removed) = removed else {
            warn!(interface = %vif.name(), "detach of virtual interface that is not attached");
            return Err(ControllerError::NotAttached(vif.name().to_string()));
        };

        removed.set_attached(false);
        if let Err(e) = self.driver.disable_virtual_interface(&removed).await {
            warn!(interface = %removed.name(), error = %e, "driver failed to release virtual interface");
        }

        if removed.is_registered() {
            self.stack.unregister(removed.name()).await;
            removed.set_registered(false);
        }
        self.stack.release_name(removed.name()).await;

        log_80211!(removed, DebugFlags::ATTACH, "virtual interface detached");
        self.emit(ControllerEvent::InterfaceDetached {
            name: removed.name().to_string(),
            kind: InterfaceKind::Virtual,
        });
        Ok(())
    }

    async fn address_in_use(&self, primary: &Interface, address: MacAddress) -> bool {
        primary.hardware_address() == address
            || self
                .virtuals
                .read()
                .await
                .iter()
                .any(|vif| vif.hardware_address() == address)
    }
}
