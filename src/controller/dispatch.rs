//! Configuration request dispatch

use std::sync::Arc;

use tracing::warn;

use crate::{
    controller::Controller,
    core::{
        error::{DriverError, DriverResult},
        logging::{DebugFlags, DebugGate, InterfaceLogger},
    },
    driver::WirelessDriver,
    interface::{Interface, InterfaceRef, VirtualInterface},
    log_80211,
    protocol::ioctl::{ConfigRequest, IoctlCommand},
};

/// Interface a configuration request is addressed to
#[derive(Debug, Clone)]
pub enum IoctlTarget {
    Primary(Arc<Interface>),
    Virtual(Arc<VirtualInterface>),
}

impl IoctlTarget {
    pub fn name(&self) -> &str {
        match self {
            IoctlTarget::Primary(intf) => intf.name(),
            IoctlTarget::Virtual(vif) => vif.name(),
        }
    }

    pub fn interface(&self) -> InterfaceRef<'_> {
        match self {
            IoctlTarget::Primary(intf) => InterfaceRef::Primary(intf),
            IoctlTarget::Virtual(vif) => InterfaceRef::Virtual(vif),
        }
    }
}

impl DebugGate for IoctlTarget {
    fn logger(&self) -> Option<&InterfaceLogger> {
        match self {
            IoctlTarget::Primary(intf) => intf.logger(),
            IoctlTarget::Virtual(vif) => vif.logger(),
        }
    }
}

impl<D: WirelessDriver> Controller<D> {
    /// Resolve an interface name to the primary or an attached virtual interface
    pub async fn resolve(&self, if_name: &str) -> Option<IoctlTarget> {
        if let Some(primary) = self.network_interface().await {
            if primary.name() == if_name {
                return Some(IoctlTarget::Primary(primary));
            }
        }

        self.find_virtual_interface(if_name)
            .await
            .map(IoctlTarget::Virtual)
    }

    /// Single entry point for 802.11 ioctls
    ///
    /// `command` must be [`SIOCGA80211`](crate::protocol::ioctl::SIOCGA80211)
    /// or [`SIOCSA80211`](crate::protocol::ioctl::SIOCSA80211); anything else
    /// is not supported. Unknown interface names report
    /// [`DriverError::NoDevice`].
    pub async fn ioctl(
        &self,
        if_name: &str,
        command: u64,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        let Some(direction) = IoctlCommand::from_code(command) else {
            warn!(interface = %if_name, command, "unsupported ioctl");
            return Err(DriverError::NotSupported);
        };

        let target = self.resolve(if_name).await.ok_or(DriverError::NoDevice)?;
        match direction {
            IoctlCommand::Get => self.ioctl_get(&target, request).await,
            IoctlCommand::Set => self.ioctl_set(&target, request).await,
        }
    }

    /// Read a configuration value
    pub async fn ioctl_get(
        &self,
        target: &IoctlTarget,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        self.dispatch(IoctlCommand::Get, target, request).await
    }

    /// Write a configuration value
    pub async fn ioctl_set(
        &self,
        target: &IoctlTarget,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        self.dispatch(IoctlCommand::Set, target, request).await
    }

    async fn dispatch(
        &self,
        command: IoctlCommand,
        target: &IoctlTarget,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        if request.if_name.is_empty() {
            request.if_name = target.name().to_string();
        } else if request.if_name != target.name() {
            return Err(DriverError::InvalidArgument);
        }

        let work_loop = self.work_loop().await.ok_or(DriverError::NoDevice)?;
        let request_type = request.request_type;

        let result = work_loop
            .run_action(self.dispatch_to_driver(command, target, request))
            .await;

        match &result {
            Ok(()) => {
                log_80211!(target, DebugFlags::IOCTL, ?command, request_type = request_type.0, "request handled");
            }
            Err(e) => {
                log_80211!(target, DebugFlags::IOCTL, ?command, request_type = request_type.0, error = %e, "request failed");
            }
        }

        result
    }

    /// Runs under the gate; the target may have been detached while queued
    async fn dispatch_to_driver(
        &self,
        command: IoctlCommand,
        target: &IoctlTarget,
        request: &mut ConfigRequest,
    ) -> DriverResult<()> {
        let request_type = request.request_type;
        match target {
            IoctlTarget::Primary(intf) => {
                let current = self.network_interface().await;
                if !current.is_some_and(|current| Arc::ptr_eq(&current, intf)) {
                    return Err(DriverError::NoDevice);
                }
                self.driver
                    .request(command, request_type, intf, request)
                    .await
            }
            IoctlTarget::Virtual(vif) => {
                if !vif.is_attached() {
                    return Err(DriverError::NoDevice);
                }
                self.driver
                    .virtual_request(command, request_type, vif, request)
                    .await
            }
        }
    }
}
