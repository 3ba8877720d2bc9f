//! Interface registry of the host network stack

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    core::{
        error::{ControllerError, ControllerResult},
        types::MacAddress,
    },
    protocol::ioctl::IFNAMSIZ,
};

/// Kind of interface known to the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    Primary,
    Virtual,
}

/// Stack-visible view of an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub address: MacAddress,
    pub kind: InterfaceKind,
    pub registered: bool,
}

#[derive(Debug, Default)]
struct Registry {
    reserved: BTreeSet<String>,
    registered: BTreeMap<String, InterfaceInfo>,
}

impl Registry {
    fn lowest_free(&self, prefix: &str) -> String {
        let mut unit = 0u32;
        loop {
            let name = format!("{prefix}{unit}");
            if !self.reserved.contains(&name) {
                return name;
            }
            unit += 1;
        }
    }
}

/// Host network stack registry
///
/// Owns interface names and the registrations that make interfaces visible.
#[derive(Debug, Default)]
pub struct Stack {
    inner: RwLock<Registry>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the lowest free unit for `prefix` (`wlan0`, `wlan1`, ...)
    ///
    /// Names must leave room for the terminator of an `IFNAMSIZ` buffer.
    pub async fn reserve_name(&self, prefix: &str) -> ControllerResult<String> {
        let mut registry = self.inner.write().await;
        let name = registry.lowest_free(prefix);
        if name.len() >= IFNAMSIZ {
            return Err(ControllerError::InvalidInterfaceName(name));
        }
        registry.reserved.insert(name.clone());
        debug!(%name, "reserved interface name");
        Ok(name)
    }

    /// Name the next [`reserve_name`](Self::reserve_name) would hand out
    pub async fn next_name(&self, prefix: &str) -> String {
        self.inner.read().await.lowest_free(prefix)
    }

    /// Make a name available again; a registration must be dropped first
    pub async fn release_name(&self, name: &str) {
        let mut registry = self.inner.write().await;
        if registry.registered.contains_key(name) {
            warn!(%name, "releasing the name of a registered interface");
            registry.registered.remove(name);
        }
        registry.reserved.remove(name);
    }

    /// Make an interface visible to the stack
    pub async fn register(&self, mut info: InterfaceInfo) {
        info.registered = true;
        info!(name = %info.name, address = %info.address, kind = ?info.kind, "interface registered");
        let mut registry = self.inner.write().await;
        registry.reserved.insert(info.name.clone());
        registry.registered.insert(info.name.clone(), info);
    }

    /// Hide an interface; returns whether it was registered
    pub async fn unregister(&self, name: &str) -> bool {
        let removed = self.inner.write().await.registered.remove(name).is_some();
        if removed {
            info!(%name, "interface unregistered");
        }
        removed
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.inner.read().await.registered.contains_key(name)
    }

    /// Registered interfaces ordered by name
    pub async fn registered(&self) -> Vec<InterfaceInfo> {
        self.inner.read().await.registered.values().cloned().collect()
    }
}
