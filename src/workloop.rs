//! Serializing execution context of a controller

use std::future::Future;

use tokio::{runtime::Handle, sync::Mutex, task::JoinHandle};
use tracing::debug;

use crate::core::error::{ControllerError, ControllerResult};

/// One per controller
///
/// Gated actions run one at a time, in the order they acquired the gate.
/// Driver events (deferred completions, interrupts) are spawned onto the
/// runtime the loop was created on.
#[derive(Debug)]
pub struct WorkLoop {
    name: String,
    handle: Handle,
    gate: Mutex<()>,
}

impl WorkLoop {
    /// Bind a new work loop to the current runtime
    pub fn new(name: impl Into<String>) -> ControllerResult<Self> {
        let handle = Handle::try_current().map_err(|_| ControllerError::WorkLoopUnavailable)?;
        let name = name.into();
        debug!(%name, "work loop created");

        Ok(Self {
            name,
            handle,
            gate: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `action` with the gate closed
    pub async fn run_action<F: Future>(&self, action: F) -> F::Output {
        let _gate = self.gate.lock().await;
        action.await
    }

    /// Whether an action currently holds the gate
    pub fn in_action(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Schedule driver work on the loop's runtime
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}
