//! Control socket server

use std::{
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{
    fs,
    net::{UnixListener, UnixStream},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{error, info, warn};

use crate::{
    controller::{Controller, ControllerEvent},
    core::error::TransportResult,
    driver::WirelessDriver,
    protocol::{
        JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, Notification, RequestId,
    },
    transport::unix_socket::{
        handler::RequestHandler,
        session::{SessionReader, UnixSocketSession},
    },
};

/// Line-oriented JSON-RPC server on a Unix domain socket
///
/// Every client receives controller lifecycle events as notifications
/// alongside the responses to its own requests.
pub struct UnixSocketServer<D: WirelessDriver> {
    socket_path: PathBuf,
    socket_mode: u32,
    controller: Arc<Controller<D>>,
    handler: Arc<RequestHandler<D>>,
}

impl<D: WirelessDriver> UnixSocketServer<D> {
    pub fn new(
        socket_path: impl Into<PathBuf>,
        socket_mode: u32,
        controller: Arc<Controller<D>>,
    ) -> Self {
        Self {
            socket_path: socket_path.into(),
            socket_mode,
            handler: Arc::new(RequestHandler::new(controller.clone())),
            controller,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Bind the socket and serve clients until the task is dropped
    pub async fn start(&self) -> TransportResult<()> {
        if fs::try_exists(&self.socket_path).await? {
            fs::remove_file(&self.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        fs::set_permissions(
            &self.socket_path,
            std::fs::Permissions::from_mode(self.socket_mode),
        )
        .await?;
        info!(
            path = %self.socket_path.display(),
            mode = %format!("{:o}", self.socket_mode),
            "control socket listening"
        );

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let handler = self.handler.clone();
                    let events = self.controller.subscribe_events();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_client(stream, handler, events).await {
                            error!(error = %e, "control client failed");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }
    }

    async fn handle_client(
        stream: UnixStream,
        handler: Arc<RequestHandler<D>>,
        mut events: broadcast::Receiver<ControllerEvent>,
    ) -> TransportResult<()> {
        let (read_half, write_half) = stream.into_split();
        let session = UnixSocketSession::new(write_half);
        let mut reader = SessionReader::new(read_half);

        info!(session = %session.id(), "control client connected");

        loop {
            tokio::select! {
                line = reader.read_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                        Ok(request) => handler.handle_request(request).await,
                        Err(e) => {
                            warn!(session = %session.id(), error = %e, "invalid control request");
                            let id = RequestId::Number(0);
                            JsonRpcResponse::error(JsonRpcError::parse_error(), id)
                        }
                    };
                    session.send_response(&response).await?;
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        let notification = JsonRpcNotification::from(Notification::from(event));
                        session.send_notification(&notification).await?;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(session = %session.id(), missed, "control client missed events");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        info!(session = %session.id(), "control client disconnected");
        Ok(())
    }
}
