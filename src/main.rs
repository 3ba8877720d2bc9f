//! wlan-controller: loopback 802.11 controller with a control socket

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wlan_controller::{
    Controller, LoopbackDriver,
    config::{CliArgs, Settings},
    stack::{Provider, Stack},
    transport::UnixSocketServer,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wlan_controller=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    info!(?args, "starting wlan controller");
    let settings = Settings::try_from(args)
        .inspect_err(|e| error!(error = %e, "invalid configuration"))?;

    let driver = LoopbackDriver::new(settings.hardware_address);
    let controller = Arc::new(
        Controller::new(
            driver,
            Provider::new(settings.provider.clone(), 0, 0),
            Arc::new(Stack::new()),
        )
        .with_interface_prefix(settings.interface_prefix.clone())
        .with_debug_flags(settings.debug_flags),
    );

    let primary = controller.attach_interface(true).await?;
    info!(interface = %primary.name(), address = %primary.hardware_address(), "primary interface up");

    for spec in &settings.virtual_interfaces {
        match controller
            .attach_virtual_interface(spec.address, spec.role, true)
            .await
        {
            Ok(vif) => info!(interface = %vif.name(), role = ?spec.role, "virtual interface up"),
            Err(e) => warn!(address = %spec.address, error = %e, "virtual interface not attached"),
        }
    }

    let output_task = controller.start_output_queue().await?;

    let server = UnixSocketServer::new(
        settings.socket_path.clone(),
        settings.socket_mode,
        controller.clone(),
    );
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            error!(error = %e, "control socket failed");
        }
    });

    info!(socket = %settings.socket_path, "controller running");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT, shutting down");
        }
        _ = shutdown_signal() => {
            info!("received SIGTERM, shutting down");
        }
        _ = server_task => {
            warn!("control socket stopped");
        }
    }

    if let Err(e) = controller.detach_interface().await {
        warn!(error = %e, "detach on shutdown failed");
    }
    if let Some(task) = output_task {
        task.abort();
    }
    if let Err(e) = tokio::fs::remove_file(&settings.socket_path).await {
        warn!(error = %e, "control socket not removed");
    }

    info!("shut down");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!(error = %e, "failed to register SIGTERM handler");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    std::future::pending::<()>().await
}
