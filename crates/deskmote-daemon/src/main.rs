//! Deskmote Daemon - MQTT remote desktop control service.
//!
//! Subscribes to the control topic, dispatches each inbound command against
//! the local audio mixer / keyboard, and publishes `{volume, mute}` status
//! snapshots to the status topic - after every state-changing command and,
//! optionally, on a fixed interval.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod signals;

use deskmote_core::Dispatcher;
use deskmote_device::DesktopDevice;
use deskmote_mqtt::{LinkOptions, MqttLink};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::from_env().context("Invalid configuration")?;

    // The DEBUG flag picks the default verbosity; RUST_LOG still overrides.
    let level = if config.debug { "debug" } else { "error" };
    let mut filter = EnvFilter::from_default_env();
    for target in ["deskmote_core", "deskmote_device", "deskmote_mqtt", "deskmote_daemon"] {
        filter = filter.add_directive(format!("{target}={level}").parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        broker = %config.broker_addr,
        port = config.broker_port,
        "Starting Deskmote daemon"
    );

    let (link, mut messages) = MqttLink::connect(&LinkOptions {
        broker_addr: config.broker_addr.clone(),
        broker_port: config.broker_port,
        credentials: config.credentials(),
        control_topic: config.control_topic.clone(),
    });
    let publisher = link.publisher();

    let dispatcher = Dispatcher::new(
        DesktopDevice::default(),
        publisher.clone(),
        config.status_topic.clone(),
        config.volume_step,
    );

    // Drive the broker connection in the background; the dispatcher only
    // sees raw payloads.
    let link_handle = tokio::spawn(link.run());

    let mut shutdown_rx = signals::setup_signal_handlers()?;

    // A zero delay would busy-loop; treat it as disabled.
    let status_delay = config.status_update_delay.filter(|delay| !delay.is_zero());
    let mut status_interval = status_delay.map(tokio::time::interval);
    if let Some(interval) = &status_interval {
        info!(seconds = interval.period().as_secs(), "Periodic status updates enabled");
    }

    info!(topic = %config.control_topic, "Daemon running");

    loop {
        tokio::select! {
            Some(payload) = messages.recv() => {
                // Dispatch never fails the loop; failures are classified
                // and logged inside.
                dispatcher.dispatch(&payload);
            }

            _ = tick(&mut status_interval) => {
                dispatcher.publish_status();
            }

            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    if let Err(e) = publisher.disconnect().await {
        warn!(error = %e, "Clean disconnect failed");
    }
    link_handle.abort();

    info!("Deskmote daemon stopped");
    Ok(())
}

/// Wait for the next periodic status tick, or forever when disabled.
async fn tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
