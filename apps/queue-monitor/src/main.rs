//! LMS Remote queue monitor
//!
//! Mirrors one player's play queue through the synchronizer and logs every
//! published view and notice until Ctrl-C.

mod config;
mod poller;

use std::sync::Arc;

use anyhow::{Context, Result};
use lms_remote_lms_client::LmsClient;
use lms_remote_play_queue::{spawn_queue_sync, LmsQueueRemote, PlayerEventBus, QueueSignal};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::poller::spawn_status_poller;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "lms_remote_queue_monitor=debug,lms_remote_play_queue=debug".into()
        }))
        .with(fmt::layer())
        .init();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing::info!("Starting LMS Remote queue monitor");

    let config = Config::from_env()?;
    let player_id = config.player_id()?.to_string();

    tracing::info!(
        environment = %config.environment(),
        lms_url = %config.lms().base_url(),
        player = %player_id,
        poll_interval_ms = config.poll_interval_ms,
        page_size = config.queue().page_size,
        "Configuration loaded"
    );

    let client = LmsClient::new(config.lms()).context("Failed to create LMS client")?;

    match client.server_status().await {
        Ok(status) => tracing::info!(
            version = status.version.as_deref().unwrap_or("unknown"),
            players = status.player_count,
            "Connected to media server"
        ),
        Err(e) => tracing::warn!(error = %e, "Media server not reachable yet, polling anyway"),
    }

    let bus = PlayerEventBus::new();
    let client = Arc::new(client);

    // Subscribe before the poller starts so the first notification is seen
    let mut sync = spawn_queue_sync(
        Arc::new(LmsQueueRemote::new(client.clone())),
        Some(player_id.clone()),
        config.queue().clone(),
        bus.subscribe(),
    );

    let poller_token = CancellationToken::new();
    let poller = spawn_status_poller(
        client,
        player_id,
        config.poll_interval(),
        bus.clone(),
        poller_token.clone(),
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                }
                tracing::info!("Shutdown requested");
                break;
            }
            changed = sync.view.changed() => {
                if changed.is_err() {
                    tracing::warn!("Synchronizer stopped unexpectedly");
                    break;
                }
                let view = sync.view.borrow_and_update().clone();
                tracing::info!(
                    summary = %view.summary(),
                    held = view.len(),
                    total = view.total_count,
                    current = ?view.current_index,
                    phase = ?view.phase,
                    "Queue updated"
                );
            }
            Some(signal) = sync.signals.recv() => match signal {
                QueueSignal::Notice(text) => tracing::warn!(notice = %text, "Queue notice"),
                other => tracing::debug!(signal = ?other, "Queue signal"),
            },
        }
    }

    poller_token.cancel();
    sync.cancellation_token.cancel();

    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Status poller task failed");
    }
    if let Err(e) = sync.join_handle.await {
        tracing::error!(error = %e, "Synchronizer task failed");
    }

    tracing::info!("Queue monitor stopped");
    Ok(())
}
