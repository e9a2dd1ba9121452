//! Player status poller
//!
//! Reads `status - 1` on a fixed interval and turns the queue change token
//! and current index into [`PlayerEvent::PlaylistDetails`] notifications.
//! Only changes are published; the synchronizer decides what a change means.

use std::time::Duration;

use lms_remote_lms_client::{LmsResult, LmsTransport, StatusResult};
use lms_remote_play_queue::{ChangeTimestamp, PlayerEvent, PlayerEventBus};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Read the queue details of `player_id`
pub async fn poll_once<T: LmsTransport>(transport: &T, player_id: &str) -> LmsResult<PlayerEvent> {
    let result = transport
        .query(player_id, vec!["status".into(), "-".into(), Value::from(1)])
        .await?;
    let status: StatusResult = serde_json::from_value(result.clone())?;

    Ok(PlayerEvent::PlaylistDetails {
        current_index: status.playlist_cur_index.map(|i| i as usize),
        timestamp: ChangeTimestamp::from_value(result.get("playlist_timestamp")),
    })
}

/// Spawn the poll loop; it stops when `token` is cancelled
pub fn spawn_status_poller<T>(
    transport: T,
    player_id: String,
    interval: Duration,
    bus: PlayerEventBus,
    token: CancellationToken,
) -> JoinHandle<()>
where
    T: LmsTransport + 'static,
{
    tokio::spawn(async move {
        info!(player = %player_id, interval_ms = interval.as_millis() as u64, "Status poller started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<PlayerEvent> = None;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    match poll_once(&transport, &player_id).await {
                        Ok(event) => {
                            if last.as_ref() != Some(&event) {
                                debug!(?event, "Queue details changed");
                                bus.publish(event.clone());
                                last = Some(event);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, player = %player_id, "Status poll failed");
                        }
                    }
                }
            }
        }

        info!(player = %player_id, "Status poller stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lms_remote_lms_client::LmsClient;
    use lms_remote_shared_config::LmsConfig;
    use lms_remote_test_utils::{status_result, MockLmsServer};
    use serde_json::json;

    const PLAYER: &str = "aa:bb:cc:dd:ee:ff";

    fn client(server: &MockLmsServer) -> LmsClient {
        LmsClient::new(&LmsConfig::with_url(server.url()))
            .unwrap()
            .with_retry_config(1, 1)
    }

    fn status_with_index(timestamp: &str, index: u64) -> Value {
        let mut result = status_result(timestamp, 3, vec![]);
        result["playlist_cur_index"] = json!(index.to_string());
        result
    }

    #[tokio::test]
    async fn test_poll_once_reads_details() {
        let server = MockLmsServer::start().await;
        server
            .mock_result(vec![json!("status"), json!("-")], status_with_index("1712.5", 2))
            .await;

        let event = poll_once(&client(&server), PLAYER).await.unwrap();
        assert_eq!(
            event,
            PlayerEvent::PlaylistDetails {
                current_index: Some(2),
                timestamp: ChangeTimestamp::new("1712.5"),
            }
        );

        let received = server.received_commands().await;
        assert_eq!(received[0].0, PLAYER);
        assert_eq!(received[0].1, vec![json!("status"), json!("-"), json!(1)]);
    }

    #[tokio::test]
    async fn test_poll_once_empty_queue() {
        let server = MockLmsServer::start().await;
        server
            .mock_result(vec![json!("status")], json!({"playlist_tracks": 0}))
            .await;

        let event = poll_once(&client(&server), PLAYER).await.unwrap();
        assert_matches!(
            event,
            PlayerEvent::PlaylistDetails { current_index: None, timestamp } if timestamp.is_empty()
        );
    }

    #[tokio::test]
    async fn test_poller_publishes_changes_only() {
        let server = MockLmsServer::start().await;
        server
            .mock_result(vec![json!("status")], status_with_index("42", 0))
            .await;
        let bus = PlayerEventBus::new();
        let mut events = bus.subscribe();
        let token = CancellationToken::new();

        let handle = spawn_status_poller(
            client(&server),
            PLAYER.to_string(),
            Duration::from_millis(10),
            bus.clone(),
            token.clone(),
        );

        let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_matches!(first, PlayerEvent::PlaylistDetails { current_index: Some(0), .. });

        // Wait for several more polls of the unchanged status
        while server.count_matching(&[json!("status")]).await < 4 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(events.try_recv().is_err());

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_poller_survives_failures() {
        let server = MockLmsServer::start().await;
        server.mock_failure(vec![json!("status")], 500).await;
        let bus = PlayerEventBus::new();
        let mut events = bus.subscribe();
        let token = CancellationToken::new();

        let handle = spawn_status_poller(
            client(&server),
            PLAYER.to_string(),
            Duration::from_millis(10),
            bus.clone(),
            token.clone(),
        );

        while server.count_matching(&[json!("status")]).await < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(events.try_recv().is_err());
        assert!(!handle.is_finished());

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
