//! Common test utilities for play queue integration tests

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fakes;

pub use fakes::*;

use std::time::Duration;

use lms_remote_play_queue::{ChangeTimestamp, PlayerEvent, QueueView};
use tokio::sync::watch;

/// Upper bound on how long a test waits for the synchronizer (virtual time)
pub const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Wait until the published view satisfies `predicate`
pub async fn wait_for_view(
    view: &mut watch::Receiver<QueueView>,
    predicate: impl FnMut(&QueueView) -> bool,
) -> QueueView {
    tokio::time::timeout(WAIT_LIMIT, view.wait_for(predicate))
        .await
        .expect("timed out waiting for queue view")
        .expect("synchronizer dropped its view")
        .clone()
}

/// Poll `condition` until it holds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Poll an async `condition` until it holds
pub async fn eventually_async<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn details(current_index: Option<usize>, timestamp: &str) -> PlayerEvent {
    PlayerEvent::PlaylistDetails {
        current_index,
        timestamp: ChangeTimestamp::new(timestamp),
    }
}

/// Track refs of the published items
pub fn refs(view: &QueueView) -> Vec<String> {
    view.items.iter().map(|item| item.track_ref.clone()).collect()
}
