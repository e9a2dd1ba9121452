//! In-memory stand-in for the server side of the play queue

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lms_remote_play_queue::{
    ChangeTimestamp, ItemArt, PlayerCommand, QueueError, QueuePage, QueueRemote, QueueResult,
    QueueItem, QUEUE_ITEM_MENU,
};
use tokio::sync::oneshot;
use tokio::time::Instant;

/// One recorded `query_page` call
#[derive(Debug, Clone)]
pub struct QueryCall {
    pub offset: usize,
    pub limit: usize,
    pub at: Instant,
}

/// Releases a held query and reports when it has read server state
pub struct HeldQuery {
    pub started: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

struct Gate {
    started: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
struct ServerState {
    tracks: Vec<u64>,
    timestamp: String,
    duration: f64,
    queries: Vec<QueryCall>,
    commands: Vec<PlayerCommand>,
    duration_calls: usize,
    fail_commands: bool,
    fail_queries: bool,
    gate: Option<Gate>,
}

/// Fake [`QueueRemote`] holding a server-side queue of track ids
#[derive(Clone, Default)]
pub struct FakeQueueRemote {
    state: Arc<Mutex<ServerState>>,
}

pub fn track(id: u64) -> QueueItem {
    QueueItem {
        track_ref: format!("track_id:{}", id),
        title: format!("Track {}", id),
        subtitle: None,
        art: ItemArt::Icon("music_note"),
        duration: Some(180.0),
        actions: QUEUE_ITEM_MENU.to_vec(),
    }
}

pub fn track_refs(ids: &[u64]) -> Vec<String> {
    ids.iter().map(|id| format!("track_id:{}", id)).collect()
}

impl FakeQueueRemote {
    pub fn with_tracks(ids: &[u64], timestamp: &str) -> Self {
        let remote = Self::default();
        remote.set_queue(ids, timestamp);
        remote.state.lock().unwrap().duration = 180.0 * ids.len() as f64;
        remote
    }

    /// Replace the server queue without notifying anyone
    pub fn set_queue(&self, ids: &[u64], timestamp: &str) {
        let mut state = self.state.lock().unwrap();
        state.tracks = ids.to_vec();
        state.timestamp = timestamp.to_string();
    }

    pub fn fail_commands(&self) {
        self.state.lock().unwrap().fail_commands = true;
    }

    pub fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    /// Hold the next `query_page` call until released
    pub fn hold_next_query(&self) -> HeldQuery {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.state.lock().unwrap().gate = Some(Gate {
            started: started_tx,
            release: release_rx,
        });
        HeldQuery {
            started: started_rx,
            release: release_tx,
        }
    }

    pub fn queries(&self) -> Vec<QueryCall> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn query_count(&self) -> usize {
        self.state.lock().unwrap().queries.len()
    }

    /// `(offset, limit)` of every query so far
    pub fn query_windows(&self) -> Vec<(usize, usize)> {
        self.queries()
            .iter()
            .map(|q| (q.offset, q.limit))
            .collect()
    }

    pub fn commands(&self) -> Vec<PlayerCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn duration_calls(&self) -> usize {
        self.state.lock().unwrap().duration_calls
    }
}

#[async_trait]
impl QueueRemote for FakeQueueRemote {
    async fn query_page(
        &self,
        _player_id: &str,
        offset: usize,
        limit: usize,
    ) -> QueueResult<QueuePage> {
        let (page, gate) = {
            let mut state = self.state.lock().unwrap();
            state.queries.push(QueryCall {
                offset,
                limit,
                at: Instant::now(),
            });
            let page = if state.fail_queries {
                Err(QueueError::TransientFetch("server unavailable".to_string()))
            } else {
                Ok(QueuePage {
                    items: state
                        .tracks
                        .iter()
                        .skip(offset)
                        .take(limit)
                        .map(|id| track(*id))
                        .collect(),
                    total_count: state.tracks.len(),
                    timestamp: ChangeTimestamp::new(state.timestamp.clone()),
                })
            };
            (page, state.gate.take())
        };

        if let Some(gate) = gate {
            let _ = gate.started.send(());
            let _ = gate.release.await;
        }
        page
    }

    async fn issue_command(&self, _player_id: &str, command: &PlayerCommand) -> QueueResult<()> {
        let mut state = self.state.lock().unwrap();
        state.commands.push(command.clone());
        if state.fail_commands {
            Err(QueueError::Command("rejected".to_string()))
        } else {
            Ok(())
        }
    }

    async fn playlist_duration(&self, _player_id: &str) -> QueueResult<f64> {
        let mut state = self.state.lock().unwrap();
        state.duration_calls += 1;
        Ok(state.duration)
    }
}
