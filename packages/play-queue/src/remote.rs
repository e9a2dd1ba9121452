//! Remote query/command seam used by the synchronizer

use async_trait::async_trait;
use lms_remote_lms_client::{lenient, LmsTransport, StatusResult};
use serde_json::Value;
use tracing::debug;

use crate::error::{QueueError, QueueResult};
use crate::item::QueueItem;
use crate::snapshot::{ChangeTimestamp, QueuePage};

/// Tags requested for each queue row
pub const QUEUE_TAGS: &str = "tags:adcltuK";

/// Mutating playlist commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Jump to the entry at this index
    Index(usize),
    Move { from: usize, to: usize },
    Delete(usize),
    Clear,
    /// Save the queue as a named playlist
    Save(String),
}

impl PlayerCommand {
    /// Argument list as sent in `slim.request`
    pub fn to_args(&self) -> Vec<Value> {
        match self {
            Self::Index(index) => vec!["playlist".into(), "index".into(), (*index).into()],
            Self::Move { from, to } => vec![
                "playlist".into(),
                "move".into(),
                (*from).into(),
                (*to).into(),
            ],
            Self::Delete(index) => vec!["playlist".into(), "delete".into(), (*index).into()],
            Self::Clear => vec!["playlist".into(), "clear".into()],
            Self::Save(name) => vec!["playlist".into(), "save".into(), name.as_str().into()],
        }
    }
}

/// What the synchronizer needs from the server
#[async_trait]
pub trait QueueRemote: Send + Sync + 'static {
    /// Fetch `limit` queue entries starting at `offset`
    async fn query_page(&self, player_id: &str, offset: usize, limit: usize)
        -> QueueResult<QueuePage>;

    /// Issue a mutation; only success or failure is relied upon
    async fn issue_command(&self, player_id: &str, command: &PlayerCommand) -> QueueResult<()>;

    /// Server-reported duration of the whole queue, in seconds
    async fn playlist_duration(&self, player_id: &str) -> QueueResult<f64>;
}

/// [`QueueRemote`] backed by any LMS transport
#[derive(Debug, Clone)]
pub struct LmsQueueRemote<T> {
    transport: T,
}

impl<T: LmsTransport> LmsQueueRemote<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: LmsTransport + 'static> QueueRemote for LmsQueueRemote<T> {
    async fn query_page(
        &self,
        player_id: &str,
        offset: usize,
        limit: usize,
    ) -> QueueResult<QueuePage> {
        let result = self
            .transport
            .list(player_id, &["status"], &[QUEUE_TAGS], offset, limit)
            .await
            .map_err(QueueError::fetch)?;

        let status: StatusResult = serde_json::from_value(result)
            .map_err(|e| QueueError::TransientFetch(format!("malformed status: {}", e)))?;

        let base_url = self.transport.base_url();
        let items: Vec<QueueItem> = status
            .playlist_loop
            .iter()
            .map(|entry| QueueItem::from_entry(entry, base_url))
            .collect();

        debug!(
            player_id = %player_id,
            offset,
            returned = items.len(),
            total = status.playlist_tracks,
            "Fetched queue page"
        );

        Ok(QueuePage {
            items,
            total_count: usize::try_from(status.playlist_tracks).unwrap_or(usize::MAX),
            timestamp: ChangeTimestamp::from_value(status.playlist_timestamp.as_ref()),
        })
    }

    async fn issue_command(&self, player_id: &str, command: &PlayerCommand) -> QueueResult<()> {
        self.transport
            .command(player_id, command.to_args())
            .await
            .map(|_| ())
            .map_err(QueueError::command)
    }

    async fn playlist_duration(&self, player_id: &str) -> QueueResult<f64> {
        let result = self
            .transport
            .query(
                player_id,
                vec!["status".into(), "-".into(), 1.into(), "tags:DD".into()],
            )
            .await
            .map_err(QueueError::fetch)?;

        Ok(result
            .get("playlist duration")
            .and_then(lenient::value_as_f64)
            .unwrap_or(0.0))
    }
}
