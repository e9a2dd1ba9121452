//! Paged, debounced mirror of an LMS player's play queue
//!
//! The synchronizer holds a prefix of the server queue, fetching further
//! pages as the host scrolls and replacing everything it holds when the
//! server reports a new change timestamp. User edits (reorder, play now,
//! play next, remove, save, clear) are sent as commands; the local list is
//! never edited optimistically and is reconciled by the next reload.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lms_remote_lms_client::LmsClient;
//! use lms_remote_play_queue::{spawn_queue_sync, LmsQueueRemote, PlayerEventBus};
//! use lms_remote_shared_config::{LmsConfig, QueueConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LmsClient::new(&LmsConfig::with_url("http://localhost:9000"))?;
//! let bus = PlayerEventBus::new();
//!
//! let mut sync = spawn_queue_sync(
//!     Arc::new(LmsQueueRemote::new(client)),
//!     Some("00:04:20:12:34:56".to_string()),
//!     QueueConfig::default(),
//!     bus.subscribe(),
//! );
//!
//! sync.view.changed().await?;
//! println!("{}", sync.view.borrow().summary());
//! # Ok(())
//! # }
//! ```

mod debounce;
mod error;
mod events;
mod format;
mod item;
mod remote;
mod scroll;
mod snapshot;
mod sync;
mod view;

pub use debounce::Debouncer;
pub use error::{QueueError, QueueResult};
pub use events::{PlayerEvent, PlayerEventBus, QUEUE_ROUTE};
pub use format::{display_count, display_time, format_seconds};
pub use item::{ItemAction, ItemArt, MenuEntry, QueueItem, QUEUE_ITEM_MENU};
pub use remote::{LmsQueueRemote, PlayerCommand, QueueRemote, QUEUE_TAGS};
pub use scroll::{current_row_target, drag_scroll_step, ScrollMetrics, ScrollState};
pub use snapshot::{ChangeTimestamp, QueuePage, QueueSnapshot};
pub use sync::{
    spawn_queue_sync, QueueHandle, QueueSync, CLEAR_FAILED_NOTICE, SAVE_FAILED_NOTICE,
};
pub use view::{QueueSignal, QueueView, SyncPhase};
