//! Values the synchronizer publishes to the presentation layer

use std::sync::Arc;

use serde::Serialize;

use crate::format::{display_count, display_time};
use crate::item::QueueItem;

/// Synchronizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    DebouncePending,
    Terminated,
}

/// Renderable queue, swapped in one update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueView {
    pub items: Arc<Vec<QueueItem>>,
    pub total_count: usize,
    pub current_index: Option<usize>,
    pub duration_secs: f64,
    pub phase: SyncPhase,
    pub save_dialog_open: bool,
}

impl QueueView {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Header text such as `"12 Tracks (45:10)"`
    pub fn summary(&self) -> String {
        format!(
            "{}{}",
            display_count(self.total_count),
            display_time(Some(self.duration_secs), true)
        )
    }
}

/// One-shot requests to the host
#[derive(Debug, Clone, PartialEq)]
pub enum QueueSignal {
    /// Transient user-facing message
    Notice(String),
    /// Bring this row into view
    ScrollToItem(usize),
    /// Restore the scroll offset captured before a reload
    RestoreScroll(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let view = QueueView {
            total_count: 12,
            duration_secs: 2710.0,
            ..Default::default()
        };
        assert_eq!(view.summary(), "12 Tracks (45:10)");
        assert_eq!(QueueView::default().summary(), "");
    }
}
