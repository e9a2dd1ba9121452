//! Held prefix of the server play queue

use lms_remote_lms_client::lenient;
use serde_json::Value;

use crate::item::QueueItem;

/// Opaque change token reported as `playlist_timestamp`
///
/// Only ever compared for equality. Numbers and strings are normalised so
/// `1712345678.25` and `"1712345678.25"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ChangeTimestamp(String);

impl ChangeTimestamp {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Build from a raw JSON value; `null` maps to the empty token
    pub fn from_value(value: Option<&Value>) -> Self {
        Self(value.and_then(lenient::value_as_string).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ChangeTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page as returned by a single `status` query
#[derive(Debug, Clone, PartialEq)]
pub struct QueuePage {
    pub items: Vec<QueueItem>,
    pub total_count: usize,
    pub timestamp: ChangeTimestamp,
}

/// Items held locally, always a prefix of the server queue
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    items: Vec<QueueItem>,
    total_count: usize,
    timestamp: ChangeTimestamp,
}

impl QueueSnapshot {
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn timestamp(&self) -> &ChangeTimestamp {
        &self.timestamp
    }

    /// Whether the server reports more entries than are held
    pub fn has_more(&self) -> bool {
        self.total_count > self.items.len()
    }

    /// Append a page fetched at offset `len()`
    pub fn append(&mut self, page: QueuePage) {
        self.items.extend(page.items);
        self.timestamp = page.timestamp;
        self.total_count = page.total_count.max(self.items.len());
    }

    /// Swap the whole held list for a freshly fetched first page
    pub fn replace(&mut self, page: QueuePage) {
        self.total_count = page.total_count.max(page.items.len());
        self.items = page.items;
        self.timestamp = page.timestamp;
    }

    /// Drop everything held; returns how many items were discarded
    pub fn discard(&mut self) -> usize {
        let count = self.items.len();
        *self = Self::default();
        count
    }
}
