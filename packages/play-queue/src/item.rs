//! Renderable queue entries built from `playlist_loop` rows

use lms_remote_lms_client::PlaylistEntry;
use serde::Serialize;

/// Per-item actions offered in the entry menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemAction {
    PlayNow,
    PlayNext,
    Remove,
}

impl ItemAction {
    /// Command keyword used by the presentation layer
    pub fn cmd(&self) -> &'static str {
        match self {
            Self::PlayNow => "playnow",
            Self::PlayNext => "playnext",
            Self::Remove => "remove",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PlayNow => "Play now",
            Self::PlayNext => "Move to next in queue",
            Self::Remove => "Remove from queue",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::PlayNow => "play_circle_outline",
            Self::PlayNext => "play_circle_filled",
            Self::Remove => "remove_circle_outline",
        }
    }

    /// Parse the keyword produced by [`ItemAction::cmd`]
    pub fn from_cmd(cmd: &str) -> Option<Self> {
        match cmd {
            "playnow" => Some(Self::PlayNow),
            "playnext" => Some(Self::PlayNext),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// One row of an item's menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "action", rename_all = "lowercase")]
pub enum MenuEntry {
    Action(ItemAction),
    Divider,
}

/// Menu attached to every queue entry
pub const QUEUE_ITEM_MENU: [MenuEntry; 4] = [
    MenuEntry::Action(ItemAction::PlayNow),
    MenuEntry::Action(ItemAction::PlayNext),
    MenuEntry::Divider,
    MenuEntry::Action(ItemAction::Remove),
];

/// Cover image or fallback icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ItemArt {
    Image(String),
    Icon(&'static str),
}

/// A single entry of the play queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueItem {
    /// Track reference usable in other commands (`track_id:<id>`)
    pub track_ref: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub art: ItemArt,
    /// Duration in seconds, when known
    pub duration: Option<f64>,
    pub actions: Vec<MenuEntry>,
}

impl QueueItem {
    /// Build an item from a `status` row, resolving artwork against `server_url`
    pub fn from_entry(entry: &PlaylistEntry, server_url: &str) -> Self {
        let raw_title = entry.title.clone().unwrap_or_default();
        let title = match entry.tracknum {
            Some(n) if n > 0 => format!("{:02} {}", n, raw_title),
            _ => raw_title,
        };

        Self {
            track_ref: format!("track_id:{}", entry.id_string().unwrap_or_default()),
            title,
            subtitle: subtitle(entry),
            art: resolve_art(entry, server_url),
            duration: entry.duration.filter(|d| d.is_finite()),
            actions: QUEUE_ITEM_MENU.to_vec(),
        }
    }

    /// Whether the entry has a positive duration worth displaying
    pub fn has_duration(&self) -> bool {
        self.duration.is_some_and(|d| d > 0.0)
    }
}

fn subtitle(entry: &PlaylistEntry) -> Option<String> {
    let artist = entry.artist.as_deref().filter(|s| !s.is_empty());
    let album = entry.album.as_deref().filter(|s| !s.is_empty());
    match (artist, album) {
        (Some(artist), Some(album)) => Some(format!("{} ({})", artist, album)),
        (Some(artist), None) => Some(artist.to_string()),
        (None, Some(album)) => Some(album.to_string()),
        (None, None) => None,
    }
}

fn resolve_art(entry: &PlaylistEntry, server_url: &str) -> ItemArt {
    let server = server_url.trim_end_matches('/');

    if let Some(artwork) = entry.artwork_url.as_deref().filter(|s| !s.is_empty()) {
        if is_remote_url(artwork) {
            return ItemArt::Image(artwork.to_string());
        }
        return ItemArt::Image(format!("{}/{}", server, artwork.trim_start_matches('/')));
    }

    if let Some(cover) = entry.coverid.as_deref().filter(|s| !s.is_empty()) {
        return ItemArt::Image(format!("{}/music/{}/cover.jpg", server, cover));
    }

    if entry.url.as_deref().is_some_and(is_remote_url) {
        ItemArt::Icon("wifi_tethering")
    } else {
        ItemArt::Icon("music_note")
    }
}

fn is_remote_url(url: &str) -> bool {
    url.starts_with("http:") || url.starts_with("https:")
}
