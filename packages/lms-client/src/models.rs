//! Request and response types for the LMS JSON-RPC API

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC method understood by the server
pub const SLIM_REQUEST: &str = "slim.request";

/// Request envelope: `{"id":1,"method":"slim.request","params":[player,[args]]}`
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub id: u64,
    pub method: &'static str,
    pub params: (&'a str, &'a [Value]),
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(player_id: &'a str, args: &'a [Value]) -> Self {
        Self {
            id: 1,
            method: SLIM_REQUEST,
            params: (player_id, args),
        }
    }
}

/// Response envelope; only `result` is used
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Result of `status <offset> <limit> tags:...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResult {
    /// Opaque token that changes whenever the queue content or order changes
    #[serde(default)]
    pub playlist_timestamp: Option<Value>,
    /// Total number of tracks in the queue
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub playlist_tracks: u64,
    /// Index of the current track
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub playlist_cur_index: Option<u64>,
    /// Aggregate duration reported by `tags:DD`
    #[serde(
        default,
        rename = "playlist duration",
        deserialize_with = "lenient::f64_opt"
    )]
    pub playlist_duration: Option<f64>,
    #[serde(default)]
    pub playlist_loop: Vec<PlaylistEntry>,
}

/// One entry of `playlist_loop`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub tracknum: Option<u64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub coverid: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PlaylistEntry {
    /// Track identifier rendered as text (numbers and strings both occur)
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().and_then(lenient::value_as_string)
    }
}

/// Result of `serverstatus 0 0`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "player count", deserialize_with = "lenient::u64_or_zero")]
    pub player_count: u64,
}

/// Dotted server version (`8.5.2`, `9.0.0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ServerVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.').map(|p| {
            // Tolerate suffixes such as "9.0.0-dev"
            let digits: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>()
        });
        let major = parts
            .next()
            .and_then(Result::ok)
            .ok_or_else(|| format!("invalid server version '{}'", s))?;
        let minor = parts.next().and_then(Result::ok).unwrap_or(0);
        let patch = parts.next().and_then(Result::ok).unwrap_or(0);
        Ok(Self::new(major, minor, patch))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Deserializers for fields the server sends either as numbers or strings
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn value_as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn value_as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn value_as_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(value_as_f64))
    }

    pub fn u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(value_as_i64)
            .and_then(|n| u64::try_from(n).ok()))
    }

    pub fn u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(u64_opt(deserializer)?.unwrap_or(0))
    }

    pub fn string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(value_as_string))
    }
}
