//! Mock LMS server for testing JSON-RPC clients
//!
//! Provides a [`MockLmsServer`] that answers `slim.request` calls posted to
//! `/jsonrpc.js`, matched on the player id and a prefix of the command
//! arguments.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches a `slim.request` body whose command starts with `prefix`
#[derive(Debug, Clone)]
pub struct CommandPrefix {
    prefix: Vec<Value>,
}

impl CommandPrefix {
    /// Match the command prefix for any player
    pub fn any_player(prefix: Vec<Value>) -> Self {
        Self { prefix }
    }
}

impl Match for CommandPrefix {
    fn matches(&self, request: &Request) -> bool {
        let Some((_, args)) = parse_slim_request(&request.body) else {
            return false;
        };
        args.len() >= self.prefix.len() && args.iter().zip(&self.prefix).all(|(a, b)| a == b)
    }
}

/// Decode `params: [player, [args...]]` from a request body
pub fn parse_slim_request(body: &[u8]) -> Option<(String, Vec<Value>)> {
    let body: Value = serde_json::from_slice(body).ok()?;
    let params = body.get("params")?.as_array()?;
    let player = params.first()?.as_str()?.to_string();
    let args = params.get(1)?.as_array()?.clone();
    Some((player, args))
}

/// Mock LMS server for testing
///
/// This struct wraps a [`wiremock::MockServer`] and provides convenience
/// methods for the `slim.request` responses the workspace relies on.
///
/// # Example
///
/// ```rust,ignore
/// use lms_remote_test_utils::{MockLmsServer, playlist_entry};
///
/// #[tokio::test]
/// async fn test_status() {
///     let server = MockLmsServer::start().await;
///     server
///         .mock_status_page(0, "1700000000.5", 1, vec![playlist_entry(1, "Song")])
///         .await;
///     // Configure the client with server.url()
/// }
/// ```
pub struct MockLmsServer {
    server: MockServer,
}

impl MockLmsServer {
    /// Start a new mock LMS server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Answer commands starting with `prefix` with `result`
    pub async fn mock_result(&self, prefix: Vec<Value>, result: Value) {
        Mock::given(method("POST"))
            .and(path("/jsonrpc.js"))
            .and(CommandPrefix::any_player(prefix))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "method": "slim.request",
                "result": result
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer commands starting with `prefix` with an empty result object
    pub async fn mock_ack(&self, prefix: Vec<Value>) {
        self.mock_result(prefix, json!({})).await;
    }

    /// Answer commands starting with `prefix` with an HTTP error status
    pub async fn mock_failure(&self, prefix: Vec<Value>, status_code: u16) {
        Mock::given(method("POST"))
            .and(path("/jsonrpc.js"))
            .and(CommandPrefix::any_player(prefix))
            .respond_with(ResponseTemplate::new(status_code).set_body_string("server error"))
            .mount(&self.server)
            .await;
    }

    /// Answer commands starting with `prefix` with a body that has no `result`
    pub async fn mock_missing_result(&self, prefix: Vec<Value>) {
        Mock::given(method("POST"))
            .and(path("/jsonrpc.js"))
            .and(CommandPrefix::any_player(prefix))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 1, "method": "slim.request"})),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer `status <offset> ...` with one page of the queue
    pub async fn mock_status_page(
        &self,
        offset: u64,
        timestamp: &str,
        total: u64,
        entries: Vec<Value>,
    ) {
        self.mock_result(
            vec![json!("status"), json!(offset)],
            status_result(timestamp, total, entries),
        )
        .await;
    }

    /// All received requests decoded as `(player, args)`
    pub async fn received_commands(&self) -> Vec<(String, Vec<Value>)> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| parse_slim_request(&r.body))
            .collect()
    }

    /// Number of received requests whose command starts with `prefix`
    pub async fn count_matching(&self, prefix: &[Value]) -> usize {
        self.received_commands()
            .await
            .iter()
            .filter(|(_, args)| {
                args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, b)| a == b)
            })
            .count()
    }
}

/// Build a `status` result object
pub fn status_result(timestamp: &str, total: u64, entries: Vec<Value>) -> Value {
    json!({
        "playlist_timestamp": timestamp,
        "playlist_tracks": total,
        "playlist_loop": entries
    })
}

/// Build a minimal `playlist_loop` entry
pub fn playlist_entry(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "artist": "Test Artist",
        "album": "Test Album",
        "duration": 180.0,
        "coverid": format!("c{}", id)
    })
}
