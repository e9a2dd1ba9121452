//! JSON-RPC client for the Lyrion/Logitech Media Server control API
//!
//! Every request is a `slim.request` call posted to `<server>/jsonrpc.js`
//! with a player id (empty for server-scoped commands) and a list of
//! command arguments.
//!
//! # Thread Safety
//!
//! `LmsClient` is `Clone + Send + Sync` and can be safely shared
//! across tasks. It uses a shared HTTP client connection pool.
//!
//! # Example
//!
//! ```no_run
//! use lms_remote_lms_client::{LmsClient, LmsTransport, StatusResult};
//! use lms_remote_shared_config::LmsConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LmsConfig::with_url("http://localhost:9000");
//! let client = LmsClient::new(&config)?;
//!
//! // First 50 queue entries of a player
//! let result = client
//!     .list("00:04:20:12:34:56", &["status"], &["tags:adcltuK"], 0, 50)
//!     .await?;
//! let status: StatusResult = serde_json::from_value(result)?;
//! println!("{} tracks queued", status.playlist_tracks);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;
mod transport;

pub use client::LmsClient;
pub use error::{LmsError, LmsResult};
pub use models::{
    lenient, JsonRpcRequest, JsonRpcResponse, PlaylistEntry, ServerStatus, ServerVersion,
    StatusResult, SLIM_REQUEST,
};
pub use transport::{list_args, LmsTransport, SERVER_SCOPE};
