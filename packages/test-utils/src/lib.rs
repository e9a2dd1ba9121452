//! Shared test utilities for the LMS Remote workspace
//!
//! This crate provides a mock media server for testing without a real
//! LMS instance on the network.
//!
//! # Mock Services
//!
//! - [`MockLmsServer`] - Mock `slim.request` JSON-RPC endpoint
//!
//! # Example
//!
//! ```rust,ignore
//! use lms_remote_test_utils::MockLmsServer;
//!
//! #[tokio::test]
//! async fn test_with_mock() {
//!     let lms = MockLmsServer::start().await;
//!     lms.mock_ack(vec!["playlist".into(), "clear".into()]).await;
//!
//!     // Use lms.url() to configure your client
//! }
//! ```

mod lms;

pub use lms::{
    parse_slim_request, playlist_entry, status_result, CommandPrefix, MockLmsServer,
};
