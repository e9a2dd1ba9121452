//! Transport abstraction shared by the queue and random-mix controllers

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LmsResult;

/// Player id used for server-scoped commands (prefs, genres, libraries)
pub const SERVER_SCOPE: &str = "";

/// Something that can execute `slim.request` calls
///
/// `query` is for reads and may be retried; `command` is for mutations and
/// is sent exactly once.
#[async_trait]
pub trait LmsTransport: Send + Sync {
    /// Server base URL, used to resolve relative artwork paths
    fn base_url(&self) -> &str;

    /// Execute an idempotent request and return its `result` object
    async fn query(&self, player_id: &str, args: Vec<Value>) -> LmsResult<Value>;

    /// Execute a mutating request and return its `result` object
    async fn command(&self, player_id: &str, args: Vec<Value>) -> LmsResult<Value>;

    /// Execute a paged listing: `command ++ [offset, limit] ++ params`
    async fn list(
        &self,
        player_id: &str,
        command: &[&str],
        params: &[&str],
        offset: usize,
        limit: usize,
    ) -> LmsResult<Value> {
        self.query(player_id, list_args(command, params, offset, limit))
            .await
    }
}

#[async_trait]
impl<T: LmsTransport + ?Sized> LmsTransport for Arc<T> {
    fn base_url(&self) -> &str {
        (**self).base_url()
    }

    async fn query(&self, player_id: &str, args: Vec<Value>) -> LmsResult<Value> {
        (**self).query(player_id, args).await
    }

    async fn command(&self, player_id: &str, args: Vec<Value>) -> LmsResult<Value> {
        (**self).command(player_id, args).await
    }
}

/// Build the argument list of a paged listing request
pub fn list_args(command: &[&str], params: &[&str], offset: usize, limit: usize) -> Vec<Value> {
    command
        .iter()
        .map(|c| Value::from(*c))
        .chain([Value::from(offset), Value::from(limit)])
        .chain(params.iter().map(|p| Value::from(*p)))
        .collect()
}
