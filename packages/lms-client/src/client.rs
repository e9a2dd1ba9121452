//! Core LMS HTTP client with retry logic and connection pooling

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use lms_remote_shared_config::LmsConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{LmsError, LmsResult};
use crate::models::{JsonRpcRequest, JsonRpcResponse, ServerStatus};
use crate::transport::{LmsTransport, SERVER_SCOPE};

/// Maximum error body size to prevent memory exhaustion
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Default retry configuration
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;

/// LMS JSON-RPC client with retry logic and connection pooling
#[derive(Debug, Clone)]
pub struct LmsClient {
    /// HTTP client with connection pool
    http_client: Client,
    /// Configuration
    config: LmsConfig,
    /// Number of attempts for idempotent queries
    retry_attempts: u32,
    /// Base delay for exponential backoff (milliseconds)
    retry_base_delay_ms: u64,
}

impl LmsClient {
    /// Create a new client from configuration
    pub fn new(config: &LmsConfig) -> LmsResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("lms-remote/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LmsError::HttpError)?;

        Ok(Self::with_client(config, http_client))
    }

    /// Create a client from `LMS_*` environment variables
    pub fn from_env() -> LmsResult<Self> {
        let config = LmsConfig::from_env().map_err(|e| LmsError::Config(e.to_string()))?;
        Self::new(&config)
    }

    /// Create a client with custom HTTP client (for testing)
    pub fn with_client(config: &LmsConfig, http_client: Client) -> Self {
        Self {
            http_client,
            config: config.clone(),
            retry_attempts: config.max_retries.max(1),
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, attempts: u32, base_delay_ms: u64) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Execute an async operation with retry logic
    async fn with_retry<T, F, Fut>(&self, operation: F) -> LmsResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = LmsResult<T>>,
    {
        if self.retry_attempts == 0 {
            return operation().await;
        }

        let mut last_error = None;

        for attempt in 0..self.retry_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    } else if attempt < self.retry_attempts - 1 {
                        let delay = self.retry_base_delay_ms * 2_u64.pow(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.retry_attempts,
                            delay_ms = delay,
                            error = %e,
                            "Retrying LMS query after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        last_error = Some(e);
                    } else {
                        last_error = Some(e);
                        break;
                    }
                }
            }
        }

        // A single attempt surfaces the original error untouched
        if self.retry_attempts == 1 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Err(LmsError::RetriesExhausted {
            attempts: self.retry_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    /// Truncate error body to prevent memory exhaustion
    fn truncate_error_body(body: String) -> String {
        if body.len() <= MAX_ERROR_BODY_SIZE {
            return body;
        }

        let truncate_at = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
            .last()
            .unwrap_or(0);

        format!("{}... (truncated)", &body[..truncate_at])
    }

    /// Single `slim.request` round trip (no retry)
    async fn request_internal(&self, player_id: &str, args: &[Value]) -> LmsResult<Value> {
        let request = JsonRpcRequest::new(player_id, args);

        let response = self
            .http_client
            .post(self.config.jsonrpc_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LmsError::ConnectionRefused(self.config.url.clone())
                } else if e.is_timeout() {
                    LmsError::Timeout(self.config.timeout_secs)
                } else {
                    LmsError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::truncate_error_body(response.text().await.unwrap_or_default());
            return Err(LmsError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: JsonRpcResponse = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(LmsError::ApiError {
                status: 200,
                message: error.to_string(),
            });
        }

        envelope
            .result
            .ok_or_else(|| LmsError::MissingResult(command_name(args)))
    }

    /// Read `serverstatus` (version, player count)
    pub async fn server_status(&self) -> LmsResult<ServerStatus> {
        let result = self
            .query(SERVER_SCOPE, vec!["serverstatus".into(), 0.into(), 0.into()])
            .await?;
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl LmsTransport for LmsClient {
    fn base_url(&self) -> &str {
        self.config.base_url()
    }

    #[instrument(skip(self, args), fields(command = %command_name(&args)))]
    async fn query(&self, player_id: &str, args: Vec<Value>) -> LmsResult<Value> {
        debug!(player = %player_id, "Sending LMS query");
        self.with_retry(|| self.request_internal(player_id, &args))
            .await
    }

    #[instrument(skip(self, args), fields(command = %command_name(&args)))]
    async fn command(&self, player_id: &str, args: Vec<Value>) -> LmsResult<Value> {
        debug!(player = %player_id, "Sending LMS command");
        self.request_internal(player_id, &args).await
    }
}

/// First one or two words of a command, for logs and errors
fn command_name(args: &[Value]) -> String {
    args.iter()
        .take(2)
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
