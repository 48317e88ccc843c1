//! Query client
//!
//! Issues authenticated GET requests against the remote service and
//! returns raw decoded payloads or a classified transport failure:
//! - Credentials are attached only when configured; their absence is
//!   not an error, the remote service decides.
//! - A bounded timeout applies to every call; exceeding it is a
//!   transport failure, not a negotiation case.
//! - No retries. Retry policy belongs to callers who know why a call
//!   failed.
//! - Non-2xx statuses come back inside [`RawResponse`] so callers can
//!   classify them (field rejection vs. server error).

use super::rate_limit::RequestPacer;
use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Maximum response-body length carried into error messages
pub const BODY_SNIPPET_MAX: usize = 1200;

/// Configuration for the query client
#[derive(Debug, Clone)]
pub struct QueryClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause between consecutive requests (zero disables pacing)
    pub pause: Duration,
    /// User agent string
    pub user_agent: String,
    /// Optional basic-auth credential pair
    pub credentials: Option<(String, String)>,
}

impl Default for QueryClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            pause: Duration::from_millis(200),
            user_agent: format!("odata-harvest/{}", env!("CARGO_PKG_VERSION")),
            credentials: None,
        }
    }
}

impl QueryClientConfig {
    /// Derive a client config from an extractor config
    pub fn from_extractor(config: &ExtractorConfig) -> Self {
        Self {
            timeout: config.timeout(),
            pause: config.pause(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            ..Self::default()
        }
    }

    /// Disable the inter-request pause
    #[must_use]
    pub fn no_pause(mut self) -> Self {
        self.pause = Duration::ZERO;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A raw service response: status, body, and a best-effort JSON decode.
///
/// Decode failure is represented (`json` is `None`), never thrown past
/// this layer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// Best-effort JSON decode of the body
    pub json: Option<Value>,
}

impl RawResponse {
    /// Whether the status code indicates success
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The decoded body, or `MalformedResponse` if it was undecodable
    pub fn decoded(&self) -> Result<&Value> {
        self.json.as_ref().ok_or_else(|| {
            Error::malformed(format!(
                "expected JSON body, got: {}",
                snippet(&self.body)
            ))
        })
    }

    /// Truncated body for diagnostics
    pub fn body_snippet(&self) -> &str {
        snippet(&self.body)
    }
}

/// Truncate a body to [`BODY_SNIPPET_MAX`] characters on a char boundary
pub(crate) fn snippet(body: &str) -> &str {
    match body.char_indices().nth(BODY_SNIPPET_MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Query client issuing paced, optionally authenticated GET requests
pub struct QueryClient {
    client: Client,
    config: QueryClientConfig,
    pacer: Option<RequestPacer>,
}

impl QueryClient {
    /// Create a client with default configuration
    pub fn new() -> Self {
        Self::with_config(QueryClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: QueryClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        let pacer = RequestPacer::new(config.pause);

        Self {
            client,
            config,
            pacer,
        }
    }

    /// Check if pacing is enabled
    pub fn has_pacer(&self) -> bool {
        self.pacer.is_some()
    }

    /// Issue one GET request.
    ///
    /// The configured pause is awaited before the request goes out, so
    /// pacing applies uniformly between pages and between partitions.
    /// Continuation requests pass an empty `params` slice: the token URL
    /// is self-sufficient.
    pub async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawResponse> {
        if let Some(ref pacer) = self.pacer {
            pacer.wait().await;
        }

        let mut req = self.client.get(url).header(ACCEPT, "application/json");
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some((user, pass)) = &self.config.credentials {
            req = req.basic_auth(user, Some(pass));
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                })
            }
            Err(e) => return Err(Error::Http(e)),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return Err(Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                })
            }
            Err(e) => return Err(Error::Http(e)),
        };
        let json = serde_json::from_str(&body).ok();

        debug!(status, url, decodable = json.is_some(), "GET completed");

        Ok(RawResponse { status, body, json })
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("config", &self.config)
            .field("has_pacer", &self.pacer.is_some())
            .finish_non_exhaustive()
    }
}
