//! Error types for odata-harvest
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for odata-harvest
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Response body was not decodable: {message}")]
    MalformedResponse { message: String },

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Service rejected field '{field}'")]
    FieldRejected { field: String },

    #[error("Field negotiation exhausted: {message}")]
    FieldNegotiationExhausted { message: String },

    #[error("No usable partition key among candidates: {candidates:?}")]
    NoPartitionKeyFound { candidates: Vec<String> },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a field rejection error
    pub fn field_rejected(field: impl Into<String>) -> Self {
        Self::FieldRejected {
            field: field.into(),
        }
    }

    /// Create a negotiation exhaustion error
    pub fn negotiation_exhausted(message: impl Into<String>) -> Self {
        Self::FieldNegotiationExhausted {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error is a transient network failure (timeout,
    /// connection reset). Transient failures are not retried by the
    /// client; the orchestrator isolates the affected partition.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Timeout { .. })
    }

    /// Check if this error is a recoverable field rejection
    pub fn is_field_rejection(&self) -> bool {
        matches!(self, Error::FieldRejected { .. })
    }

    /// Check if this error is fatal for the whole run rather than a
    /// single partition
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            Error::NoPartitionKeyFound { .. }
                | Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
        )
    }
}

/// Result type alias for odata-harvest
pub type Result<T> = std::result::Result<T, Error>;
