//! Custom error types for rustpubmed.
//!
//! Every fallible operation returns `Result<T, PubmedError>`. The pipeline
//! recovers these locally (per identifier or per search), so they mostly
//! surface through logs rather than to the caller.

use thiserror::Error;

/// Main error type for rustpubmed operations.
#[derive(Debug, Error)]
pub enum PubmedError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// E-utilities returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// Malformed XML body
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP 429 from E-utilities, retryable
    #[error("Rate limited on attempt {attempt}, retry in {delay_ms}ms")]
    RateLimited {
        /// Attempt number that was rejected (1-based)
        attempt: u32,
        /// Backoff applied before the next attempt
        delay_ms: u64,
    },

    /// Rate limiting persisted for every allowed attempt
    #[error("Retries exhausted for {id} after {attempts} attempts")]
    RetriesExhausted {
        /// Identifier being fetched
        id: String,
        /// Attempts made
        attempts: u32,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `PubmedError`
pub type Result<T> = std::result::Result<T, PubmedError>;
