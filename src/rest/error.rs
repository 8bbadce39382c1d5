// ABOUTME: Error payload returned by the node on failed REST calls
// ABOUTME: Decoded from non-success responses and surfaced as Error::Api

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error body from the node
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{status} {error} for '{path}'. Message: {message}")]
pub struct LavalinkError {
    /// When the node produced the error
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// HTTP status code
    pub status: u16,
    /// HTTP reason phrase
    pub error: String,
    /// Server-side stack trace, present when the request asked for `trace=true`
    #[serde(default)]
    pub trace: Option<String>,
    /// Human readable description
    pub message: String,
    /// Request path that failed
    pub path: String,
}
