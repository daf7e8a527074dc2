// src/error.rs
use thiserror::Error;

/// Errors raised by the sync pipeline. The batch driver decides per variant
/// whether a failure skips a category, fails a date, or aborts the run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing required environment variable(s): {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidConfig {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("building http client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("{service} {operation}: request failed: {source}")]
    Transport {
        service: &'static str,
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} {operation}: HTTP {status}: {body}")]
    Status {
        service: &'static str,
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{service} {operation}: unreadable response body: {source}")]
    Decode {
        service: &'static str,
        operation: String,
        #[source]
        source: reqwest::Error,
    },
}

impl SyncError {
    /// HTTP status of a non-success response, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
