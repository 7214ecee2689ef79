//! Centralized error types for Interlink.

use thiserror::Error;

/// Main error type for sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Source store error: {0}")]
    Source(String),

    #[error("Graph store error: {0}")]
    Graph(String),

    #[error("Outbox error: {0}")]
    Outbox(String),

    #[error("Invalid event {event_id}: {reason}")]
    InvalidEvent { event_id: i64, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Create a source store error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a graph store error.
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }

    /// Create an outbox error.
    pub fn outbox(msg: impl Into<String>) -> Self {
        Self::Outbox(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
