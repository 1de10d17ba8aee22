//! Error types for tandem
//!
//! Provides a unified error type used across all tandem crates.

use std::path::PathBuf;

/// Main error type for tandem operations
#[derive(Debug, thiserror::Error)]
pub enum TandemError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    // === Session Errors ===

    #[error("Invalid session name: {0:?}")]
    InvalidSessionName(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session already exists: {0}")]
    SessionExists(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool not installed: {0}")]
    ToolNotInstalled(String),

    // === Terminal Errors ===

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Terminal command timed out after {seconds}s")]
    TerminalTimeout { seconds: u64 },

    // === Persistence Errors ===

    #[error("Persistence error: {0}")]
    Persistence(String),

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TandemError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error is retryable
    ///
    /// Terminal failures usually mean the tmux server or the session is
    /// briefly unavailable; the next poll tick may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Terminal(_) | Self::TerminalTimeout { .. } | Self::SessionNotFound(_)
        )
    }
}

/// Result type alias using TandemError
pub type Result<T> = std::result::Result<T, TandemError>;
