//! Error types for SnapKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SnapError
pub type Result<T> = std::result::Result<T, SnapError>;

/// Unified error type for SnapKV operations
#[derive(Debug, Error)]
pub enum SnapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// The new snapshot replaced the old one but the directory sync failed
    #[error("Snapshot directory sync failed: {0}")]
    DirSync(std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SnapError {
    fn from(e: serde_json::Error) -> Self {
        SnapError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for SnapError {
    fn from(e: bincode::Error) -> Self {
        SnapError::Serialization(e.to_string())
    }
}

impl From<tempfile::PersistError> for SnapError {
    fn from(e: tempfile::PersistError) -> Self {
        SnapError::Io(e.error)
    }
}
