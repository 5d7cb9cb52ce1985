//! Error types for parallel-corpus
//!
//! Expected failure modes of the pipeline (an article missing in one language,
//! a timed-out request, a failed derived-artifact write) are modelled as
//! outcome values and never surface here. This module covers the failures a
//! caller must decide a policy for:
//! - Persistence of raw articles, checkpoints and the master topic list
//! - Configuration problems
//! - Candidate sources that cannot be reached

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for parallel-corpus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for parallel-corpus
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "target_count")
        key: Option<String>,
    },

    /// Durable storage failed
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Candidate title source could not produce a batch
    #[error("candidate source error: {0}")]
    CandidateSource(String),

    /// Unknown language code or name
    #[error("unsupported language: {0}")]
    InvalidLanguage(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Errors raised by the on-disk store
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A file could not be written (or renamed into place)
    #[error("failed to write {path}: {reason}")]
    WriteFailed {
        /// Destination path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A file exists but could not be read or decoded
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Source path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A path could not be derived (e.g., a topic with no usable characters)
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// Offending path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
}
