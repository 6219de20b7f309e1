//! Error types for the ledger tagger.
//!
//! All fallible operations in this crate return [`TaggerError`] through the
//! [`Result`] alias. Training reports [`TaggerError::InsufficientData`] and
//! [`TaggerError::InvalidExample`] for corpora that cannot produce a model, and
//! wraps collaborator failures in [`TaggerError::CorpusRead`] without
//! interpreting them.
//!
//! # Examples
//!
//! ```
//! use ledger_tagger::error::{Result, TaggerError};
//!
//! fn check_threshold(value: f64) -> Result<()> {
//!     if !(0.0..=1.0).contains(&value) {
//!         return Err(TaggerError::invalid_config("threshold must be within [0, 1]"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_threshold(1.5).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for ledger tagger operations.
#[derive(Error, Debug)]
pub enum TaggerError {
    /// I/O errors (model cache, corpus files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Too few examples or distinct tags to fit a classifier
    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    /// A training example violates the corpus contract
    #[error("Invalid training example #{index}: {reason}")]
    InvalidExample { index: usize, reason: String },

    /// Opaque failure raised by the corpus collaborator
    #[error("Corpus read failure: {0}")]
    CorpusRead(#[source] anyhow::Error),

    /// Analysis-related errors (tokenization, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Model cache errors (format version, corrupt blob)
    #[error("Model storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary model encoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with TaggerError.
pub type Result<T> = std::result::Result<T, TaggerError>;

impl TaggerError {
    /// Create a new insufficient data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        TaggerError::InsufficientData(msg.into())
    }

    /// Create a new invalid example error for the example at `index`.
    pub fn invalid_example<S: Into<String>>(index: usize, reason: S) -> Self {
        TaggerError::InvalidExample {
            index,
            reason: reason.into(),
        }
    }

    /// Wrap a collaborator error as a corpus read failure.
    pub fn corpus_read<E: Into<anyhow::Error>>(err: E) -> Self {
        TaggerError::CorpusRead(err.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TaggerError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TaggerError::Config(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        TaggerError::Storage(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TaggerError::Other(msg.into())
    }

    /// Whether this error only means the corpus was too small to train on.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, TaggerError::InsufficientData(_))
    }
}
