//! Error types for xiphos.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`XiphosError`]. Build and search runs treat any error as fatal: the caller
//! logs it and terminates the run.
//!
//! # Examples
//!
//! ```
//! use xiphos::error::{Result, XiphosError};
//!
//! fn check_budget(ram_buffer_mb: f64) -> Result<()> {
//!     if ram_buffer_mb <= 0.0 {
//!         return Err(XiphosError::invalid_config("RAM buffer must be greater than zero"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_budget(0.0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for xiphos operations.
#[derive(Error, Debug)]
pub enum XiphosError {
    /// I/O errors (file operations, directory walks, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis errors (tokenization, filter construction, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Malformed corpus or topic input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Index build or index read errors.
    #[error("Index error: {0}")]
    Index(String),

    /// Lockstep pairing of two document streams went out of sync.
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// The same document identifier was ingested twice.
    #[error("Duplicate document identifier: {0}")]
    DuplicateIdentifier(String),

    /// Query planning or evaluation errors.
    #[error("Query error: {0}")]
    Query(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration rejected before any I/O took place.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Topic XML errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with XiphosError.
pub type Result<T> = std::result::Result<T, XiphosError>;

impl XiphosError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        XiphosError::Analysis(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        XiphosError::Parse(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        XiphosError::Index(msg.into())
    }

    /// Create a new consistency error.
    pub fn consistency<S: Into<String>>(msg: S) -> Self {
        XiphosError::Consistency(msg.into())
    }

    /// Create a new duplicate identifier error.
    pub fn duplicate_identifier<S: Into<String>>(id: S) -> Self {
        XiphosError::DuplicateIdentifier(id.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        XiphosError::Query(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        XiphosError::Storage(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        XiphosError::InvalidConfig(msg.into())
    }

    /// Create a new XML error.
    pub fn xml<S: Into<String>>(msg: S) -> Self {
        XiphosError::Xml(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        XiphosError::Other(msg.into())
    }
}
