//! Error types for the Phalanx library.
//!
//! All failures raised while building or iterating a searcher tree are
//! represented by the [`PhalanxError`] enum.
//!
//! # Examples
//!
//! ```
//! use phalanx::error::{PhalanxError, Result};
//!
//! fn build() -> Result<()> {
//!     Err(PhalanxError::too_many_clauses(2048, 1024))
//! }
//!
//! match build() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Phalanx operations.
#[derive(Error, Debug)]
pub enum PhalanxError {
    /// I/O errors (document files, config files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors surfaced by an index reader.
    #[error("Index error: {0}")]
    Index(String),

    /// Malformed query parameters detected during tree construction.
    #[error("Query error: {0}")]
    Query(String),

    /// Invalid configuration values.
    #[error("Config error: {0}")]
    Config(String),

    /// Clause fan-out above the configured maximum.
    #[error("TooManyClauses[{count} > maxClauseCount, which is set to {max}]")]
    TooManyClauses { count: usize, max: usize },

    /// The reader lacks a capability the searcher requires.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PhalanxError.
pub type Result<T> = std::result::Result<T, PhalanxError>;

impl PhalanxError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Query(msg.into())
    }

    /// Create a new config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Config(msg.into())
    }

    /// Create a new too-many-clauses error.
    pub fn too_many_clauses(count: usize, max: usize) -> Self {
        PhalanxError::TooManyClauses { count, max }
    }

    /// Create a new unsupported-capability error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Unsupported(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        PhalanxError::InvalidOperation(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Other(msg.into())
    }
}
