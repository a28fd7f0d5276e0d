//! Error types for the shotpick library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`ShotpickError`] enum. Collaborator implementations (storage, embedding)
//! can build errors with the snake_case constructors or convert an
//! [`anyhow::Error`] with `?`.
//!
//! # Examples
//!
//! ```
//! use shotpick::error::{Result, ShotpickError};
//!
//! fn fetch() -> Result<()> {
//!     Err(ShotpickError::storage("database unavailable"))
//! }
//!
//! match fetch() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for shotpick operations.
#[derive(Error, Debug)]
pub enum ShotpickError {
    /// A vector's length does not match the index dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector contains NaN or infinite values.
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// An id is already present in the index (or repeated within a batch).
    #[error("Duplicate id: {0}")]
    DuplicateId(u64),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Embedding collaborator errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by collaborator code written against anyhow
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with ShotpickError.
pub type Result<T> = std::result::Result<T, ShotpickError>;

impl ShotpickError {
    /// Create a new dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        ShotpickError::DimensionMismatch { expected, actual }
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        ShotpickError::Index(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        ShotpickError::Storage(msg.into())
    }

    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        ShotpickError::Embedding(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        ShotpickError::InvalidConfig(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ShotpickError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ShotpickError::Other(msg.into())
    }

    /// Returns true for [`ShotpickError::DimensionMismatch`].
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, ShotpickError::DimensionMismatch { .. })
    }
}
