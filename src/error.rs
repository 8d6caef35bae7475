//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`; CLI/main uses
//! `anyhow` for convenient propagation. The tag decoder has its own
//! [`TagError`](crate::id3::TagError), wrapped here together with the path
//! of the file that failed.

use std::path::PathBuf;

use crate::id3::TagError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Tag decode error for a specific file
    #[error("Tag error for {path}: {source}")]
    Tag {
        path: PathBuf,
        #[source]
        source: TagError,
    },

    /// Nothing stored under the requested key
    #[error("No entry stored under key {0:?}")]
    KeyNotFound(String),

    /// Stored value (de)serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a tag decode error.
    pub fn tag(path: impl Into<PathBuf>, source: TagError) -> Self {
        Self::Tag {
            path: path.into(),
            source,
        }
    }

    /// Create a key-not-found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound(key.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}
