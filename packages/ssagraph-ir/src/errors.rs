//! Error types for ssagraph-ir
//!
//! Only fatal conditions surface as `Err`. Problems inside a single construct
//! are absorbed into the program's diagnostics.

use crate::config::ConfigError;
use crate::shared::ports::Language;
use thiserror::Error;

/// Main error type for ssagraph-ir operations
#[derive(Debug, Error)]
pub enum SsaGraphError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Grammar could not be loaded or the parser produced no tree
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File system capability missing or failing
    #[error("File system error: {0}")]
    FileSystem(String),

    /// No frontend registered for the requested language
    #[error("No frontend registered for language '{0}'")]
    UnsupportedLanguage(Language),

    /// The build was cancelled through its cancellation token
    #[error("Build cancelled")]
    Cancelled,

    /// Pipeline stage failure (worker panic, closed channel)
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl SsaGraphError {
    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        SsaGraphError::Parse(msg.into())
    }

    /// Create a file system error
    pub fn file_system(msg: impl Into<String>) -> Self {
        SsaGraphError::FileSystem(msg.into())
    }

    /// Create a pipeline error
    pub fn pipeline(msg: impl Into<String>) -> Self {
        SsaGraphError::Pipeline(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SsaGraphError::Cancelled)
    }
}

/// Result type alias for ssagraph operations
pub type Result<T> = std::result::Result<T, SsaGraphError>;
