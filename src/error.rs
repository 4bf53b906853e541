//! Error types for hilite

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for highlighting operations
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Highlighting engine error types
#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("Syntax file was not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("No such theme: {0}")]
    ThemeNotFound(String),

    #[error("Theme already exists: {0}")]
    ThemeExists(String),

    #[error("Theme is protected: {0}")]
    ThemeProtected(String),

    #[error("I/O error: {0}")]
    Output(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    Message(String),
}

impl SyntaxError {
    /// Wrap an I/O failure with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyntaxError::Io {
            path: path.into(),
            source,
        }
    }
}
