//! Error types shared across wmforge crates.

use std::path::PathBuf;

/// Top-level error type for wmforge operations.
///
/// Compiling a command never fails; these cover the surfaces around it
/// (settings files, configuration, the assistant exchange).
#[derive(Debug, thiserror::Error)]
pub enum WmforgeError {
    #[error("Settings error: {message}")]
    Settings { message: String },

    #[error("Assistant error: {message}")]
    Assistant { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using WmforgeError.
pub type WmforgeResult<T> = Result<T, WmforgeError>;

impl WmforgeError {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings {
            message: msg.into(),
        }
    }

    pub fn assistant(msg: impl Into<String>) -> Self {
        Self::Assistant {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
