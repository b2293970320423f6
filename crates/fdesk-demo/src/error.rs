use std::path::PathBuf;

use fdesk_runtime::{ConfigError, CreationError};
use fdesk_widgets::QuickAddError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Creation(#[from] CreationError),

    #[error("quick add rejected: {0}")]
    QuickAdd(#[from] QuickAddError),

    #[error("config file does not exist: {path}")]
    MissingConfig { path: PathBuf },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("failed to install log subscriber: {message}")]
    Logging { message: String },

    #[error("script step failed: {message}")]
    Script { message: String },
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::MissingConfig { .. } | Self::Config(_) => 2,
            Self::Script { .. } | Self::Creation(_) | Self::QuickAdd(_) => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }
}
