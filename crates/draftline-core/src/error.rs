//! Error types for the core library.

use thiserror::Error;

use crate::compose::ComposeType;
use crate::editor::EditorError;
use crate::store::StoreError;

/// Errors that can occur in core operations.
///
/// Best-effort failures (flag propagation, folder-exists races) never show
/// up here; they are logged and the triggering operation carries on.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error: unsupported sent behavior, missing folder,
    /// no context available under a policy that forbids prompting.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested operation is not valid in the current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A compose type that needs an original message was requested
    /// without one, or the store could not resolve it.
    #[error("No original message to {0}")]
    MissingSource(ComposeType),

    /// Message store could not accept a command.
    #[error("Message store error: {0}")]
    Store(#[from] StoreError),

    /// Editor surface failed.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a configuration error.
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Shorthand for an invalid-state error.
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
