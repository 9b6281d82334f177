//! Commands understood by the message store.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::compose::ComposeType;
use crate::message::{FlagDelta, Headers, MessageId};

/// Acknowledgement channel for fire-and-forget commands.
///
/// Dropping it without sending counts as a silent completion.
pub type Ack = oneshot::Sender<Result<(), StoreError>>;

/// Reply channel for a compose request.
pub type BootstrapReply = oneshot::Sender<Result<DraftBootstrap, StoreError>>;

/// Errors reported by a message store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store is not accepting commands (backend gone).
    #[error("message store unavailable")]
    Unavailable,

    /// No message or file with this identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// Folder or file already exists.
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Any other backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// A stored message, named by id or by the file holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageRef {
    /// Message identifier.
    Id(MessageId),
    /// File the message is stored in.
    Path(PathBuf),
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "<{id}>"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<MessageId> for MessageRef {
    fn from(id: MessageId) -> Self {
        Self::Id(id)
    }
}

impl From<PathBuf> for MessageRef {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Headers and body the store prepares for a new draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftBootstrap {
    /// Pre-filled headers (To, Subject, In-Reply-To, References, ...).
    pub headers: Headers,
    /// Pre-filled body (citation, forwarded part, saved draft text).
    pub body: String,
}

/// A single store command.
#[derive(Debug)]
pub enum StoreCommand {
    /// Prepare draft material for a compose type.
    ComposeRequest {
        /// Kind of draft.
        kind: ComposeType,
        /// Decrypt the original while preparing.
        decrypt: bool,
        /// Original message, absent for new messages.
        original: Option<MessageId>,
        /// Where to send the prepared material.
        reply: BootstrapReply,
    },
    /// Index a file.
    Add {
        /// File to index.
        path: PathBuf,
        /// Acknowledgement.
        ack: Ack,
    },
    /// Drop a message from the index.
    Remove {
        /// Message to drop.
        target: MessageRef,
        /// Acknowledgement.
        ack: Ack,
    },
    /// Move a message and/or change its flags.
    Move {
        /// Message to change.
        target: MessageRef,
        /// Target folder, `None` to keep it where it is.
        folder: Option<PathBuf>,
        /// Flag changes.
        flags: FlagDelta,
        /// Acknowledgement.
        ack: Ack,
    },
    /// Create a folder; existing folders are fine.
    Mkdir {
        /// Folder to create.
        path: PathBuf,
        /// Acknowledgement.
        ack: Ack,
    },
    /// Record that the message at this path was transmitted.
    Sent {
        /// Sent file.
        path: PathBuf,
        /// Acknowledgement.
        ack: Ack,
    },
}

impl StoreCommand {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ComposeRequest { .. } => "compose",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Move { .. } => "move",
            Self::Mkdir { .. } => "mkdir",
            Self::Sent { .. } => "sent",
        }
    }
}
