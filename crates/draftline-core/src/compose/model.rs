//! Compose request and session state types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::{Error, Result};

/// Kind of draft being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeType {
    /// A fresh message with no original.
    New,
    /// A reply to an original message.
    Reply,
    /// A forward of an original message.
    Forward,
    /// Continue editing a saved draft.
    Edit,
    /// Send an original message again unchanged (bounce).
    Resend,
}

impl ComposeType {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reply => "reply",
            Self::Forward => "forward",
            Self::Edit => "edit",
            Self::Resend => "resend",
        }
    }

    /// Returns true if this type works on an original message.
    #[must_use]
    pub const fn needs_original(&self) -> bool {
        !matches!(self, Self::New)
    }
}

impl fmt::Display for ComposeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComposeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "reply" => Ok(Self::Reply),
            "forward" => Ok(Self::Forward),
            "edit" => Ok(Self::Edit),
            "resend" => Ok(Self::Resend),
            other => Err(Error::config(format!("unknown compose type '{other}'"))),
        }
    }
}

/// A request to start composing.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Kind of draft.
    pub kind: ComposeType,
    /// Original message, required for every kind except `New`.
    pub original: Option<Message>,
    /// Files to attach to the draft.
    pub includes: Vec<PathBuf>,
}

impl ComposeRequest {
    /// A request for a new message.
    #[must_use]
    pub const fn new_message() -> Self {
        Self {
            kind: ComposeType::New,
            original: None,
            includes: Vec::new(),
        }
    }

    /// A request that works on an original message.
    #[must_use]
    pub const fn on(kind: ComposeType, original: Message) -> Self {
        Self {
            kind,
            original: Some(original),
            includes: Vec::new(),
        }
    }

    /// Attach files (builder style).
    #[must_use]
    pub fn including(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.includes.extend(files);
        self
    }

    /// Check the request before any session state exists.
    ///
    /// # Errors
    ///
    /// `InvalidState` when `New` carries an original or `Edit` targets a
    /// message without the Draft flag; `MissingSource` when an original is
    /// needed but absent.
    pub fn validate(&self) -> Result<()> {
        match (self.kind, &self.original) {
            (ComposeType::New, Some(original)) => Err(Error::invalid_state(format!(
                "a new message cannot reference original {}",
                original.id
            ))),
            (ComposeType::New, None) => Ok(()),
            (kind, None) => Err(Error::MissingSource(kind)),
            (ComposeType::Edit, Some(original)) if !original.is_draft() => {
                Err(Error::invalid_state(format!(
                    "message {} is not a draft and cannot be edited",
                    original.id
                )))
            }
            (_, Some(_)) => Ok(()),
        }
    }
}

/// Lifecycle state of a compose session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// Validating the request.
    Initiating,
    /// Picking the identity/account context.
    ContextResolving,
    /// Draft is open in the editor.
    EditorOpen,
    /// Operator asked to send; transmission in progress.
    Sending,
    /// Message transmitted; filing and flag updates running.
    Disposing,
    /// Sent and disposed.
    Closed,
    /// Abandoned without sending.
    Discarded,
}

impl SessionState {
    /// Returns true for terminal states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Discarded)
    }
}
