//! Context (identity/account) model types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Predicate deciding whether a context applies to an original message.
///
/// Receives `None` when there is no original (a brand new message).
pub type MatchFn = Arc<dyn Fn(Option<&Message>) -> bool + Send + Sync>;

/// How a context recognizes the messages it is responsible for.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ContextMatch {
    /// Never matches; the context is only picked by policy or prompt.
    #[default]
    Never,
    /// Always matches.
    Any,
    /// Original was addressed to this address (To, Cc, Delivered-To, X-Original-To).
    Recipient {
        /// Address to look for, compared case-insensitively.
        address: String,
    },
    /// A header of the original contains a fragment (case-insensitive).
    Header {
        /// Header name.
        name: String,
        /// Fragment to look for.
        contains: String,
    },
    /// Original is stored under this folder.
    Folder {
        /// Folder path prefix.
        prefix: PathBuf,
    },
    /// Programmatic predicate.
    #[serde(skip)]
    Custom(MatchFn),
}

const RECIPIENT_HEADERS: [&str; 4] = ["to", "cc", "delivered-to", "x-original-to"];

impl ContextMatch {
    /// Run the predicate.
    #[must_use]
    pub fn matches(&self, original: Option<&Message>) -> bool {
        match self {
            Self::Never => false,
            Self::Any => true,
            Self::Custom(predicate) => predicate(original),
            Self::Recipient { address } => original.is_some_and(|message| {
                let address = address.to_lowercase();
                RECIPIENT_HEADERS
                    .iter()
                    .flat_map(|name| message.headers.get_all(name))
                    .any(|value| value.to_lowercase().contains(&address))
            }),
            Self::Header { name, contains } => original.is_some_and(|message| {
                let needle = contains.to_lowercase();
                message
                    .headers
                    .get_all(name)
                    .iter()
                    .any(|value| value.to_lowercase().contains(&needle))
            }),
            Self::Folder { prefix } => original
                .and_then(Message::location)
                .is_some_and(|location| location.starts_with(prefix)),
        }
    }
}

impl fmt::Debug for ContextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Any => f.write_str("Any"),
            Self::Recipient { address } => {
                f.debug_struct("Recipient").field("address", address).finish()
            }
            Self::Header { name, contains } => f
                .debug_struct("Header")
                .field("name", name)
                .field("contains", contains)
                .finish(),
            Self::Folder { prefix } => f.debug_struct("Folder").field("prefix", prefix).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// An identity/account configuration selectable per draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Display name of the context.
    pub name: String,
    /// From address used for drafts in this context.
    pub identity: String,
    /// Predicate over the original message.
    #[serde(default, rename = "match")]
    pub matcher: ContextMatch,
    /// Folder where drafts are saved.
    #[serde(default)]
    pub draft_folder: PathBuf,
    /// Folder where sent copies are filed.
    #[serde(default)]
    pub sent_folder: PathBuf,
    /// Folder where trashed sent copies go.
    #[serde(default)]
    pub trash_folder: PathBuf,
}

impl Context {
    /// Create a context with folders laid out under a maildir root.
    #[must_use]
    pub fn under_root(name: &str, identity: &str, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            name: name.to_string(),
            identity: identity.to_string(),
            matcher: ContextMatch::Never,
            draft_folder: root.join("Drafts"),
            sent_folder: root.join("Sent"),
            trash_folder: root.join("Trash"),
        }
    }

    /// Set the match predicate (builder style).
    #[must_use]
    pub fn matching(mut self, matcher: ContextMatch) -> Self {
        self.matcher = matcher;
        self
    }

    /// Returns true if this context claims the original message.
    #[must_use]
    pub fn matches(&self, original: Option<&Message>) -> bool {
        self.matcher.matches(original)
    }
}

/// Policy applied when choosing a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextPolicy {
    /// Always prompt, even if a context matches.
    AlwaysAsk,
    /// Prompt when nothing matches.
    Ask,
    /// Prompt when nothing matches and no context is active.
    #[default]
    AskIfNone,
    /// Take the first configured context when nothing matches.
    PickFirst,
    /// Keep the active context when nothing matches.
    None,
}
