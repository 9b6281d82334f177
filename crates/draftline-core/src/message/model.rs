//! Message model types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::headers::Headers;

/// Opaque message identifier, stored without enclosing angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a message ID, stripping surrounding whitespace and angle brackets.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref().trim();
        let id = id.strip_prefix('<').unwrap_or(id);
        let id = id.strip_suffix('>').unwrap_or(id);
        Self(id.to_string())
    }

    /// The bare identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier in header form, `<id>`.
    #[must_use]
    pub fn bracketed(&self) -> String {
        format!("<{}>", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Message flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Flag {
    /// Message is an unsent draft.
    Draft,
    /// Message body is encrypted.
    Encrypted,
    /// Message has been replied to.
    Replied,
    /// Message has been forwarded.
    Passed,
    /// Message has been read.
    Seen,
    /// Message is flagged for special attention.
    Flagged,
    /// Message has been moved to trash.
    Trashed,
    /// Custom keyword flag.
    Keyword(String),
}

impl Flag {
    /// Parses a flag name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "draft" => Self::Draft,
            "encrypted" => Self::Encrypted,
            "replied" => Self::Replied,
            "passed" => Self::Passed,
            "seen" => Self::Seen,
            "flagged" => Self::Flagged,
            "trashed" => Self::Trashed,
            _ => Self::Keyword(s.to_string()),
        }
    }

    /// Returns the flag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Encrypted => "encrypted",
            Self::Replied => "replied",
            Self::Passed => "passed",
            Self::Seen => "seen",
            Self::Flagged => "flagged",
            Self::Trashed => "trashed",
            Self::Keyword(s) => s,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Flag {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Flag> for String {
    fn from(flag: Flag) -> Self {
        flag.as_str().to_string()
    }
}

/// Collection of message flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags {
    flags: Vec<Flag>,
}

impl Flags {
    /// Creates an empty flags collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag.
    pub fn insert(&mut self, flag: Flag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Removes a flag.
    pub fn remove(&mut self, flag: &Flag) {
        self.flags.retain(|f| f != flag);
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn contains(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Applies an add/remove delta.
    pub fn apply(&mut self, delta: &FlagDelta) {
        for flag in &delta.add {
            self.insert(flag.clone());
        }
        for flag in &delta.remove {
            self.remove(flag);
        }
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut flags = Self::new();
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

/// A combined flag change request, rendered as `+replied +seen -draft`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDelta {
    /// Flags to add.
    pub add: Vec<Flag>,
    /// Flags to remove.
    pub remove: Vec<Flag>,
}

impl FlagDelta {
    /// An empty delta.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            add: Vec::new(),
            remove: Vec::new(),
        }
    }

    /// A delta that only adds flags.
    #[must_use]
    pub fn adding(flags: impl IntoIterator<Item = Flag>) -> Self {
        Self {
            add: flags.into_iter().collect(),
            remove: Vec::new(),
        }
    }

    /// Returns true if the delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

impl fmt::Display for FlagDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let added = self.add.iter().map(|flag| format!("+{flag}"));
        let removed = self.remove.iter().map(|flag| format!("-{flag}"));
        let parts: Vec<String> = added.chain(removed).collect();
        f.write_str(&parts.join(" "))
    }
}

/// A stored message as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Current flags.
    #[serde(default)]
    pub flags: Flags,
    /// Header fields.
    #[serde(default)]
    pub headers: Headers,
    /// Storage location, if the store exposes one.
    #[serde(default)]
    pub location: Option<PathBuf>,
}

impl Message {
    /// Create a message with no flags or headers.
    #[must_use]
    pub fn new(id: impl Into<MessageId>) -> Self {
        Self {
            id: id.into(),
            flags: Flags::new(),
            headers: Headers::new(),
            location: None,
        }
    }

    /// Add a flag (builder style).
    #[must_use]
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Set a header (builder style).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Set the storage location (builder style).
    #[must_use]
    pub fn at(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns true if the message carries the Draft flag.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.flags.contains(&Flag::Draft)
    }

    /// Returns true if the message carries the Encrypted flag.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.flags.contains(&Flag::Encrypted)
    }

    /// Storage location as a path, if known.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod message_id_tests {
        use super::*;

        #[test]
        fn strips_brackets() {
            assert_eq!(MessageId::new("<a@x>").as_str(), "a@x");
            assert_eq!(MessageId::new("  <a@x>  ").as_str(), "a@x");
            assert_eq!(MessageId::new("a@x").as_str(), "a@x");
        }

        #[test]
        fn bracketed() {
            assert_eq!(MessageId::new("a@x").bracketed(), "<a@x>");
        }
    }

    mod flag_tests {
        use super::*;

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!(Flag::parse("Replied"), Flag::Replied);
            assert_eq!(Flag::parse("PASSED"), Flag::Passed);
            assert_eq!(Flag::parse("draft"), Flag::Draft);
        }

        #[test]
        fn parse_keyword() {
            assert_eq!(Flag::parse("$todo"), Flag::Keyword("$todo".to_string()));
        }

        #[test]
        fn serde_as_string() {
            let json = serde_json::to_string(&Flag::Encrypted).unwrap();
            assert_eq!(json, "\"encrypted\"");
            let flag: Flag = serde_json::from_str("\"seen\"").unwrap();
            assert_eq!(flag, Flag::Seen);
        }
    }

    mod flags_tests {
        use super::*;

        #[test]
        fn insert_deduplicates() {
            let mut flags = Flags::new();
            flags.insert(Flag::Seen);
            flags.insert(Flag::Seen);
            assert_eq!(flags, [Flag::Seen].into_iter().collect::<Flags>());
        }

        #[test]
        fn apply_delta() {
            let mut flags: Flags = [Flag::Draft].into_iter().collect();
            let delta = FlagDelta {
                add: vec![Flag::Replied, Flag::Seen],
                remove: vec![Flag::Draft],
            };
            flags.apply(&delta);
            assert!(flags.contains(&Flag::Replied));
            assert!(flags.contains(&Flag::Seen));
            assert!(!flags.contains(&Flag::Draft));
        }
    }

    mod flag_delta_tests {
        use super::*;

        #[test]
        fn display() {
            let delta = FlagDelta {
                add: vec![Flag::Passed, Flag::Seen],
                remove: vec![Flag::Draft],
            };
            assert_eq!(delta.to_string(), "+passed +seen -draft");
        }

        #[test]
        fn empty() {
            assert!(FlagDelta::none().is_empty());
            assert_eq!(FlagDelta::none().to_string(), "");
        }
    }

    #[test]
    fn message_builders() {
        let message = Message::new("<m1@h>")
            .with_flag(Flag::Encrypted)
            .with_header("Subject", "hi")
            .at("/mail/inbox/cur/1");
        assert_eq!(message.id.as_str(), "m1@h");
        assert!(message.is_encrypted());
        assert!(!message.is_draft());
        assert_eq!(message.headers.get("subject"), Some("hi"));
        assert_eq!(message.location(), Some(Path::new("/mail/inbox/cur/1")));
    }

    #[test]
    fn message_from_json() {
        let json = r#"{
            "id": "m1@h",
            "flags": ["encrypted", "seen"],
            "headers": {"In-Reply-To": "<p@h>"}
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert!(message.is_encrypted());
        assert_eq!(message.headers.get("in-reply-to"), Some("<p@h>"));
        assert!(message.location.is_none());
    }
}
