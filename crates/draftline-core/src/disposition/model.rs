//! Sent-message behavior types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::message::Headers;
use crate::{Error, Result};

/// What happens to a message right after it has been transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SentBehavior {
    /// File a copy in the context's sent folder.
    Sent,
    /// File a copy in the context's trash folder.
    Trash,
    /// Keep no copy.
    Delete,
}

impl SentBehavior {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Trash => "trash",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for SentBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentBehavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sent" => Ok(Self::Sent),
            "trash" => Ok(Self::Trash),
            "delete" => Ok(Self::Delete),
            other => Err(Error::config(format!(
                "unsupported sent behavior '{other}' (expected sent, trash or delete)"
            ))),
        }
    }
}

impl TryFrom<String> for SentBehavior {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// What the sent behavior is computed from, at send time.
pub struct SendContext<'a> {
    /// From address of the draft being sent.
    pub from: Option<&'a str>,
    /// Context the draft is sent under.
    pub context: &'a Context,
    /// Final draft headers.
    pub headers: &'a Headers,
}

/// Programmatic sent behavior; `None` means no supported behavior applies.
pub type BehaviorFn = Arc<dyn Fn(&SendContext<'_>) -> Option<SentBehavior> + Send + Sync>;

/// One row of a from-address rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromRule {
    /// Fragment of the from address, compared case-insensitively.
    pub from_contains: String,
    /// Behavior when the fragment matches.
    pub behavior: SentBehavior,
}

impl FromRule {
    fn matches(&self, from: &str) -> bool {
        from.to_lowercase()
            .contains(&self.from_contains.to_lowercase())
    }
}

/// Source of the sent behavior, evaluated lazily when a message is sent.
#[derive(Clone, Deserialize)]
#[serde(from = "SourceRepr")]
pub enum SentBehaviorSource {
    /// Always the same behavior.
    Fixed(SentBehavior),
    /// First rule whose fragment appears in the from address wins.
    ByFrom {
        /// Rules in priority order.
        rules: Vec<FromRule>,
        /// Behavior when no rule matches.
        fallback: Option<SentBehavior>,
    },
    /// Computed by a host-supplied function.
    Dynamic(BehaviorFn),
}

impl SentBehaviorSource {
    /// Produce the behavior for a message being sent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no rule matches and there is no
    /// fallback, or when a dynamic source yields nothing.
    pub fn evaluate(&self, send: &SendContext<'_>) -> Result<SentBehavior> {
        match self {
            Self::Fixed(behavior) => Ok(*behavior),
            Self::ByFrom { rules, fallback } => {
                let from = send.from.unwrap_or_default();
                rules
                    .iter()
                    .find(|rule| rule.matches(from))
                    .map(|rule| rule.behavior)
                    .or(*fallback)
                    .ok_or_else(|| {
                        Error::config(format!("no sent behavior rule matches from address '{from}'"))
                    })
            }
            Self::Dynamic(compute) => compute(send).ok_or_else(|| {
                Error::config(format!(
                    "sent behavior function yielded no supported behavior in context '{}'",
                    send.context.name
                ))
            }),
        }
    }
}

impl Default for SentBehaviorSource {
    fn default() -> Self {
        Self::Fixed(SentBehavior::Sent)
    }
}

impl From<SentBehavior> for SentBehaviorSource {
    fn from(behavior: SentBehavior) -> Self {
        Self::Fixed(behavior)
    }
}

impl fmt::Debug for SentBehaviorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(behavior) => f.debug_tuple("Fixed").field(behavior).finish(),
            Self::ByFrom { rules, fallback } => f
                .debug_struct("ByFrom")
                .field("rules", rules)
                .field("fallback", fallback)
                .finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Configuration form: a bare behavior name or a rule table.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceRepr {
    Fixed(SentBehavior),
    ByFrom {
        by_from: Vec<FromRule>,
        #[serde(default)]
        fallback: Option<SentBehavior>,
    },
}

impl From<SourceRepr> for SentBehaviorSource {
    fn from(repr: SourceRepr) -> Self {
        match repr {
            SourceRepr::Fixed(behavior) => Self::Fixed(behavior),
            SourceRepr::ByFrom { by_from, fallback } => Self::ByFrom {
                rules: by_from,
                fallback,
            },
        }
    }
}
