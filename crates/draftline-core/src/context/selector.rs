//! Context selection.

use super::model::{Context, ContextPolicy};
use crate::message::Message;
use crate::{Error, Result};

/// Outcome of context selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Use the context at this index.
    Selected(usize),
    /// Ask the operator.
    Prompt,
    /// Keep whatever context is active (possibly none).
    Unchanged,
}

/// Choose a context for a draft.
///
/// A matching context always wins unless the policy is `AlwaysAsk`.
/// `active` is the index of the currently active context, if any.
///
/// # Errors
///
/// Returns a configuration error when the policy needs a context to pick
/// or prompt for and none are configured.
pub fn select(
    policy: ContextPolicy,
    contexts: &[Context],
    original: Option<&Message>,
    active: Option<usize>,
) -> Result<Selection> {
    if policy == ContextPolicy::AlwaysAsk {
        return prompt(contexts);
    }

    if let Some(index) = contexts.iter().position(|c| c.matches(original)) {
        return Ok(Selection::Selected(index));
    }

    match policy {
        ContextPolicy::AskIfNone if active.is_some() => Ok(Selection::Unchanged),
        ContextPolicy::AskIfNone | ContextPolicy::Ask | ContextPolicy::AlwaysAsk => {
            prompt(contexts)
        }
        ContextPolicy::PickFirst if contexts.is_empty() => Err(Error::config(
            "context policy pick-first needs at least one configured context",
        )),
        ContextPolicy::PickFirst => Ok(Selection::Selected(0)),
        ContextPolicy::None => Ok(Selection::Unchanged),
    }
}

fn prompt(contexts: &[Context]) -> Result<Selection> {
    if contexts.is_empty() {
        Err(Error::config("no contexts configured to choose from"))
    } else {
        Ok(Selection::Prompt)
    }
}
