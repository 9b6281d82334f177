//! Engine configuration.
//!
//! Loaded from JSON. Every field is optional; missing fields take the
//! defaults below. A deprecated reply policy is folded into the token set
//! once, at load time.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::context::{Context, ContextPolicy};
use crate::disposition::{SentBehavior, SentBehaviorSource};
use crate::policy::{CryptoPolicySet, LegacyReplyPolicy};
use crate::{Error, Result};

/// Everything the engine is configured with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Crypto policy tokens.
    pub policy: CryptoPolicySet,
    /// Deprecated reply policy; expanded into `policy` by [`Self::normalize`].
    pub legacy_reply_policy: Option<LegacyReplyPolicy>,
    /// What happens to sent messages.
    pub sent_behavior: SentBehaviorSource,
    /// How a context is chosen for a draft.
    pub context_policy: ContextPolicy,
    /// Configured contexts, in priority order.
    pub contexts: Vec<Context>,
}

impl EngineConfig {
    /// Parse and normalize a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unsupported values and a
    /// serialization error for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json).map_err(|e| {
            if e.is_data() {
                Error::config(e.to_string())
            } else {
                Error::Serde(e)
            }
        })?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise as
    /// [`Self::from_json`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let config = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            contexts = config.contexts.len(),
            "Loaded engine configuration"
        );
        Ok(config)
    }

    /// Fold the deprecated reply policy into the token set.
    ///
    /// Running it again is a no-op.
    pub fn normalize(&mut self) {
        if let Some(legacy) = self.legacy_reply_policy.take() {
            let expanded = legacy.expand();
            debug!(?legacy, tokens = ?expanded, "Expanding legacy reply policy");
            self.policy.extend(&expanded);
        }
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for duplicate context names, contexts
    /// without an identity, or a fixed sent behavior whose folder is
    /// missing from a context.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for context in &self.contexts {
            if !names.insert(context.name.as_str()) {
                return Err(Error::config(format!(
                    "duplicate context name '{}'",
                    context.name
                )));
            }
            if context.identity.trim().is_empty() {
                return Err(Error::config(format!(
                    "context '{}' has no identity",
                    context.name
                )));
            }
            if let SentBehaviorSource::Fixed(behavior) = &self.sent_behavior {
                crate::disposition::target_folder(*behavior, context)?;
            }
        }
        Ok(())
    }

    /// Index of the context with this name.
    #[must_use]
    pub fn context_index(&self, name: &str) -> Option<usize> {
        self.contexts.iter().position(|c| c.name == name)
    }

    /// Builder: use a fixed sent behavior.
    #[must_use]
    pub fn with_sent_behavior(mut self, behavior: SentBehavior) -> Self {
        self.sent_behavior = behavior.into();
        self
    }

    /// Builder: add a context.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.contexts.push(context);
        self
    }

    /// Builder: set the context policy.
    #[must_use]
    pub const fn with_context_policy(mut self, policy: ContextPolicy) -> Self {
        self.context_policy = policy;
        self
    }
}
