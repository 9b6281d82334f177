//! JSON reports printed by the subcommands.

use std::path::PathBuf;

use draftline_core::{Context, ContextPolicy, CryptoPolicySet, EngineConfig, SendSummary};
use serde::Serialize;

/// Summary of a loaded configuration.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub source: Option<PathBuf>,
    pub policy: CryptoPolicySet,
    pub sent_behavior: String,
    pub context_policy: ContextPolicy,
    pub contexts: Vec<ContextReport>,
}

#[derive(Debug, Serialize)]
pub struct ContextReport {
    pub name: String,
    pub identity: String,
    pub matcher: String,
    pub draft_folder: PathBuf,
    pub sent_folder: PathBuf,
    pub trash_folder: PathBuf,
}

impl From<&Context> for ContextReport {
    fn from(context: &Context) -> Self {
        Self {
            name: context.name.clone(),
            identity: context.identity.clone(),
            matcher: format!("{:?}", context.matcher),
            draft_folder: context.draft_folder.clone(),
            sent_folder: context.sent_folder.clone(),
            trash_folder: context.trash_folder.clone(),
        }
    }
}

impl ConfigReport {
    pub fn new(config: &EngineConfig, source: Option<PathBuf>) -> Self {
        Self {
            source,
            policy: config.policy.clone(),
            sent_behavior: format!("{:?}", config.sent_behavior),
            context_policy: config.context_policy,
            contexts: config.contexts.iter().map(ContextReport::from).collect(),
        }
    }
}

/// Result of a dry-run compose.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExplainReport {
    /// The operator declined to pick a context.
    Aborted,
    /// The draft went all the way through.
    Sent {
        summary: Box<SendSummary>,
        store_log: Vec<String>,
    },
    /// The draft was closed unsent.
    Discarded,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn config_report_lists_contexts() {
        let config = EngineConfig::default()
            .with_context(Context::under_root("home", "me@home.example", "/mail/home"));
        let report = ConfigReport::new(&config, None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["contexts"][0]["name"], "home");
        assert_eq!(json["contexts"][0]["sent_folder"], "/mail/home/Sent");
        assert_eq!(json["sent_behavior"], "Fixed(Sent)");
    }

    #[test]
    fn aborted_report_is_tagged() {
        let json = serde_json::to_value(ExplainReport::Aborted).unwrap();
        assert_eq!(json["outcome"], "aborted");
    }
}
