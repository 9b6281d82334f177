//! Reply/forward tracking from threading headers.
//!
//! After a draft is sent, its `In-Reply-To` and `References` headers tell
//! which earlier message it answered or passed on. That message gets its
//! Replied or Passed flag (together with Seen) through a single store move.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::message::{Flag, FlagDelta, Headers, MessageId, extract_message_id, extract_message_ids};
use crate::store::MessageStore;

/// How the sent draft relates to the earlier message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// The draft replied to the target.
    Reply,
    /// The draft forwarded the target.
    Forward,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reply => "reply",
            Self::Forward => "forward",
        })
    }
}

/// Link from a sent draft to the message it replied to or forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceLink {
    /// Reply or forward.
    pub kind: LinkKind,
    /// Earlier message.
    pub target: MessageId,
}

impl ReferenceLink {
    /// Flag change to request on the target.
    #[must_use]
    pub fn flag_delta(&self) -> FlagDelta {
        let marker = match self.kind {
            LinkKind::Reply => Flag::Replied,
            LinkKind::Forward => Flag::Passed,
        };
        FlagDelta::adding([marker, Flag::Seen])
    }

    /// Ask the store to flag the target. Failures are logged only.
    pub fn propagate<S: MessageStore + ?Sized>(&self, store: &S) {
        let delta = self.flag_delta();
        debug!(message_id = %self.target, kind = %self.kind, flags = %delta, "Flagging referenced message");
        match store.move_message(self.target.clone().into(), None, delta) {
            Ok(pending) => pending.detach(),
            Err(e) => warn!(message_id = %self.target, error = %e, "Failed to flag referenced message"),
        }
    }
}

/// Work out which message a draft replied to or forwarded.
///
/// `In-Reply-To` wins when it holds an id. Otherwise the first id of
/// `References` is taken as a forwarded message.
#[must_use]
pub fn infer(headers: &Headers) -> Option<ReferenceLink> {
    if let Some(target) = headers.get("in-reply-to").and_then(extract_message_id) {
        return Some(ReferenceLink {
            kind: LinkKind::Reply,
            target,
        });
    }

    headers
        .get_all("references")
        .into_iter()
        .flat_map(extract_message_ids)
        .next()
        .map(|target| ReferenceLink {
            kind: LinkKind::Forward,
            target,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::store::MemoryStore;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs.iter().copied().collect()
    }

    #[test]
    fn in_reply_to_is_reply() {
        let link = infer(&headers(&[("In-Reply-To", "<a@x>")])).unwrap();
        assert_eq!(link.kind, LinkKind::Reply);
        assert_eq!(link.target, MessageId::new("a@x"));
    }

    #[test]
    fn references_first_id_is_forward() {
        let link = infer(&headers(&[("References", "<r1@x> <r2@x> <r3@x>")])).unwrap();
        assert_eq!(link.kind, LinkKind::Forward);
        assert_eq!(link.target, MessageId::new("r1@x"));
    }

    #[test]
    fn in_reply_to_beats_references() {
        let link = infer(&headers(&[
            ("In-Reply-To", "<a@x>"),
            ("References", "<r1@x> <a@x>"),
        ]))
        .unwrap();
        assert_eq!(link.kind, LinkKind::Reply);
        assert_eq!(link.target, MessageId::new("a@x"));
    }

    #[test]
    fn comments_between_ids_are_skipped() {
        let link = infer(&headers(&[(
            "References",
            "(thread root) <r1@x>\n  (second) <r2@x>",
        )]))
        .unwrap();
        assert_eq!(link.target, MessageId::new("r1@x"));
    }

    #[test]
    fn unusable_in_reply_to_falls_through() {
        let link = infer(&headers(&[
            ("In-Reply-To", "your message of yesterday"),
            ("References", "<r1@x>"),
        ]))
        .unwrap();
        assert_eq!(link.kind, LinkKind::Forward);
    }

    #[test]
    fn nothing_to_link() {
        assert_eq!(infer(&Headers::new()), None);
        assert_eq!(infer(&headers(&[("References", "")])), None);
    }

    #[test]
    fn deltas_bundle_seen() {
        let reply = ReferenceLink {
            kind: LinkKind::Reply,
            target: MessageId::new("a@x"),
        };
        assert_eq!(reply.flag_delta().to_string(), "+replied +seen");
        let forward = ReferenceLink {
            kind: LinkKind::Forward,
            target: MessageId::new("a@x"),
        };
        assert_eq!(forward.flag_delta().to_string(), "+passed +seen");
    }

    #[test]
    fn propagate_flags_target() {
        let store = MemoryStore::new();
        store.insert(Message::new("m1@h"));
        let link = infer(&headers(&[("In-Reply-To", "<m1@h>")])).unwrap();
        link.propagate(&store);

        let message = store.message(&MessageId::new("m1@h")).unwrap();
        assert!(message.flags.contains(&Flag::Replied));
        assert!(message.flags.contains(&Flag::Seen));
    }

    #[test]
    fn propagate_to_missing_target_is_quiet() {
        let store = MemoryStore::new();
        let link = infer(&headers(&[("References", "<gone@h>")])).unwrap();
        link.propagate(&store);
        assert_eq!(store.snapshot().count("move"), 1);
    }
}
