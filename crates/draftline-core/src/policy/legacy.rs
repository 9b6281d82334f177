//! Compatibility adapter for the old single-value reply policy.
//!
//! Older configurations described reply handling as one value per side:
//! what to do when replying to an encrypted message and what to do when
//! replying to a plain one. It is expanded into policy tokens once, at
//! configuration load, so the resolver never sees it.

use serde::{Deserialize, Serialize};

use super::model::{CryptoPolicy, CryptoPolicySet};

/// What the legacy setting asked for on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegacyAction {
    /// Leave the reply alone.
    #[default]
    None,
    /// Sign the reply.
    Sign,
    /// Encrypt the reply.
    Encrypt,
    /// Sign and encrypt the reply.
    SignAndEncrypt,
}

impl LegacyAction {
    const fn signs(self) -> bool {
        matches!(self, Self::Sign | Self::SignAndEncrypt)
    }

    const fn encrypts(self) -> bool {
        matches!(self, Self::Encrypt | Self::SignAndEncrypt)
    }
}

/// Deprecated two-value reply policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyReplyPolicy {
    /// Replies to encrypted messages.
    #[serde(default)]
    pub encrypted: LegacyAction,
    /// Replies to plain messages.
    #[serde(default)]
    pub plain: LegacyAction,
}

impl LegacyReplyPolicy {
    /// Expand into the equivalent token set.
    #[must_use]
    pub fn expand(self) -> CryptoPolicySet {
        let mut tokens = CryptoPolicySet::empty();
        if self.encrypted.signs() {
            tokens.insert(CryptoPolicy::SignEncryptedReplies);
        }
        if self.encrypted.encrypts() {
            tokens.insert(CryptoPolicy::EncryptEncryptedReplies);
        }
        if self.plain.signs() {
            tokens.insert(CryptoPolicy::SignPlainReplies);
        }
        if self.plain.encrypts() {
            tokens.insert(CryptoPolicy::EncryptPlainReplies);
        }
        tokens
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compose::ComposeType;
    use crate::policy::{CryptoDecision, resolve};

    #[test]
    fn none_expands_to_nothing() {
        assert!(LegacyReplyPolicy::default().expand().is_empty());
    }

    #[test]
    fn sign_and_encrypt_encrypted_replies() {
        let legacy = LegacyReplyPolicy {
            encrypted: LegacyAction::SignAndEncrypt,
            plain: LegacyAction::None,
        };
        let tokens = legacy.expand();
        assert!(tokens.contains(CryptoPolicy::SignEncryptedReplies));
        assert!(tokens.contains(CryptoPolicy::EncryptEncryptedReplies));
        assert_eq!(tokens.iter().count(), 2);
    }

    #[test]
    fn plain_side() {
        let legacy = LegacyReplyPolicy {
            encrypted: LegacyAction::None,
            plain: LegacyAction::Sign,
        };
        let tokens = legacy.expand();
        assert!(tokens.contains(CryptoPolicy::SignPlainReplies));
        assert!(!tokens.contains(CryptoPolicy::EncryptPlainReplies));
    }

    #[test]
    fn expanded_policy_resolves_like_the_legacy_value() {
        let legacy = LegacyReplyPolicy {
            encrypted: LegacyAction::Encrypt,
            plain: LegacyAction::Sign,
        };
        let tokens = legacy.expand();
        assert_eq!(
            resolve(ComposeType::Reply, true, &tokens),
            CryptoDecision::new(false, true)
        );
        assert_eq!(
            resolve(ComposeType::Reply, false, &tokens),
            CryptoDecision::new(true, false)
        );
    }

    #[test]
    fn deserialize() {
        let legacy: LegacyReplyPolicy =
            serde_json::from_str(r#"{"encrypted": "sign-and-encrypt"}"#).unwrap();
        assert_eq!(legacy.encrypted, LegacyAction::SignAndEncrypt);
        assert_eq!(legacy.plain, LegacyAction::None);
    }
}
