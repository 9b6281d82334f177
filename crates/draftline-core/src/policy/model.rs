//! Crypto policy data models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single crypto policy token.
///
/// Tokens overlap on purpose: `SignAllMessages` covers everything the
/// narrower `Sign*` tokens do. Redundant combinations are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CryptoPolicy {
    /// Sign every outgoing message.
    SignAllMessages,
    /// Encrypt every outgoing message.
    EncryptAllMessages,
    /// Sign new messages.
    SignNewMessages,
    /// Encrypt new messages.
    EncryptNewMessages,
    /// Sign forwards.
    SignForwardedMessages,
    /// Encrypt forwards.
    EncryptForwardedMessages,
    /// Sign re-edited drafts.
    SignEditedMessages,
    /// Encrypt re-edited drafts.
    EncryptEditedMessages,
    /// Sign every reply.
    SignAllReplies,
    /// Encrypt every reply.
    EncryptAllReplies,
    /// Sign replies to unencrypted messages.
    SignPlainReplies,
    /// Encrypt replies to unencrypted messages.
    EncryptPlainReplies,
    /// Sign replies to encrypted messages.
    SignEncryptedReplies,
    /// Encrypt replies to encrypted messages.
    EncryptEncryptedReplies,
}

/// A flat set of policy tokens with OR semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CryptoPolicySet {
    tokens: BTreeSet<CryptoPolicy>,
}

impl CryptoPolicySet {
    /// A set with no tokens: never sign, never encrypt.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            tokens: BTreeSet::new(),
        }
    }

    /// Returns true if the token is in the set.
    #[must_use]
    pub fn contains(&self, token: CryptoPolicy) -> bool {
        self.tokens.contains(&token)
    }

    /// Adds a token.
    pub fn insert(&mut self, token: CryptoPolicy) {
        self.tokens.insert(token);
    }

    /// Adds every token of another set.
    pub fn extend(&mut self, other: &Self) {
        self.tokens.extend(other.tokens.iter().copied());
    }

    /// Returns an iterator over the tokens in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = CryptoPolicy> + '_ {
        self.tokens.iter().copied()
    }

    /// Returns true if the set has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for CryptoPolicySet {
    /// Sign and encrypt replies to encrypted messages.
    fn default() -> Self {
        [
            CryptoPolicy::EncryptEncryptedReplies,
            CryptoPolicy::SignEncryptedReplies,
        ]
        .into_iter()
        .collect()
    }
}

impl FromIterator<CryptoPolicy> for CryptoPolicySet {
    fn from_iter<I: IntoIterator<Item = CryptoPolicy>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

/// Whether a draft gets signed and/or encrypted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoDecision {
    /// Sign the message.
    pub sign: bool,
    /// Encrypt the message.
    pub encrypt: bool,
}

impl CryptoDecision {
    /// Neither sign nor encrypt.
    pub const PLAIN: Self = Self {
        sign: false,
        encrypt: false,
    };

    /// Create a decision.
    #[must_use]
    pub const fn new(sign: bool, encrypt: bool) -> Self {
        Self { sign, encrypt }
    }

    /// The single editor operation for this decision.
    ///
    /// Sign-and-encrypt is one combined operation, never two in sequence.
    #[must_use]
    pub const fn operation(&self) -> Option<SecureOperation> {
        match (self.sign, self.encrypt) {
            (true, true) => Some(SecureOperation::SignAndEncrypt),
            (true, false) => Some(SecureOperation::Sign),
            (false, true) => Some(SecureOperation::Encrypt),
            (false, false) => None,
        }
    }
}

/// Operation requested of the editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecureOperation {
    /// Sign only.
    Sign,
    /// Encrypt only.
    Encrypt,
    /// Sign and encrypt in one pass.
    SignAndEncrypt,
}
