//! Crypto policy resolution.

use super::model::{CryptoDecision, CryptoPolicy, CryptoPolicySet};
use crate::compose::ComposeType;

/// Decide whether a draft is signed and/or encrypted.
///
/// Every clause is independent; any one matching token sets the flag.
/// `Resend` is only covered by the `*AllMessages` tokens.
#[must_use]
pub fn resolve(
    kind: ComposeType,
    original_encrypted: bool,
    policy: &CryptoPolicySet,
) -> CryptoDecision {
    use CryptoPolicy::{
        EncryptAllMessages, EncryptAllReplies, EncryptEditedMessages, EncryptEncryptedReplies,
        EncryptForwardedMessages, EncryptNewMessages, EncryptPlainReplies, SignAllMessages,
        SignAllReplies, SignEditedMessages, SignEncryptedReplies, SignForwardedMessages,
        SignNewMessages, SignPlainReplies,
    };

    let sign = clause(
        kind,
        original_encrypted,
        policy,
        Tokens {
            all: SignAllMessages,
            new: SignNewMessages,
            forwarded: SignForwardedMessages,
            edited: SignEditedMessages,
            all_replies: SignAllReplies,
            plain_replies: SignPlainReplies,
            encrypted_replies: SignEncryptedReplies,
        },
    );
    let encrypt = clause(
        kind,
        original_encrypted,
        policy,
        Tokens {
            all: EncryptAllMessages,
            new: EncryptNewMessages,
            forwarded: EncryptForwardedMessages,
            edited: EncryptEditedMessages,
            all_replies: EncryptAllReplies,
            plain_replies: EncryptPlainReplies,
            encrypted_replies: EncryptEncryptedReplies,
        },
    );

    CryptoDecision { sign, encrypt }
}

/// One side (sign or encrypt) of the token table.
struct Tokens {
    all: CryptoPolicy,
    new: CryptoPolicy,
    forwarded: CryptoPolicy,
    edited: CryptoPolicy,
    all_replies: CryptoPolicy,
    plain_replies: CryptoPolicy,
    encrypted_replies: CryptoPolicy,
}

fn clause(
    kind: ComposeType,
    original_encrypted: bool,
    policy: &CryptoPolicySet,
    tokens: Tokens,
) -> bool {
    let has = |token| policy.contains(token);

    has(tokens.all)
        || match kind {
            ComposeType::New => has(tokens.new),
            ComposeType::Forward => has(tokens.forwarded),
            ComposeType::Edit => has(tokens.edited),
            ComposeType::Reply => {
                has(tokens.all_replies)
                    || (!original_encrypted && has(tokens.plain_replies))
                    || (original_encrypted && has(tokens.encrypted_replies))
            }
            ComposeType::Resend => false,
        }
}
