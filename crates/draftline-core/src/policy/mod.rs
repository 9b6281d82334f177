//! Crypto policy: decides whether a draft is signed and/or encrypted.

pub mod legacy;
mod model;
mod resolver;

pub use legacy::{LegacyAction, LegacyReplyPolicy};
pub use model::{CryptoDecision, CryptoPolicy, CryptoPolicySet, SecureOperation};
pub use resolver::resolve;
