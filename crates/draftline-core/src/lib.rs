//! # draftline-core
//!
//! Decision engine for the life of a draft email message.
//!
//! This crate provides:
//! - **Crypto policy** - whether a draft is signed and/or encrypted
//! - **Sent-message disposition** - where the sent copy is filed, if anywhere
//! - **Reference tracking** - flagging the message a draft replied to or forwarded
//! - **Contexts** - picking the identity/account a draft is written under
//! - **Compose sessions** - the state machine driving a draft from request to send
//!
//! The editor and the message store are collaborators reached through the
//! [`EditorSurface`] and [`MessageStore`] traits. In-memory implementations
//! of both ([`ScratchEditor`], [`MemoryStore`]) are included for tests and
//! dry runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod config;
pub mod context;
pub mod disposition;
pub mod editor;
mod error;
pub mod message;
pub mod policy;
pub mod reference;
pub mod store;

pub use compose::{
    ComposeRequest, ComposeSession, ComposeType, Operator, Outcome, SendSummary, SessionState,
    Started,
};
pub use config::EngineConfig;
pub use context::{Context, ContextMatch, ContextPolicy, Selection};
pub use disposition::{SentBehavior, SentBehaviorSource};
pub use editor::{DraftHandle, EditorError, EditorSurface, ScratchEditor, SendReport};
pub use error::{Error, Result};
pub use message::{Flag, FlagDelta, Flags, Headers, Message, MessageId};
pub use policy::{CryptoDecision, CryptoPolicy, CryptoPolicySet, SecureOperation};
pub use reference::{LinkKind, ReferenceLink};
pub use store::{ChannelStore, MemoryStore, MessageRef, MessageStore, StoreError};
