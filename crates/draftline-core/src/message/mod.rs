//! Stored-message view used by the engine.
//!
//! Messages are read-only here: the engine inspects flags and headers of
//! an original message and asks the store to change them.

mod headers;
pub mod message_id;
mod model;

pub use headers::Headers;
pub use message_id::{extract_message_id, extract_message_ids};
pub use model::{Flag, FlagDelta, Flags, Message, MessageId};
