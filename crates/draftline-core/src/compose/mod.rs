//! Compose sessions.
//!
//! A [`ComposeSession`] carries one draft from the compose request through
//! context selection, the crypto decision, and the editor, to sending and
//! disposal:
//!
//! ```text
//! Initiating -> ContextResolving -> EditorOpen -> Sending -> Disposing -> Closed
//!                                       \-> Discarded
//! ```

mod model;
mod operator;
mod session;

pub use model::{ComposeRequest, ComposeType, SessionState};
pub use operator::{ByName, Operator, Unattended};
pub use session::{ComposeSession, Outcome, SendSummary, Started};
