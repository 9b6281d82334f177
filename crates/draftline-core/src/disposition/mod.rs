//! What happens to a message after it has been sent.
//!
//! The sent behavior is resolved into a target folder at send time. Filing
//! the copy is split into two best-effort store commands, `mkdir` for the
//! folder and `add` for the written file, which may complete in any order.

mod fcc;
mod model;
mod resolver;

pub use fcc::{FccHook, FolderRegistry};
pub use model::{BehaviorFn, FromRule, SendContext, SentBehavior, SentBehaviorSource};
pub use resolver::{resolve, target_folder};
