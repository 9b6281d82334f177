//! Identity/account contexts and how one is picked for a draft.
//!
//! Selection is pure: it looks at each context's match predicate and the
//! configured [`ContextPolicy`]. Prompting the operator is left to the
//! caller (see [`crate::compose::Operator`]).

mod model;
mod selector;

pub use model::{Context, ContextMatch, ContextPolicy, MatchFn};
pub use selector::{Selection, select};
