//! Maps a sent behavior onto a target folder.

use std::path::PathBuf;

use tracing::debug;

use super::model::{SendContext, SentBehavior, SentBehaviorSource};
use crate::context::Context;
use crate::{Error, Result};

/// Decide where the sent copy goes; `None` means no copy is kept.
///
/// The source is evaluated here, at send time, so it may depend on the
/// final state of the draft.
///
/// # Errors
///
/// Returns a configuration error when the source yields no supported
/// behavior or the chosen folder is not configured for the context.
pub fn resolve(source: &SentBehaviorSource, send: &SendContext<'_>) -> Result<Option<PathBuf>> {
    let behavior = source.evaluate(send)?;
    let target = target_folder(behavior, send.context)?;
    debug!(
        context = %send.context.name,
        %behavior,
        folder = ?target,
        "Resolved sent-message disposition"
    );
    Ok(target)
}

/// Folder for a concrete behavior in a context.
///
/// # Errors
///
/// Returns a configuration error when the folder is empty.
pub fn target_folder(behavior: SentBehavior, context: &Context) -> Result<Option<PathBuf>> {
    let folder = match behavior {
        SentBehavior::Delete => return Ok(None),
        SentBehavior::Sent => &context.sent_folder,
        SentBehavior::Trash => &context.trash_folder,
    };
    if folder.as_os_str().is_empty() {
        return Err(Error::config(format!(
            "context '{}' has no {behavior} folder configured",
            context.name
        )));
    }
    Ok(Some(folder.clone()))
}
