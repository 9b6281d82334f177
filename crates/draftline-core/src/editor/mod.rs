//! Editor surface interface.
//!
//! The editor owns draft buffers and their text. The engine only drives it
//! through [`EditorSurface`]: open a draft, set headers, request a secure
//! operation, and learn when the message has been transmitted.

mod scratch;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::compose::ComposeType;
use crate::message::Message;
use crate::policy::SecureOperation;
use crate::store::DraftBootstrap;

pub use scratch::{ScratchDraft, ScratchEditor};

/// Handle to a draft buffer owned by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DraftHandle(pub u64);

impl fmt::Display for DraftHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draft#{}", self.0)
    }
}

/// Everything the editor needs to materialize a draft.
#[derive(Debug, Clone, Copy)]
pub struct DraftSpec<'a> {
    /// Kind of draft.
    pub kind: ComposeType,
    /// Original message, if any.
    pub original: Option<&'a Message>,
    /// Headers and body prepared by the store.
    pub bootstrap: &'a DraftBootstrap,
    /// From address of the resolved context.
    pub from: &'a str,
    /// Files to attach.
    pub includes: &'a [PathBuf],
}

/// What the editor reports once a message has been transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    /// Where the filed copy was written, if one was requested.
    pub filed_copy: Option<PathBuf>,
    /// When transmission finished.
    pub transmitted_at: DateTime<Utc>,
}

impl SendReport {
    /// Report a transmission that just finished.
    #[must_use]
    pub fn now(filed_copy: Option<PathBuf>) -> Self {
        Self {
            filed_copy,
            transmitted_at: Utc::now(),
        }
    }
}

/// One-shot signal the editor fires after transmission.
///
/// Dropping it without sending means the buffer was killed unsent.
pub type SendSignal = oneshot::Sender<SendReport>;

/// Result of moving a persisted draft into another folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Handle of the buffer now showing the draft; the old one is gone.
    pub draft: DraftHandle,
    /// New file location.
    pub location: PathBuf,
}

/// Editor surface errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The handle does not name an open draft.
    #[error("unknown draft buffer {0}")]
    UnknownDraft(DraftHandle),

    /// The draft has never been written to disk.
    #[error("{0} has not been saved")]
    NotPersisted(DraftHandle),

    /// Any other editor failure.
    #[error("{0}")]
    Surface(String),
}

/// The mail-editing surface the engine drives.
pub trait EditorSurface: Send {
    /// Create a draft buffer from prepared material.
    ///
    /// An `Edit` draft is backed by the original's file, so
    /// [`Self::draft_location`] reports that file from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot be created.
    fn open_draft(&mut self, spec: &DraftSpec<'_>) -> Result<DraftHandle, EditorError>;

    /// Request signing and/or encryption of the draft at send time.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is unknown.
    fn apply_secure_operation(
        &mut self,
        draft: DraftHandle,
        operation: SecureOperation,
    ) -> Result<(), EditorError>;

    /// Drop any pending secure operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is unknown.
    fn clear_secure_operation(&mut self, draft: DraftHandle) -> Result<(), EditorError>;

    /// Register the signal fired once the draft has been transmitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is unknown.
    fn on_send_completion(
        &mut self,
        draft: DraftHandle,
        signal: SendSignal,
    ) -> Result<(), EditorError>;

    /// Current value of a draft header.
    fn header_value(&self, draft: DraftHandle, name: &str) -> Option<String>;

    /// Set a draft header.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is unknown.
    fn set_header(&mut self, draft: DraftHandle, name: &str, value: &str)
    -> Result<(), EditorError>;

    /// Remove a draft header.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is unknown.
    fn remove_header(&mut self, draft: DraftHandle, name: &str) -> Result<(), EditorError>;

    /// Where the draft is persisted, if it has been saved.
    fn draft_location(&self, draft: DraftHandle) -> Option<PathBuf>;

    /// Write the draft into a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is unknown or cannot be written.
    fn save_draft(&mut self, draft: DraftHandle, folder: &Path) -> Result<PathBuf, EditorError>;

    /// Move a persisted draft into another folder and swap its buffer.
    ///
    /// A registered send-completion signal moves with the draft.
    ///
    /// # Errors
    ///
    /// `NotPersisted` if the draft was never saved.
    fn relocate_draft(
        &mut self,
        draft: DraftHandle,
        folder: &Path,
    ) -> Result<Relocation, EditorError>;

    /// Close every buffer displaying this file; returns how many closed.
    fn close_buffers_showing(&mut self, path: &Path) -> usize;

    /// Close the draft buffer.
    fn close(&mut self, draft: DraftHandle);
}
