//! In-memory editor surface.
//!
//! Keeps drafts as header maps and body text. Transmission is simulated
//! with [`ScratchEditor::transmit`], which writes the filed copy into the
//! folder named by the draft's `Fcc` header.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{
    DraftHandle, DraftSpec, EditorError, EditorSurface, Relocation, SendReport, SendSignal,
};
use crate::compose::ComposeType;
use crate::message::Headers;
use crate::policy::SecureOperation;

/// A draft buffer held by [`ScratchEditor`].
#[derive(Debug, Default)]
pub struct ScratchDraft {
    /// Kind of draft.
    pub kind: Option<ComposeType>,
    /// Draft headers.
    pub headers: Headers,
    /// Draft body.
    pub body: String,
    /// Attached files.
    pub attachments: Vec<PathBuf>,
    /// Pending secure operation.
    pub secure: Option<SecureOperation>,
    /// Saved location.
    pub location: Option<PathBuf>,
    signal: Option<SendSignal>,
}

impl ScratchDraft {
    /// Returns true if a send-completion signal is registered.
    #[must_use]
    pub const fn awaiting_send(&self) -> bool {
        self.signal.is_some()
    }
}

/// Editor surface that keeps everything in memory.
#[derive(Debug, Default)]
pub struct ScratchEditor {
    drafts: BTreeMap<DraftHandle, ScratchDraft>,
    next: u64,
    written: u64,
    /// Extra buffers displaying files, e.g. a sent file opened for viewing.
    viewers: Vec<PathBuf>,
}

impl ScratchEditor {
    /// Create an editor with no buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look at a draft buffer.
    #[must_use]
    pub fn draft(&self, draft: DraftHandle) -> Option<&ScratchDraft> {
        self.drafts.get(&draft)
    }

    /// Number of open draft buffers.
    #[must_use]
    pub fn open_drafts(&self) -> usize {
        self.drafts.len()
    }

    /// Open a viewer buffer on a file.
    pub fn view(&mut self, path: impl Into<PathBuf>) {
        self.viewers.push(path.into());
    }

    /// Number of viewer buffers still open.
    #[must_use]
    pub fn viewers(&self) -> usize {
        self.viewers.len()
    }

    /// Simulate transmission: write the filed copy where `Fcc` points and
    /// fire the completion signal.
    ///
    /// Returns the path of the filed copy, if one was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is unknown.
    pub fn transmit(&mut self, draft: DraftHandle) -> Result<Option<PathBuf>, EditorError> {
        if !self.drafts.contains_key(&draft) {
            return Err(EditorError::UnknownDraft(draft));
        }
        self.written += 1;
        let serial = self.written;
        let entry = self.entry(draft)?;
        let filed_copy = entry
            .headers
            .get("fcc")
            .map(|folder| Path::new(folder).join("cur").join(format!("sent-{serial}")));
        if let Some(signal) = entry.signal.take() {
            let _ = signal.send(SendReport::now(filed_copy.clone()));
        }
        debug!(%draft, filed_copy = ?filed_copy, "Scratch draft transmitted");
        Ok(filed_copy)
    }

    /// Kill the draft buffer without sending.
    pub fn kill(&mut self, draft: DraftHandle) {
        self.drafts.remove(&draft);
    }

    fn entry(&mut self, draft: DraftHandle) -> Result<&mut ScratchDraft, EditorError> {
        self.drafts
            .get_mut(&draft)
            .ok_or(EditorError::UnknownDraft(draft))
    }

    fn allocate(&mut self) -> DraftHandle {
        self.next += 1;
        DraftHandle(self.next)
    }
}

impl EditorSurface for ScratchEditor {
    fn open_draft(&mut self, spec: &DraftSpec<'_>) -> Result<DraftHandle, EditorError> {
        let handle = self.allocate();
        let mut headers = spec.bootstrap.headers.clone();
        headers.set("From", spec.from);
        // An edited draft is the stored file itself.
        let location = spec
            .original
            .filter(|_| spec.kind == ComposeType::Edit)
            .and_then(|original| original.location.clone());
        self.drafts.insert(
            handle,
            ScratchDraft {
                kind: Some(spec.kind),
                headers,
                body: spec.bootstrap.body.clone(),
                attachments: spec.includes.to_vec(),
                location,
                ..ScratchDraft::default()
            },
        );
        Ok(handle)
    }

    fn apply_secure_operation(
        &mut self,
        draft: DraftHandle,
        operation: SecureOperation,
    ) -> Result<(), EditorError> {
        self.entry(draft)?.secure = Some(operation);
        Ok(())
    }

    fn clear_secure_operation(&mut self, draft: DraftHandle) -> Result<(), EditorError> {
        self.entry(draft)?.secure = None;
        Ok(())
    }

    fn on_send_completion(
        &mut self,
        draft: DraftHandle,
        signal: SendSignal,
    ) -> Result<(), EditorError> {
        self.entry(draft)?.signal = Some(signal);
        Ok(())
    }

    fn header_value(&self, draft: DraftHandle, name: &str) -> Option<String> {
        self.drafts
            .get(&draft)
            .and_then(|entry| entry.headers.get(name))
            .map(ToString::to_string)
    }

    fn set_header(
        &mut self,
        draft: DraftHandle,
        name: &str,
        value: &str,
    ) -> Result<(), EditorError> {
        self.entry(draft)?.headers.set(name, value);
        Ok(())
    }

    fn remove_header(&mut self, draft: DraftHandle, name: &str) -> Result<(), EditorError> {
        self.entry(draft)?.headers.remove(name);
        Ok(())
    }

    fn draft_location(&self, draft: DraftHandle) -> Option<PathBuf> {
        self.drafts.get(&draft).and_then(|entry| entry.location.clone())
    }

    fn save_draft(&mut self, draft: DraftHandle, folder: &Path) -> Result<PathBuf, EditorError> {
        let entry = self.entry(draft)?;
        let location = match &entry.location {
            Some(existing) if existing.starts_with(folder) => existing.clone(),
            _ => folder.join("cur").join(format!("draft-{}", draft.0)),
        };
        entry.location = Some(location.clone());
        Ok(location)
    }

    fn relocate_draft(
        &mut self,
        draft: DraftHandle,
        folder: &Path,
    ) -> Result<Relocation, EditorError> {
        let entry = self
            .drafts
            .remove(&draft)
            .ok_or(EditorError::UnknownDraft(draft))?;
        let Some(old) = entry.location.clone() else {
            self.drafts.insert(draft, entry);
            return Err(EditorError::NotPersisted(draft));
        };
        let name = old
            .file_name()
            .map_or_else(|| format!("draft-{}", draft.0).into(), ToOwned::to_owned);
        let location = folder.join("cur").join(name);
        let handle = self.allocate();
        self.drafts.insert(
            handle,
            ScratchDraft {
                location: Some(location.clone()),
                ..entry
            },
        );
        Ok(Relocation {
            draft: handle,
            location,
        })
    }

    fn close_buffers_showing(&mut self, path: &Path) -> usize {
        let before = self.viewers.len();
        self.viewers.retain(|viewer| viewer != path);
        before - self.viewers.len()
    }

    fn close(&mut self, draft: DraftHandle) {
        self.drafts.remove(&draft);
    }
}
