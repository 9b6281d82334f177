//! Filed-copy bookkeeping for a single send.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::store::MessageStore;

/// One-shot hook that indexes the filed copy of a sent message.
///
/// Arming is idempotent, so a retried send does not register a second
/// hook. Once fired the hook stays spent.
#[derive(Debug, Default)]
pub struct FccHook {
    target: Option<PathBuf>,
    fired: bool,
}

impl FccHook {
    /// A hook that is neither armed nor fired.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: None,
            fired: false,
        }
    }

    /// Arm the hook for a target folder.
    ///
    /// Returns false if the hook was already armed or has fired.
    pub fn arm(&mut self, target: PathBuf) -> bool {
        if self.fired || self.target.is_some() {
            debug!(folder = %target.display(), "Fcc hook already armed");
            return false;
        }
        self.target = Some(target);
        true
    }

    /// Disarm without firing (the disposition changed to keep no copy).
    pub fn disarm(&mut self) {
        if !self.fired {
            self.target = None;
        }
    }

    /// Folder the hook is armed for.
    #[must_use]
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Returns true while armed and not yet fired.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.target.is_some() && !self.fired
    }

    /// Returns true once the hook has run.
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }

    /// Index the written copy. Runs at most once; returns whether it ran.
    pub fn fire<S: MessageStore + ?Sized>(&mut self, written: &Path, store: &S) -> bool {
        if !self.is_armed() {
            return false;
        }
        self.fired = true;
        self.target = None;
        match store.add(written.to_path_buf()) {
            Ok(pending) => pending.detach(),
            Err(e) => warn!(path = %written.display(), error = %e, "Failed to index filed copy"),
        }
        true
    }
}

/// Folders already ensured during a session.
///
/// `mkdir` is issued at most once per folder; the store treats existing
/// folders as success, so no ordering with `add` is needed.
#[derive(Debug, Default)]
pub struct FolderRegistry {
    ensured: HashSet<PathBuf>,
}

impl FolderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a folder exists. Returns true if `mkdir` was issued.
    pub fn ensure<S: MessageStore + ?Sized>(&mut self, folder: &Path, store: &S) -> bool {
        if self.ensured.contains(folder) {
            debug!(folder = %folder.display(), "Folder already ensured");
            return false;
        }
        match store.mkdir(folder.to_path_buf()) {
            Ok(pending) => {
                pending.detach();
                self.ensured.insert(folder.to_path_buf());
                true
            }
            Err(e) => {
                warn!(folder = %folder.display(), error = %e, "Failed to create folder");
                false
            }
        }
    }

    /// Returns true if the folder was ensured in this session.
    #[must_use]
    pub fn contains(&self, folder: &Path) -> bool {
        self.ensured.contains(folder)
    }
}
