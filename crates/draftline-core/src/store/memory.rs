//! In-process message store.
//!
//! Answers every command immediately, which makes it suitable for tests
//! and dry runs. Folder creation is idempotent and files may be indexed
//! before their folder exists; the folder is reconciled once `mkdir`
//! arrives.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::command::{DraftBootstrap, MessageRef, StoreCommand, StoreError};
use super::MessageStore;
use crate::compose::ComposeType;
use crate::message::{FlagDelta, Headers, Message, MessageId};

const FORWARD_MARKER: &str =
    "-------------------- Start of forwarded message --------------------";

/// Snapshot of everything the memory store holds.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    /// Messages by id.
    pub messages: BTreeMap<MessageId, Message>,
    /// Created folders.
    pub folders: BTreeSet<PathBuf>,
    /// Files indexed through `add`, in arrival order.
    pub indexed: Vec<PathBuf>,
    /// Files reported through `sent`, in arrival order.
    pub sent: Vec<PathBuf>,
    /// Every command as `"<name> <subject>"`, in arrival order.
    pub log: Vec<String>,
}

impl MemoryState {
    /// Number of logged commands with this name.
    #[must_use]
    pub fn count(&self, command: &str) -> usize {
        self.log
            .iter()
            .filter(|entry| entry.split(' ').next() == Some(command))
            .count()
    }

    /// Indexed files whose folder has not been created yet.
    #[must_use]
    pub fn unreconciled(&self) -> Vec<&Path> {
        self.indexed
            .iter()
            .map(PathBuf::as_path)
            .filter(|path| !self.folders.contains(folder_of(path)))
            .collect()
    }
}

/// Message store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a message.
    pub fn insert(&self, message: Message) {
        self.lock().messages.insert(message.id.clone(), message);
    }

    /// Look up a message.
    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<Message> {
        self.lock().messages.get(id).cloned()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> MemoryState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn compose(
        state: &MemoryState,
        kind: ComposeType,
        original: Option<&MessageId>,
    ) -> Result<DraftBootstrap, StoreError> {
        let Some(id) = original else {
            return Ok(DraftBootstrap::default());
        };
        let original = state
            .messages
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let subject = original.headers.get("subject").unwrap_or_default();
        let sender = original
            .headers
            .get("reply-to")
            .or_else(|| original.headers.get("from"))
            .unwrap_or_default();

        let mut headers = Headers::new();
        let mut body = String::new();
        match kind {
            ComposeType::New => {}
            ComposeType::Reply => {
                headers.set("To", sender);
                headers.set("Subject", prefixed("Re: ", subject));
                headers.set("In-Reply-To", id.bracketed());
                let references = original
                    .headers
                    .get("references")
                    .map_or_else(|| id.bracketed(), |r| format!("{r} {}", id.bracketed()));
                headers.set("References", references);
                body = format!("{sender} writes:\n");
            }
            ComposeType::Forward => {
                headers.set("Subject", prefixed("Fwd: ", subject));
                headers.set("References", id.bracketed());
                body = format!("{FORWARD_MARKER}\nFrom: {sender}\nSubject: {subject}\n");
            }
            ComposeType::Edit | ComposeType::Resend => {
                headers = original.headers.clone();
            }
        }

        Ok(DraftBootstrap { headers, body })
    }

    fn lookup(state: &MemoryState, target: &MessageRef) -> Option<MessageId> {
        match target {
            MessageRef::Id(id) => state.messages.contains_key(id).then(|| id.clone()),
            MessageRef::Path(path) => state
                .messages
                .values()
                .find(|message| message.location() == Some(path.as_path()))
                .map(|message| message.id.clone()),
        }
    }

    fn relocate(location: Option<&Path>, id: &MessageId, folder: &Path) -> PathBuf {
        let name = location
            .and_then(Path::file_name)
            .map_or_else(|| id.to_string().into(), ToOwned::to_owned);
        folder.join("cur").join(name)
    }
}

impl MessageStore for MemoryStore {
    fn dispatch(&self, command: StoreCommand) -> Result<(), StoreError> {
        let mut state = self.lock();
        debug!(command = command.name(), "Memory store command");

        match command {
            StoreCommand::ComposeRequest {
                kind,
                decrypt,
                original,
                reply,
            } => {
                let subject = original.as_ref().map_or_else(String::new, ToString::to_string);
                state.log.push(format!("compose {kind} decrypt={decrypt} {subject}"));
                let outcome = Self::compose(&state, kind, original.as_ref());
                let _ = reply.send(outcome);
            }
            StoreCommand::Add { path, ack } => {
                state.log.push(format!("add {}", path.display()));
                if Self::lookup(&state, &MessageRef::Path(path.clone())).is_some() {
                    debug!(path = %path.display(), "File already indexed");
                } else {
                    let id = MessageId::new(
                        path.file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                    );
                    state
                        .messages
                        .insert(id.clone(), Message::new(id).at(path.clone()));
                }
                state.indexed.push(path);
                let _ = ack.send(Ok(()));
            }
            StoreCommand::Remove { target, ack } => {
                state.log.push(format!("remove {target}"));
                let outcome = match Self::lookup(&state, &target) {
                    Some(id) => {
                        state.messages.remove(&id);
                        Ok(())
                    }
                    None => Err(StoreError::NotFound(target.to_string())),
                };
                let _ = ack.send(outcome);
            }
            StoreCommand::Move {
                target,
                folder,
                flags,
                ack,
            } => {
                state.log.push(format!("move {target} {flags}"));
                let found = Self::lookup(&state, &target);
                let message = match &found {
                    Some(id) => state.messages.get_mut(id),
                    None => None,
                };
                let outcome = match message {
                    Some(message) => {
                        apply_move(message, folder.as_deref(), &flags);
                        Ok(())
                    }
                    None => Err(StoreError::NotFound(target.to_string())),
                };
                let _ = ack.send(outcome);
            }
            StoreCommand::Mkdir { path, ack } => {
                state.log.push(format!("mkdir {}", path.display()));
                if !state.folders.insert(path) {
                    debug!("Folder already present");
                }
                let _ = ack.send(Ok(()));
            }
            StoreCommand::Sent { path, ack } => {
                state.log.push(format!("sent {}", path.display()));
                state.sent.push(path);
                let _ = ack.send(Ok(()));
            }
        }

        Ok(())
    }
}

fn apply_move(message: &mut Message, folder: Option<&Path>, flags: &FlagDelta) {
    message.flags.apply(flags);
    if let Some(folder) = folder {
        message.location = Some(MemoryStore::relocate(
            message.location.as_deref(),
            &message.id,
            folder,
        ));
    }
}

fn prefixed(prefix: &str, subject: &str) -> String {
    if subject
        .to_lowercase()
        .starts_with(&prefix.trim_end().to_lowercase())
    {
        subject.to_string()
    } else {
        format!("{prefix}{subject}")
    }
}

/// Folder a maildir file belongs to (`<folder>/cur/<file>` → `<folder>`).
fn folder_of(path: &Path) -> &Path {
    let parent = path.parent().unwrap_or(path);
    match parent.file_name().and_then(|name| name.to_str()) {
        Some("cur" | "new" | "tmp") => parent.parent().unwrap_or(parent),
        _ => parent,
    }
}
