//! Compose session state machine.
//!
//! A session lives from the compose request until the draft is sent or
//! abandoned. Everything up to `EditorOpen` can be abandoned without
//! durable effects. Once the editor reports a transmission the session
//! disposes of the message and cannot be cancelled; each disposing step is
//! best-effort and failures are only logged.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::model::{ComposeRequest, ComposeType, SessionState};
use super::operator::Operator;
use crate::config::EngineConfig;
use crate::context::{self, Context, Selection};
use crate::disposition::{self, FccHook, FolderRegistry, SendContext};
use crate::editor::{DraftHandle, DraftSpec, EditorSurface, SendReport};
use crate::message::{FlagDelta, Headers, Message, MessageId};
use crate::policy::{self, CryptoDecision};
use crate::reference::{self, ReferenceLink};
use crate::store::{DraftBootstrap, MessageRef, MessageStore, StoreError};
use crate::{Error, Result};

/// Draft headers read back from the editor when deciding at send time.
const DRAFT_HEADERS: [&str; 9] = [
    "from",
    "to",
    "cc",
    "bcc",
    "subject",
    "message-id",
    "in-reply-to",
    "references",
    "fcc",
];

#[derive(Debug, Clone)]
struct Original {
    id: MessageId,
    encrypted: bool,
    location: Option<PathBuf>,
}

impl From<&Message> for Original {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            encrypted: message.is_encrypted(),
            location: message.location.clone(),
        }
    }
}

/// Result of starting a compose.
#[derive(Debug)]
pub enum Started {
    /// The draft is open in the editor.
    Open(Box<ComposeSession>),
    /// The operator declined to pick a context.
    Aborted,
}

impl Started {
    /// The session, unless the compose was aborted.
    #[must_use]
    pub fn session(self) -> Option<ComposeSession> {
        match self {
            Self::Open(session) => Some(*session),
            Self::Aborted => None,
        }
    }
}

/// What happened once a message was sent.
#[derive(Debug, Clone, Serialize)]
pub struct SendSummary {
    /// Kind of draft.
    pub kind: ComposeType,
    /// Name of the context it was sent under.
    pub context: String,
    /// Crypto applied.
    pub crypto: CryptoDecision,
    /// Folder the copy was filed into; `None` when no copy is kept.
    pub target: Option<PathBuf>,
    /// Filed copy reported by the editor.
    pub filed_copy: Option<PathBuf>,
    /// Message the draft replied to or forwarded.
    pub reference: Option<ReferenceLink>,
    /// Other editor buffers closed because they showed the sent file.
    pub closed_buffers: usize,
    /// When the editor finished transmission.
    pub transmitted_at: DateTime<Utc>,
}

/// How a session ended.
#[derive(Debug)]
pub enum Outcome {
    /// Sent and disposed.
    Sent(Box<SendSummary>),
    /// Abandoned without sending.
    Discarded,
}

/// A draft being composed.
#[derive(Debug)]
pub struct ComposeSession {
    kind: ComposeType,
    original: Option<Original>,
    context_index: usize,
    context: Context,
    crypto: CryptoDecision,
    draft: DraftHandle,
    state: SessionState,
    completion: oneshot::Receiver<SendReport>,
    /// Filing target, resolved at the first send.
    disposition: Option<Option<PathBuf>>,
    hook: FccHook,
    folders: FolderRegistry,
}

impl ComposeSession {
    /// Validate the request, pick a context, and open the draft.
    ///
    /// `active` is the index of the context currently in use, if any.
    ///
    /// # Errors
    ///
    /// `InvalidState` or `MissingSource` for a bad request (before any
    /// session exists), `Config` when no context can be chosen, and store or
    /// editor errors while the draft is prepared.
    pub async fn start<E, S, O>(
        request: ComposeRequest,
        config: &EngineConfig,
        active: Option<usize>,
        editor: &mut E,
        store: &S,
        operator: &mut O,
    ) -> Result<Started>
    where
        E: EditorSurface + ?Sized,
        S: MessageStore + ?Sized,
        O: Operator + ?Sized,
    {
        let kind = request.kind;
        debug!(%kind, state = ?SessionState::Initiating, "Compose requested");
        request.validate()?;

        debug!(%kind, state = ?SessionState::ContextResolving, "Resolving context");
        let Some(context_index) =
            resolve_context(config, request.original.as_ref(), active, operator)?
        else {
            info!(%kind, "Compose aborted by operator");
            return Ok(Started::Aborted);
        };
        let context = config
            .contexts
            .get(context_index)
            .cloned()
            .ok_or_else(|| Error::config(format!("no context at index {context_index}")))?;

        let original = request.original.as_ref().map(Original::from);
        let encrypted = original.as_ref().is_some_and(|o| o.encrypted);
        let crypto = policy::resolve(kind, encrypted, &config.policy);

        let bootstrap = match &original {
            Some(original) => fetch_bootstrap(kind, original, store).await?,
            None => DraftBootstrap::default(),
        };

        let draft = editor.open_draft(&DraftSpec {
            kind,
            original: request.original.as_ref(),
            bootstrap: &bootstrap,
            from: &context.identity,
            includes: &request.includes,
        })?;
        let completion = match prepare_draft(editor, draft, crypto) {
            Ok(completion) => completion,
            Err(e) => {
                editor.close(draft);
                return Err(e);
            }
        };

        info!(
            %kind,
            context = %context.name,
            sign = crypto.sign,
            encrypt = crypto.encrypt,
            %draft,
            "Compose session open"
        );

        Ok(Started::Open(Box::new(Self {
            kind,
            original,
            context_index,
            context,
            crypto,
            draft,
            state: SessionState::EditorOpen,
            completion,
            disposition: None,
            hook: FccHook::new(),
            folders: FolderRegistry::new(),
        })))
    }

    /// Kind of draft.
    #[must_use]
    pub const fn kind(&self) -> ComposeType {
        self.kind
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Current crypto decision.
    #[must_use]
    pub const fn crypto(&self) -> CryptoDecision {
        self.crypto
    }

    /// Context the draft is composed under.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Index of that context in the configuration.
    #[must_use]
    pub const fn context_index(&self) -> usize {
        self.context_index
    }

    /// Editor buffer holding the draft.
    #[must_use]
    pub const fn draft(&self) -> DraftHandle {
        self.draft
    }

    /// Id of the original message, if any.
    #[must_use]
    pub fn original_id(&self) -> Option<&MessageId> {
        self.original.as_ref().map(|o| &o.id)
    }

    /// Returns true while a filed copy is expected from the editor.
    #[must_use]
    pub const fn expects_filed_copy(&self) -> bool {
        self.hook.is_armed()
    }

    /// Move the draft to another context.
    ///
    /// From is re-derived. A draft already saved is moved into the new
    /// context's draft folder, and its buffer handle changes.
    ///
    /// # Errors
    ///
    /// `InvalidState` outside `EditorOpen`, `Config` for an unknown context
    /// or a missing draft folder, editor errors from the relocation.
    pub fn switch_context<E, S>(
        &mut self,
        index: usize,
        config: &EngineConfig,
        editor: &mut E,
        store: &S,
    ) -> Result<()>
    where
        E: EditorSurface + ?Sized,
        S: MessageStore + ?Sized,
    {
        self.require(&[SessionState::EditorOpen], "switch context")?;
        let context = config
            .contexts
            .get(index)
            .cloned()
            .ok_or_else(|| Error::config(format!("no context at index {index}")))?;
        if index == self.context_index {
            debug!(context = %context.name, "Context unchanged");
            return Ok(());
        }

        if let Some(old) = editor.draft_location(self.draft) {
            if context.draft_folder.as_os_str().is_empty() {
                return Err(Error::config(format!(
                    "context '{}' has no draft folder configured",
                    context.name
                )));
            }
            let relocation = editor.relocate_draft(self.draft, &context.draft_folder)?;
            self.folders.ensure(&context.draft_folder, store);
            match store.move_message(
                MessageRef::Path(old.clone()),
                Some(context.draft_folder.clone()),
                FlagDelta::none(),
            ) {
                Ok(pending) => pending.tolerate_missing().detach(),
                Err(e) => warn!(path = %old.display(), error = %e, "Failed to move draft in index"),
            }
            debug!(
                from = %old.display(),
                to = %relocation.location.display(),
                "Draft relocated"
            );
            self.draft = relocation.draft;
        }
        editor.set_header(self.draft, "From", &context.identity)?;

        info!(from = %self.context.name, to = %context.name, "Switched context");
        self.context = context;
        self.context_index = index;
        Ok(())
    }

    /// Replace the crypto decision before the message goes out.
    ///
    /// # Errors
    ///
    /// `InvalidState` once disposing has started; editor errors.
    pub fn reconfigure_crypto<E>(&mut self, decision: CryptoDecision, editor: &mut E) -> Result<()>
    where
        E: EditorSurface + ?Sized,
    {
        self.require(
            &[SessionState::EditorOpen, SessionState::Sending],
            "reconfigure crypto",
        )?;
        if decision == self.crypto {
            return Ok(());
        }
        match decision.operation() {
            Some(operation) => editor.apply_secure_operation(self.draft, operation)?,
            None => editor.clear_secure_operation(self.draft)?,
        }
        info!(
            sign = decision.sign,
            encrypt = decision.encrypt,
            "Crypto decision reconfigured"
        );
        self.crypto = decision;
        Ok(())
    }

    /// Save the draft into the context's draft folder and index it.
    ///
    /// # Errors
    ///
    /// `InvalidState` outside `EditorOpen`, `Config` without a draft
    /// folder, editor errors while writing.
    pub fn save_draft<E, S>(&mut self, editor: &mut E, store: &S) -> Result<PathBuf>
    where
        E: EditorSurface + ?Sized,
        S: MessageStore + ?Sized,
    {
        self.require(&[SessionState::EditorOpen], "save draft")?;
        let folder = &self.context.draft_folder;
        if folder.as_os_str().is_empty() {
            return Err(Error::config(format!(
                "context '{}' has no draft folder configured",
                self.context.name
            )));
        }
        let path = editor.save_draft(self.draft, folder)?;
        self.folders.ensure(folder, store);
        match store.add(path.clone()) {
            Ok(pending) => pending.detach(),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to index saved draft"),
        }
        debug!(path = %path.display(), "Draft saved");
        Ok(path)
    }

    /// Prepare the draft for transmission. Safe to call again on retry.
    ///
    /// Resolves where the sent copy goes, points the draft's `Fcc` at it,
    /// makes sure the folder exists, and arms the filed-copy hook.
    ///
    /// # Errors
    ///
    /// `InvalidState` outside `EditorOpen`/`Sending`, `Config` when the sent
    /// behavior cannot be resolved (the session stays as it was), editor
    /// errors.
    pub fn send<E, S>(
        &mut self,
        config: &EngineConfig,
        editor: &mut E,
        store: &S,
    ) -> Result<Option<PathBuf>>
    where
        E: EditorSurface + ?Sized,
        S: MessageStore + ?Sized,
    {
        self.require(&[SessionState::EditorOpen, SessionState::Sending], "send")?;
        let target = if let Some(target) = &self.disposition {
            debug!("Send retried");
            target.clone()
        } else {
            let target = self.resolve_disposition(config, editor)?;
            self.disposition = Some(target.clone());
            target
        };
        self.transition(SessionState::Sending);

        match &target {
            Some(folder) => {
                editor.set_header(self.draft, "Fcc", &folder.to_string_lossy())?;
                self.prepare_filing(folder, store);
            }
            None => {
                editor.remove_header(self.draft, "Fcc")?;
                self.hook.disarm();
            }
        }
        Ok(target)
    }

    /// Abandon the draft before it is sent.
    ///
    /// # Errors
    ///
    /// `InvalidState` outside `EditorOpen`; once `send` has run the
    /// message can only end through [`Self::finish`].
    pub fn discard<E>(&mut self, editor: &mut E) -> Result<()>
    where
        E: EditorSurface + ?Sized,
    {
        self.require(&[SessionState::EditorOpen], "discard")?;
        editor.close(self.draft);
        self.transition(SessionState::Discarded);
        info!(kind = %self.kind, "Draft discarded");
        Ok(())
    }

    /// Wait for the editor to report transmission, then dispose.
    ///
    /// The editor dropping its completion signal means the buffer was
    /// closed unsent.
    pub async fn finish<E, S>(mut self, config: &EngineConfig, editor: &mut E, store: &S) -> Outcome
    where
        E: EditorSurface + ?Sized,
        S: MessageStore + ?Sized,
    {
        let signal = (&mut self.completion).await;
        match signal {
            Ok(report) => Outcome::Sent(Box::new(self.complete(report, config, editor, store))),
            Err(_) => {
                self.transition(SessionState::Discarded);
                info!(kind = %self.kind, "Draft closed without sending");
                Outcome::Discarded
            }
        }
    }

    /// Dispose of a transmitted message.
    ///
    /// Files the copy, flags the referenced message, drops the draft from
    /// the index, and closes buffers still showing it. Never fails.
    pub fn complete<E, S>(
        mut self,
        report: SendReport,
        config: &EngineConfig,
        editor: &mut E,
        store: &S,
    ) -> SendSummary
    where
        E: EditorSurface + ?Sized,
        S: MessageStore + ?Sized,
    {
        self.transition(SessionState::Disposing);

        let target = match self.disposition.take() {
            Some(target) => target,
            None => match self.resolve_disposition(config, editor) {
                Ok(target) => {
                    if let Some(folder) = &target {
                        self.prepare_filing(folder, store);
                    }
                    target
                }
                Err(e) => {
                    warn!(error = %e, "Sent-message disposition failed; no copy is filed");
                    None
                }
            },
        };

        match &report.filed_copy {
            Some(path) => {
                if !self.hook.fire(path, store) {
                    debug!(path = %path.display(), "Filed copy not indexed; no target armed");
                }
                match store.sent(path.clone()) {
                    Ok(pending) => pending.detach(),
                    Err(e) => warn!(path = %path.display(), error = %e, "Failed to record sent message"),
                }
            }
            None if self.hook.is_armed() => {
                warn!(folder = ?target, "Editor reported no filed copy");
            }
            None => {}
        }

        let headers = self.draft_headers(editor);
        let reference = reference::infer(&headers);
        match &reference {
            Some(link) => link.propagate(store),
            None => debug!("Sent draft references no earlier message"),
        }

        let draft_file = editor.draft_location(self.draft).or_else(|| {
            self.original
                .as_ref()
                .filter(|_| self.kind == ComposeType::Edit)
                .and_then(|original| original.location.clone())
        });
        let closed_buffers = match &draft_file {
            Some(path) => {
                match store.remove(MessageRef::Path(path.clone())) {
                    Ok(pending) => pending.tolerate_missing().detach(),
                    Err(e) => warn!(path = %path.display(), error = %e, "Failed to drop sent draft"),
                }
                editor.close_buffers_showing(path)
            }
            None => {
                debug!("Draft was never saved");
                0
            }
        };
        editor.close(self.draft);

        self.transition(SessionState::Closed);
        info!(
            kind = %self.kind,
            context = %self.context.name,
            filed = ?report.filed_copy,
            "Message sent"
        );

        SendSummary {
            kind: self.kind,
            context: self.context.name.clone(),
            crypto: self.crypto,
            target,
            filed_copy: report.filed_copy,
            reference,
            closed_buffers,
            transmitted_at: report.transmitted_at,
        }
    }

    fn prepare_filing<S: MessageStore + ?Sized>(&mut self, folder: &Path, store: &S) {
        self.folders.ensure(folder, store);
        self.hook.arm(folder.to_path_buf());
    }

    fn resolve_disposition<E>(&self, config: &EngineConfig, editor: &E) -> Result<Option<PathBuf>>
    where
        E: EditorSurface + ?Sized,
    {
        let headers = self.draft_headers(editor);
        let send = SendContext {
            from: headers.get("from"),
            context: &self.context,
            headers: &headers,
        };
        disposition::resolve(&config.sent_behavior, &send)
    }

    fn draft_headers<E: EditorSurface + ?Sized>(&self, editor: &E) -> Headers {
        let mut headers = Headers::new();
        for name in DRAFT_HEADERS {
            if let Some(value) = editor.header_value(self.draft, name) {
                headers.set(name, value);
            }
        }
        headers
    }

    fn require(&self, allowed: &[SessionState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::invalid_state(format!(
                "cannot {operation} while the session is {:?}",
                self.state
            )))
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(draft = %self.draft, from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }
}

fn resolve_context<O: Operator + ?Sized>(
    config: &EngineConfig,
    original: Option<&Message>,
    active: Option<usize>,
    operator: &mut O,
) -> Result<Option<usize>> {
    let contexts = &config.contexts;
    let index = match context::select(config.context_policy, contexts, original, active)? {
        Selection::Selected(index) => index,
        Selection::Prompt => {
            let preselected = active.filter(|&i| i < contexts.len());
            match operator.choose_context(contexts, preselected) {
                Some(index) => index,
                None => return Ok(None),
            }
        }
        Selection::Unchanged => active.ok_or_else(|| {
            Error::config("no context matches, none is active, and the policy forbids asking")
        })?,
    };
    match contexts.get(index) {
        Some(context) => {
            debug!(context = %context.name, "Context selected");
            Ok(Some(index))
        }
        None => Err(Error::config(format!(
            "context index {index} out of range ({} configured)",
            contexts.len()
        ))),
    }
}

async fn fetch_bootstrap<S: MessageStore + ?Sized>(
    kind: ComposeType,
    original: &Original,
    store: &S,
) -> Result<DraftBootstrap> {
    let reply = store.compose_request(kind, original.encrypted, Some(original.id.clone()))?;
    match reply.await {
        Ok(Ok(bootstrap)) => Ok(bootstrap),
        Ok(Err(StoreError::NotFound(_))) => Err(Error::MissingSource(kind)),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StoreError::Unavailable.into()),
    }
}

fn prepare_draft<E: EditorSurface + ?Sized>(
    editor: &mut E,
    draft: DraftHandle,
    crypto: CryptoDecision,
) -> Result<oneshot::Receiver<SendReport>> {
    if let Some(operation) = crypto.operation() {
        editor.apply_secure_operation(draft, operation)?;
    }
    let (signal, completion) = oneshot::channel();
    editor.on_send_completion(draft, signal)?;
    Ok(completion)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compose::Unattended;
    use crate::context::ContextPolicy;
    use crate::disposition::SentBehavior;
    use crate::editor::ScratchEditor;
    use crate::message::Flag;
    use crate::policy::SecureOperation;
    use crate::store::MemoryStore;

    fn config() -> EngineConfig {
        EngineConfig::default()
            .with_context(Context::under_root("home", "me@home.example", "/mail/home"))
            .with_context(Context::under_root("work", "me@work.example", "/mail/work"))
            .with_context_policy(ContextPolicy::PickFirst)
    }

    async fn open_new(
        config: &EngineConfig,
        editor: &mut ScratchEditor,
        store: &MemoryStore,
    ) -> ComposeSession {
        ComposeSession::start(
            ComposeRequest::new_message(),
            config,
            None,
            editor,
            store,
            &mut Unattended,
        )
        .await
        .unwrap()
        .session()
        .unwrap()
    }

    mod start {
        use super::*;

        #[tokio::test]
        async fn new_message_skips_store() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let session = open_new(&config(), &mut editor, &store).await;
            assert_eq!(session.state(), SessionState::EditorOpen);
            assert_eq!(session.context().name, "home");
            assert_eq!(session.crypto(), CryptoDecision::PLAIN);
            assert!(store.snapshot().log.is_empty());
        }

        #[tokio::test]
        async fn invalid_request_rejected_before_anything_happens() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let request = ComposeRequest::on(ComposeType::Edit, Message::new("m1@h"));
            let result = ComposeSession::start(
                request,
                &config(),
                None,
                &mut editor,
                &store,
                &mut Unattended,
            )
            .await;
            assert!(matches!(result, Err(Error::InvalidState(_))));
            assert_eq!(editor.open_drafts(), 0);
            assert!(store.snapshot().log.is_empty());
        }

        #[tokio::test]
        async fn unknown_original_is_missing_source() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let request = ComposeRequest::on(ComposeType::Forward, Message::new("gone@h"));
            let result = ComposeSession::start(
                request,
                &config(),
                None,
                &mut editor,
                &store,
                &mut Unattended,
            )
            .await;
            assert!(matches!(
                result,
                Err(Error::MissingSource(ComposeType::Forward))
            ));
            assert_eq!(editor.open_drafts(), 0);
        }

        #[tokio::test]
        async fn operator_abort() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config().with_context_policy(ContextPolicy::AlwaysAsk);
            let started = ComposeSession::start(
                ComposeRequest::new_message(),
                &config,
                None,
                &mut editor,
                &store,
                &mut Unattended,
            )
            .await
            .unwrap();
            assert!(matches!(started, Started::Aborted));
            assert_eq!(editor.open_drafts(), 0);
        }

        #[tokio::test]
        async fn operator_choice() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config().with_context_policy(ContextPolicy::Ask);
            let mut operator = |_: &[Context], _: Option<usize>| Some(1);
            let session = ComposeSession::start(
                ComposeRequest::new_message(),
                &config,
                None,
                &mut editor,
                &store,
                &mut operator,
            )
            .await
            .unwrap()
            .session()
            .unwrap();
            assert_eq!(session.context().name, "work");
            assert_eq!(
                editor.header_value(session.draft(), "from").as_deref(),
                Some("me@work.example")
            );
        }

        #[tokio::test]
        async fn unchanged_without_active_context() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config().with_context_policy(ContextPolicy::None);
            let result = ComposeSession::start(
                ComposeRequest::new_message(),
                &config,
                None,
                &mut editor,
                &store,
                &mut Unattended,
            )
            .await;
            assert!(matches!(result, Err(Error::Config(_))));

            let session = ComposeSession::start(
                ComposeRequest::new_message(),
                &config,
                Some(1),
                &mut editor,
                &store,
                &mut Unattended,
            )
            .await
            .unwrap()
            .session()
            .unwrap();
            assert_eq!(session.context_index(), 1);
        }

        #[tokio::test]
        async fn encrypted_original_is_decrypted() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let original = Message::new("m1@h").with_flag(Flag::Encrypted);
            store.insert(original.clone());
            let session = ComposeSession::start(
                ComposeRequest::on(ComposeType::Reply, original),
                &config(),
                None,
                &mut editor,
                &store,
                &mut Unattended,
            )
            .await
            .unwrap()
            .session()
            .unwrap();
            assert_eq!(session.crypto(), CryptoDecision::new(true, true));
            assert_eq!(
                editor.draft(session.draft()).unwrap().secure,
                Some(SecureOperation::SignAndEncrypt)
            );
            assert_eq!(store.snapshot().log, vec!["compose reply decrypt=true m1@h"]);
        }
    }

    mod editing {
        use super::*;

        #[tokio::test]
        async fn switch_relocates_saved_draft() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_new(&config, &mut editor, &store).await;
            let saved = session.save_draft(&mut editor, &store).unwrap();
            assert!(saved.starts_with("/mail/home/Drafts"));
            let old_handle = session.draft();

            session.switch_context(1, &config, &mut editor, &store).unwrap();
            assert_ne!(session.draft(), old_handle);
            assert!(editor.draft(old_handle).is_none());
            assert_eq!(
                editor.header_value(session.draft(), "from").as_deref(),
                Some("me@work.example")
            );
            let moved = editor.draft_location(session.draft()).unwrap();
            assert!(moved.starts_with("/mail/work/Drafts"));
            assert_eq!(
                store.message(&MessageId::new("draft-1")).unwrap().location(),
                Some(moved.as_path())
            );
        }

        async fn open_edit(
            config: &EngineConfig,
            editor: &mut ScratchEditor,
            store: &MemoryStore,
        ) -> ComposeSession {
            let draft = Message::new("d1@h")
                .with_flag(Flag::Draft)
                .with_header("Subject", "Unfinished")
                .at("/mail/home/Drafts/cur/d1");
            store.insert(draft.clone());
            ComposeSession::start(
                ComposeRequest::on(ComposeType::Edit, draft),
                config,
                None,
                editor,
                store,
                &mut Unattended,
            )
            .await
            .unwrap()
            .session()
            .unwrap()
        }

        #[tokio::test]
        async fn switch_moves_edited_draft_file() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_edit(&config, &mut editor, &store).await;

            session.switch_context(1, &config, &mut editor, &store).unwrap();
            let moved = PathBuf::from("/mail/work/Drafts/cur/d1");
            assert_eq!(editor.draft_location(session.draft()), Some(moved.clone()));
            assert_eq!(
                store.message(&MessageId::new("d1@h")).unwrap().location(),
                Some(moved.as_path())
            );
            let state = store.snapshot();
            assert_eq!(state.count("move"), 1);
            assert!(state.folders.contains(Path::new("/mail/work/Drafts")));
        }

        #[tokio::test]
        async fn saved_edit_leaves_no_stale_draft_after_send() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_edit(&config, &mut editor, &store).await;

            let saved = session.save_draft(&mut editor, &store).unwrap();
            assert_eq!(saved, PathBuf::from("/mail/home/Drafts/cur/d1"));
            assert_eq!(store.snapshot().messages.len(), 1);

            session.send(&config, &mut editor, &store).unwrap();
            editor.transmit(session.draft()).unwrap();
            let outcome = session.finish(&config, &mut editor, &store).await;
            assert!(matches!(outcome, Outcome::Sent(_)));

            let state = store.snapshot();
            assert!(state.messages.values().all(|m| m.location() != Some(saved.as_path())));
            assert!(state.log.contains(&"remove /mail/home/Drafts/cur/d1".to_string()));
        }

        #[tokio::test]
        async fn switch_unsaved_draft_only_changes_from() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_new(&config, &mut editor, &store).await;
            let handle = session.draft();
            session.switch_context(1, &config, &mut editor, &store).unwrap();
            assert_eq!(session.draft(), handle);
            assert_eq!(store.snapshot().count("move"), 0);
        }

        #[tokio::test]
        async fn switch_to_unknown_context() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_new(&config, &mut editor, &store).await;
            assert!(matches!(
                session.switch_context(7, &config, &mut editor, &store),
                Err(Error::Config(_))
            ));
        }

        #[tokio::test]
        async fn reconfigure_crypto_clears_operation() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let mut session = open_new(&config(), &mut editor, &store).await;
            session
                .reconfigure_crypto(CryptoDecision::new(true, false), &mut editor)
                .unwrap();
            assert_eq!(
                editor.draft(session.draft()).unwrap().secure,
                Some(SecureOperation::Sign)
            );
            session
                .reconfigure_crypto(CryptoDecision::PLAIN, &mut editor)
                .unwrap();
            assert_eq!(editor.draft(session.draft()).unwrap().secure, None);
        }
    }

    mod sending {
        use super::*;

        #[tokio::test]
        async fn retried_send_arms_once() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_new(&config, &mut editor, &store).await;

            let first = session.send(&config, &mut editor, &store).unwrap();
            let second = session.send(&config, &mut editor, &store).unwrap();
            assert_eq!(first, Some(PathBuf::from("/mail/home/Sent")));
            assert_eq!(first, second);
            assert_eq!(session.state(), SessionState::Sending);
            assert!(session.expects_filed_copy());
            assert_eq!(store.snapshot().count("mkdir"), 1);
            assert_eq!(
                editor.header_value(session.draft(), "fcc").as_deref(),
                Some("/mail/home/Sent")
            );

            assert!(matches!(
                session.switch_context(1, &config, &mut editor, &store),
                Err(Error::InvalidState(_))
            ));
        }

        #[tokio::test]
        async fn delete_behavior_keeps_no_copy() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config().with_sent_behavior(SentBehavior::Delete);
            let mut session = open_new(&config, &mut editor, &store).await;

            assert_eq!(session.send(&config, &mut editor, &store).unwrap(), None);
            assert!(!session.expects_filed_copy());
            editor.transmit(session.draft()).unwrap();
            let Outcome::Sent(summary) = session.finish(&config, &mut editor, &store).await else {
                panic!("expected a send");
            };
            assert_eq!(summary.target, None);
            assert_eq!(summary.filed_copy, None);
            let state = store.snapshot();
            assert_eq!(state.count("mkdir"), 0);
            assert_eq!(state.count("add"), 0);
        }

        #[tokio::test]
        async fn unresolvable_behavior_leaves_session_open() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let mut config = config().with_sent_behavior(SentBehavior::Trash);
            config.contexts[0].trash_folder = PathBuf::new();
            let mut session = open_new(&config, &mut editor, &store).await;

            assert!(matches!(
                session.send(&config, &mut editor, &store),
                Err(Error::Config(_))
            ));
            assert_eq!(session.state(), SessionState::EditorOpen);
        }

        #[tokio::test]
        async fn complete_without_send_resolves_lazily() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let session = open_new(&config, &mut editor, &store).await;

            let report = SendReport::now(Some(PathBuf::from("/mail/home/Sent/cur/x")));
            let summary = session.complete(report, &config, &mut editor, &store);
            assert_eq!(summary.target, Some(PathBuf::from("/mail/home/Sent")));
            let state = store.snapshot();
            assert_eq!(state.count("mkdir"), 1);
            assert_eq!(state.count("add"), 1);
            assert_eq!(state.count("sent"), 1);
            assert_eq!(editor.open_drafts(), 0);
        }

        #[tokio::test]
        async fn killed_buffer_discards() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_new(&config, &mut editor, &store).await;
            session.send(&config, &mut editor, &store).unwrap();
            editor.kill(session.draft());

            let outcome = session.finish(&config, &mut editor, &store).await;
            assert!(matches!(outcome, Outcome::Discarded));
            assert_eq!(store.snapshot().count("add"), 0);
        }

        #[tokio::test]
        async fn discard_closes_buffer() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let mut session = open_new(&config(), &mut editor, &store).await;
            session.discard(&mut editor).unwrap();
            assert_eq!(session.state(), SessionState::Discarded);
            assert_eq!(editor.open_drafts(), 0);
            assert!(store.snapshot().log.is_empty());

            assert!(matches!(
                session.send(&config(), &mut editor, &store),
                Err(Error::InvalidState(_))
            ));
        }

        #[tokio::test]
        async fn discard_refused_once_sending() {
            let (mut editor, store) = (ScratchEditor::new(), MemoryStore::new());
            let config = config();
            let mut session = open_new(&config, &mut editor, &store).await;
            session.send(&config, &mut editor, &store).unwrap();

            assert!(matches!(
                session.discard(&mut editor),
                Err(Error::InvalidState(_))
            ));
            assert_eq!(session.state(), SessionState::Sending);
            assert!(editor.draft(session.draft()).is_some());

            editor.transmit(session.draft()).unwrap();
            let outcome = session.finish(&config, &mut editor, &store).await;
            assert!(matches!(outcome, Outcome::Sent(_)));
            assert_eq!(store.snapshot().count("add"), 1);
        }
    }
}
