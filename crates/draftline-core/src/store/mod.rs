//! Message store client side.
//!
//! The store (index and storage backend) is an asynchronous
//! request/response service. The engine hands it [`StoreCommand`] values
//! and never assumes two independent commands complete in order. Each
//! fire-and-forget command returns a [`Pending`] acknowledgement the
//! caller can wait on or detach.

mod command;
pub mod memory;
mod pending;

use std::path::PathBuf;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

pub use command::{Ack, BootstrapReply, DraftBootstrap, MessageRef, StoreCommand, StoreError};
pub use memory::MemoryStore;
pub use pending::Pending;

use crate::compose::ComposeType;
use crate::message::{FlagDelta, MessageId};

/// Pending answer to a compose request.
pub type BootstrapFuture = oneshot::Receiver<Result<DraftBootstrap, StoreError>>;

/// A message store the engine can issue commands to.
pub trait MessageStore: Send + Sync {
    /// Hand a command to the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store no longer accepts commands.
    fn dispatch(&self, command: StoreCommand) -> Result<(), StoreError>;

    /// Ask the store to prepare draft material.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be dispatched.
    fn compose_request(
        &self,
        kind: ComposeType,
        decrypt: bool,
        original: Option<MessageId>,
    ) -> Result<BootstrapFuture, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(StoreCommand::ComposeRequest {
            kind,
            decrypt,
            original,
            reply,
        })?;
        Ok(rx)
    }

    /// Index a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be dispatched.
    fn add(&self, path: PathBuf) -> Result<Pending, StoreError> {
        let (ack, rx) = oneshot::channel();
        let subject = path.display().to_string();
        self.dispatch(StoreCommand::Add { path, ack })?;
        Ok(Pending::new("add", subject, rx))
    }

    /// Drop a message from the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be dispatched.
    fn remove(&self, target: MessageRef) -> Result<Pending, StoreError> {
        let (ack, rx) = oneshot::channel();
        let subject = target.to_string();
        self.dispatch(StoreCommand::Remove { target, ack })?;
        Ok(Pending::new("remove", subject, rx))
    }

    /// Move a message and/or change its flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be dispatched.
    fn move_message(
        &self,
        target: MessageRef,
        folder: Option<PathBuf>,
        flags: FlagDelta,
    ) -> Result<Pending, StoreError> {
        let (ack, rx) = oneshot::channel();
        let subject = target.to_string();
        self.dispatch(StoreCommand::Move {
            target,
            folder,
            flags,
            ack,
        })?;
        Ok(Pending::new("move", subject, rx))
    }

    /// Create a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be dispatched.
    fn mkdir(&self, path: PathBuf) -> Result<Pending, StoreError> {
        let (ack, rx) = oneshot::channel();
        let subject = path.display().to_string();
        self.dispatch(StoreCommand::Mkdir { path, ack })?;
        Ok(Pending::new("mkdir", subject, rx))
    }

    /// Record a transmitted message.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be dispatched.
    fn sent(&self, path: PathBuf) -> Result<Pending, StoreError> {
        let (ack, rx) = oneshot::channel();
        let subject = path.display().to_string();
        self.dispatch(StoreCommand::Sent { path, ack })?;
        Ok(Pending::new("sent", subject, rx))
    }
}

/// Store client that forwards commands to a backend task over a channel.
#[derive(Debug, Clone)]
pub struct ChannelStore {
    tx: mpsc::UnboundedSender<StoreCommand>,
}

impl ChannelStore {
    /// Create a client and the receiving end the backend task drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StoreCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns true once the backend has dropped its receiver.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl MessageStore for ChannelStore {
    fn dispatch(&self, command: StoreCommand) -> Result<(), StoreError> {
        debug!(command = command.name(), "Dispatching store command");
        self.tx.send(command).map_err(|_| StoreError::Unavailable)
    }
}
