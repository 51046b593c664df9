use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::GameStore;
use crate::types::GameState;

enum StoreCommand {
    Save(Box<GameState>),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Handle to the background task that owns all writes to a store.
///
/// Commands are queued without waiting and applied one at a time in the order
/// they were sent. A failed write is logged and the queue moves on.
#[derive(Clone)]
pub struct StoreWriter {
    tx: mpsc::UnboundedSender<StoreCommand>,
}

impl StoreWriter {
    /// Spawn the writer task; must be called from within a tokio runtime
    pub fn spawn(store: Arc<dyn GameStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, rx));
        Self { tx }
    }

    pub fn save(&self, state: GameState) {
        self.send(StoreCommand::Save(Box::new(state)));
    }

    pub fn clear(&self) {
        self.send(StoreCommand::Clear);
    }

    /// Wait until everything queued so far has been written
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(StoreCommand::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    fn send(&self, command: StoreCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Store writer has stopped, game state is no longer persisted");
        }
    }
}

async fn run_writer(store: Arc<dyn GameStore>, mut rx: mpsc::UnboundedReceiver<StoreCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            StoreCommand::Save(state) => {
                if let Err(e) = store.save(&state).await {
                    tracing::warn!("Failed to save game state to {} store: {}", store.name(), e);
                }
            }
            StoreCommand::Clear => {
                if let Err(e) = store.clear().await {
                    tracing::warn!("Failed to clear {} store: {}", store.name(), e);
                }
            }
            StoreCommand::Flush(ack) => {
                // Receiver may have given up waiting
                let _ = ack.send(());
            }
        }
    }
}
