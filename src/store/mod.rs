//! Durable storage for the game state.
//!
//! Stores are best-effort: the controller logs failures and keeps playing
//! in memory. Writes are funneled through [`StoreWriter`] so they never block
//! a transition and always land in dispatch order.

mod file;
mod memory;
mod writer;

use async_trait::async_trait;

use crate::types::GameState;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use writer::StoreWriter;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while loading, saving or clearing state
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u64, supported: u32 },

    #[error("stored state is invalid: {0}")]
    Invalid(String),
}

/// Trait that all state stores must implement
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Load the last saved state, `None` if nothing was saved
    async fn load(&self) -> StoreResult<Option<GameState>>;

    async fn save(&self, state: &GameState) -> StoreResult<()>;

    /// Forget the saved state; clearing an empty store succeeds
    async fn clear(&self) -> StoreResult<()>;

    /// Get the name of this store
    fn name(&self) -> &str;
}
