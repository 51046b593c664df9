use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{GameStore, StoreResult};
use crate::state::{decode_snapshot, GameSnapshot};
use crate::types::GameState;

/// Keeps the serialized snapshot in memory, going through the same codec as
/// the file store
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw stored JSON, e.g. data written by an older version
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: RwLock::new(Some(json.into())),
        }
    }

    /// The raw JSON currently stored
    pub async fn json(&self) -> Option<String> {
        self.json.read().await.clone()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn load(&self) -> StoreResult<Option<GameState>> {
        match self.json.read().await.as_deref() {
            Some(json) => Ok(Some(decode_snapshot(json)?.state)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &GameState) -> StoreResult<()> {
        let json = serde_json::to_string(&GameSnapshot::new(state.clone()))?;
        *self.json.write().await = Some(json);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        *self.json.write().await = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
