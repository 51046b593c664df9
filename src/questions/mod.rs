mod json;
mod memory;
mod selector;

use async_trait::async_trait;

use crate::types::{Category, Language, Question};

pub use json::JsonDirPool;
pub use memory::StaticPool;
pub use selector::{excluded_ids, select_question};

/// Result type for question pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while loading questions
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("no question data for {language}/{category}: {reason}")]
    Unavailable {
        language: Language,
        category: Category,
        reason: String,
    },

    #[error("question data for {language}/{category} is malformed: {source}")]
    Malformed {
        language: Language,
        category: Category,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of questions for one language and category
#[async_trait]
pub trait QuestionPool: Send + Sync {
    /// Load every question of the pool; an empty pool is not an error
    async fn load_questions(&self, language: Language, category: Category) -> PoolResult<Vec<Question>>;

    /// Get the name of this pool
    fn name(&self) -> &str;
}
