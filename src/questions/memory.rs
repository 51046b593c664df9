use async_trait::async_trait;

use super::{PoolResult, QuestionPool};
use crate::types::{Category, Language, Question};

/// Questions held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticPool {
    questions: Vec<Question>,
}

impl StaticPool {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionPool for StaticPool {
    async fn load_questions(&self, language: Language, category: Category) -> PoolResult<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.language == language && q.category == category)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}
