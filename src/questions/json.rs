use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{PoolError, PoolResult, QuestionPool};
use crate::types::{Category, Language, Question, QuestionId};

/// Reads `<root>/<language>/<category>.json`
#[derive(Debug, Clone)]
pub struct JsonDirPool {
    root: PathBuf,
}

/// Entry as written in the question files
#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: QuestionId,
    question: String,
    #[serde(default)]
    options: Option<BTreeMap<String, String>>,
    answer: String,
}

impl JsonDirPool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, language: Language, category: Category) -> PathBuf {
        self.root
            .join(language.as_str())
            .join(format!("{}.json", category.as_str()))
    }
}

#[async_trait]
impl QuestionPool for JsonDirPool {
    async fn load_questions(&self, language: Language, category: Category) -> PoolResult<Vec<Question>> {
        let path = self.file_for(language, category);
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PoolError::Unavailable {
                language,
                category,
                reason: format!("{}: {}", path.display(), e),
            })?;

        let raw: Vec<RawQuestion> =
            serde_json::from_str(&json).map_err(|source| PoolError::Malformed {
                language,
                category,
                source,
            })?;

        tracing::debug!(
            "Loaded {} questions from {}",
            raw.len(),
            path.display()
        );

        Ok(raw
            .into_iter()
            .map(|q| Question {
                id: q.id,
                text: q.question,
                category,
                language,
                options: q.options.filter(|o| !o.is_empty()),
                correct_answer_key: q.answer,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "json"
    }
}
