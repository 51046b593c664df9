//! Persisted snapshot format.
//!
//! Every save wraps the game state in a versioned envelope. Loading also
//! accepts the bare, unversioned state object the browser front end used to
//! keep in local storage and migrates it forward.

use crate::store::{StoreError, StoreResult};
use crate::types::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema version for snapshot compatibility
/// Version 1: bare state object, groups carry full answered questions, badges may repeat
/// Version 2: versioned envelope, answered question ids, badge set
pub const SCHEMA_VERSION: u32 = 2;
pub const LEGACY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub schema_version: u32,
    /// Save timestamp (RFC 3339); absent for migrated legacy data
    #[serde(default)]
    pub saved_at: Option<String>,
    pub state: GameState,
}

impl GameSnapshot {
    pub fn new(state: GameState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
            state,
        }
    }

    /// Validate the snapshot before it replaces the live state
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(format!(
                "Snapshot schema version {} is newer than supported version {}",
                self.schema_version, SCHEMA_VERSION
            ));
        }

        let state = &self.state;
        if !state.groups.is_empty() && state.current_group_index >= state.groups.len() {
            return Err(format!(
                "Current group index {} is out of range for {} groups",
                state.current_group_index,
                state.groups.len()
            ));
        }

        if state.is_game_started && state.groups.is_empty() {
            return Err("Game is marked as started but has no groups".to_string());
        }

        if let Some(ref winner) = state.winner {
            if !winner.has_all_badges() {
                return Err(format!(
                    "Winner '{}' holds only {} of {} badges",
                    winner.name,
                    winner.badges.len(),
                    CATEGORY_COUNT
                ));
            }
        }

        Ok(())
    }
}

/// Parse stored JSON, migrating legacy data, and validate the result
pub fn decode_snapshot(json: &str) -> StoreResult<GameSnapshot> {
    let value: Value = serde_json::from_str(json)?;

    let snapshot = match value.get("schemaVersion").and_then(Value::as_u64) {
        Some(found) if found > u64::from(SCHEMA_VERSION) => {
            return Err(StoreError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            });
        }
        Some(_) => serde_json::from_value::<GameSnapshot>(value)?,
        None => {
            tracing::info!(
                "Migrating schema {} game state to schema {}",
                LEGACY_SCHEMA_VERSION,
                SCHEMA_VERSION
            );
            GameSnapshot {
                schema_version: SCHEMA_VERSION,
                saved_at: None,
                state: serde_json::from_value(migrate_legacy_state(value))?,
            }
        }
    };

    snapshot.validate().map_err(StoreError::Invalid)?;
    Ok(snapshot)
}

fn migrate_legacy_state(mut value: Value) -> Value {
    if let Some(state) = value.as_object_mut() {
        if let Some(Value::Array(groups)) = state.get_mut("groups") {
            groups
                .iter_mut()
                .filter_map(Value::as_object_mut)
                .for_each(migrate_legacy_group);
        }
        if let Some(Value::Object(winner)) = state.get_mut("winner") {
            migrate_legacy_group(winner);
        }

        // Questions swapped in by a joker were stored as raw file entries
        // without category or language
        let category = state.get("selectedCategory").filter(|v| v.is_string()).cloned();
        let language = state
            .get("language")
            .filter(|v| v.is_string())
            .cloned()
            .unwrap_or_else(|| Value::String(Language::default().as_str().to_string()));

        if let Some(Value::Object(question)) = state.get_mut("currentQuestion") {
            migrate_legacy_question(question, category, language);
        }
        // A question whose category cannot be recovered is dropped, the game itself survives
        if state
            .get("currentQuestion")
            .is_some_and(|q| q.is_object() && q.get("category").is_none())
        {
            tracing::warn!("Dropping legacy question without a category");
            state.insert("currentQuestion".to_string(), Value::Null);
        }
    }
    value
}

fn migrate_legacy_group(group: &mut Map<String, Value>) {
    // Replaced by correctAnswers and the turn order
    group.remove("score");
    group.remove("position");

    if let Some(Value::Array(answered)) = group.remove("answeredQuestions") {
        let ids = answered
            .into_iter()
            .filter_map(|q| q.get("id").cloned())
            .collect();
        group
            .entry("answeredQuestionIds")
            .or_insert(Value::Array(ids));
    }
}

fn migrate_legacy_question(
    question: &mut Map<String, Value>,
    category: Option<Value>,
    language: Value,
) {
    if let Some(category) = category {
        question.entry("category").or_insert(category);
    }
    question.entry("language").or_insert(language);
    if let Some(text) = question.remove("question") {
        question.entry("text").or_insert(text);
    }
    if let Some(answer) = question.remove("answer") {
        question.entry("correctAnswerKey").or_insert(answer);
    }
    question.remove("type");
    if question.get("options").is_some_and(Value::is_null) {
        question.remove("options");
    }
}
