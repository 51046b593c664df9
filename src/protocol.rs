use crate::types::*;
use serde::{Deserialize, Serialize};

/// Every transition the game reducer understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    /// Replace all groups and begin a new game
    StartGame { groups: Vec<Group> },
    /// Remember the category picked on the wheel before a question is attached
    SetSelectedCategory { category: Option<Category> },
    /// Attach a question and reset the countdown to `time_limit` seconds
    SetQuestion { question: Question, time_limit: u32 },
    AnswerQuestion { correct: bool, category: Category },
    UseJoker { group_id: GroupId },
    SetTimeRemaining { seconds: u32 },
    ResetQuestion,
    /// Pass the turn without scoring
    NextGroup,
    EndGame,
    SetLanguage { language: Language },
}

impl Action {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Action::StartGame { .. } => "start_game",
            Action::SetSelectedCategory { .. } => "set_selected_category",
            Action::SetQuestion { .. } => "set_question",
            Action::AnswerQuestion { .. } => "answer_question",
            Action::UseJoker { .. } => "use_joker",
            Action::SetTimeRemaining { .. } => "set_time_remaining",
            Action::ResetQuestion => "reset_question",
            Action::NextGroup => "next_group",
            Action::EndGame => "end_game",
            Action::SetLanguage { .. } => "set_language",
        }
    }
}

/// Result of resolving the current question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer_key: String,
    pub group_id: GroupId,
    /// Whose turn it is after the answer
    pub next_group_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Group>,
}

/// Result of spending a joker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum JokerOutcome {
    Replaced { question: Question },
    /// The joker is spent but the category had nothing left to ask
    NoReplacement,
}
