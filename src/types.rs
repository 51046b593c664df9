use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Opaque ID types
pub type GroupId = String;
pub type PlayerId = String;

/// Number of wheel categories, and therefore badges needed to win
pub const CATEGORY_COUNT: usize = 6;

/// Countdown used before any settings were applied
pub const DEFAULT_ANSWER_SECONDS: u32 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    History,
    Geography,
    Science,
    Sports,
    Art,
    Entertainment,
}

impl Category {
    /// All categories in wheel order
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::History,
        Category::Geography,
        Category::Science,
        Category::Sports,
        Category::Art,
        Category::Entertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::History => "history",
            Category::Geography => "geography",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Art => "art",
            Category::Entertainment => "entertainment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Tr,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Tr => "tr",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language: {0}")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tr" => Ok(Language::Tr),
            "en" => Ok(Language::En),
            _ => Err(ParseLanguageError(s.to_string())),
        }
    }
}

/// Question ids come from hand-written JSON files, so both numbers and strings occur
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(untagged)]
pub enum QuestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{}", n),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for QuestionId {
    fn from(n: u64) -> Self {
        QuestionId::Number(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub category: Category,
    pub language: Language,
    /// Choice key -> choice text; absent for classic (open answer) questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
    /// Option key for multiple choice, the answer text for classic questions
    pub correct_answer_key: String,
}

impl Question {
    pub fn has_options(&self) -> bool {
        self.options.as_ref().is_some_and(|o| !o.is_empty())
    }

    /// Compare a submitted answer against the correct key, ignoring case and padding
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.correct_answer_key.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub players: Vec<Player>,
    pub jokers: u32,
    #[serde(default)]
    pub badges: BTreeSet<Category>,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub wrong_answers: u32,
    /// Questions this group already answered; never asked to it again
    #[serde(default)]
    pub answered_question_ids: BTreeSet<QuestionId>,
}

impl Group {
    /// A fresh group as built from the setup screen
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>, players: Vec<Player>, jokers: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            players,
            jokers,
            badges: BTreeSet::new(),
            correct_answers: 0,
            wrong_answers: 0,
            answered_question_ids: BTreeSet::new(),
        }
    }

    pub fn has_all_badges(&self) -> bool {
        self.badges.len() == CATEGORY_COUNT
    }

    pub fn missing_badges(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| !self.badges.contains(c))
            .collect()
    }
}

/// Coarse game progression, derived from the state fields
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NotStarted,
    AwaitingCategory,
    AwaitingAnswer,
    Won,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub groups: Vec<Group>,
    pub current_group_index: usize,
    pub current_question: Option<Question>,
    pub selected_category: Option<Category>,
    pub time_remaining: u32,
    pub is_game_started: bool,
    /// Snapshot of the winning group taken right after its sixth badge
    pub winner: Option<Group>,
    pub language: Language,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl GameState {
    pub fn new(language: Language) -> Self {
        Self {
            groups: Vec::new(),
            current_group_index: 0,
            current_question: None,
            selected_category: None,
            time_remaining: DEFAULT_ANSWER_SECONDS,
            is_game_started: false,
            winner: None,
            language,
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.is_game_started {
            Phase::NotStarted
        } else if self.winner.is_some() {
            Phase::Won
        } else if self.current_question.is_some() {
            Phase::AwaitingAnswer
        } else {
            Phase::AwaitingCategory
        }
    }

    /// The group whose turn it is
    pub fn current_group(&self) -> Option<&Group> {
        self.groups.get(self.current_group_index)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_and_display() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>(), Ok(category));
        }
        assert_eq!(" Sports ".parse::<Category>(), Ok(Category::Sports));
        assert!("cooking".parse::<Category>().is_err());
    }

    #[test]
    fn test_question_id_accepts_numbers_and_strings() {
        let ids: Vec<QuestionId> = serde_json::from_str(r#"[7, "abc"]"#).unwrap();
        assert_eq!(ids, vec![QuestionId::Number(7), QuestionId::Text("abc".into())]);
    }

    #[test]
    fn test_answer_comparison_ignores_case() {
        let question = Question {
            id: 1.into(),
            text: "Capital of France?".to_string(),
            category: Category::Geography,
            language: Language::En,
            options: None,
            correct_answer_key: "Paris".to_string(),
        };
        assert!(question.is_correct(" paris "));
        assert!(!question.is_correct("Lyon"));
        assert!(!question.has_options());
    }

    #[test]
    fn test_phase_derivation() {
        let mut state = GameState::new(Language::En);
        assert_eq!(state.phase(), Phase::NotStarted);

        state.is_game_started = true;
        state.groups.push(Group::new("g1", "Alpha", vec![], 1));
        assert_eq!(state.phase(), Phase::AwaitingCategory);
        assert_eq!(state.current_group().map(|g| g.name.as_str()), Some("Alpha"));

        let mut winner = state.groups[0].clone();
        winner.badges = Category::ALL.into_iter().collect();
        state.winner = Some(winner);
        assert_eq!(state.phase(), Phase::Won);
    }

    #[test]
    fn test_missing_badges() {
        let mut group = Group::new("g1", "Alpha", vec![], 1);
        group.badges.insert(Category::Art);
        assert_eq!(group.missing_badges().len(), CATEGORY_COUNT - 1);
        assert!(!group.missing_badges().contains(&Category::Art));
        assert!(!group.has_all_badges());
    }
}
