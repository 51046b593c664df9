//! Runtime settings read from the environment

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::Language;

/// Allowed answer countdowns in seconds
pub const ANSWER_TIMES: [u32; 3] = [30, 45, 60];

pub const DEFAULT_STARTING_JOKERS: u32 = 2;
pub const MAX_STARTING_JOKERS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AnswerTime(u32);

impl AnswerTime {
    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl Default for AnswerTime {
    fn default() -> Self {
        AnswerTime(ANSWER_TIMES[0])
    }
}

impl TryFrom<u32> for AnswerTime {
    type Error = String;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        if ANSWER_TIMES.contains(&seconds) {
            Ok(AnswerTime(seconds))
        } else {
            Err(format!(
                "answer time must be one of {:?} seconds, got {}",
                ANSWER_TIMES, seconds
            ))
        }
    }
}

impl From<AnswerTime> for u32 {
    fn from(time: AnswerTime) -> Self {
        time.0
    }
}

/// Player-facing settings, read-only to the game core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub answer_time: AnswerTime,
    /// Show multiple choice options when a question has them
    pub show_options: bool,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            answer_time: AnswerTime::default(),
            show_options: false,
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: Settings,
    pub starting_jokers: u32,
    /// Language of a fresh game
    pub language: Language,
    pub questions_dir: PathBuf,
    pub state_file: PathBuf,
    /// Fixed RNG seed for reproducible spins and picks
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            starting_jokers: DEFAULT_STARTING_JOKERS,
            language: Language::default(),
            questions_dir: PathBuf::from("questions"),
            state_file: PathBuf::from("trivia-state.json"),
            seed: None,
        }
    }
}

impl AppConfig {
    /// Load config from environment variables, keeping defaults for anything
    /// unset or invalid
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let answer_time = parse_env::<u32>("TRIVIA_ANSWER_TIME")
            .and_then(|s| match AnswerTime::try_from(s) {
                Ok(time) => Some(time),
                Err(e) => {
                    tracing::warn!("Ignoring TRIVIA_ANSWER_TIME: {}", e);
                    None
                }
            })
            .unwrap_or(defaults.settings.answer_time);

        let starting_jokers = match parse_env::<u32>("TRIVIA_STARTING_JOKERS") {
            Some(n) if (1..=MAX_STARTING_JOKERS).contains(&n) => n,
            Some(n) => {
                tracing::warn!(
                    "TRIVIA_STARTING_JOKERS must be between 1 and {}, got {}; using {}",
                    MAX_STARTING_JOKERS,
                    n,
                    DEFAULT_STARTING_JOKERS
                );
                DEFAULT_STARTING_JOKERS
            }
            None => DEFAULT_STARTING_JOKERS,
        };

        let config = Self {
            settings: Settings {
                answer_time,
                show_options: parse_bool_env("TRIVIA_SHOW_OPTIONS")
                    .unwrap_or(defaults.settings.show_options),
                sound_enabled: parse_bool_env("TRIVIA_SOUND")
                    .unwrap_or(defaults.settings.sound_enabled),
            },
            starting_jokers,
            language: parse_env("TRIVIA_LANGUAGE").unwrap_or(defaults.language),
            questions_dir: env_var("TRIVIA_QUESTIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_dir),
            state_file: env_var("TRIVIA_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_file),
            seed: parse_env("TRIVIA_SEED"),
        };

        tracing::info!(
            answer_time = config.settings.answer_time.seconds(),
            starting_jokers = config.starting_jokers,
            language = %config.language,
            seeded = config.seed.is_some(),
            "Configuration loaded"
        );
        config
    }
}

/// Trimmed, non-empty environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = env_var(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", name, raw, e);
            None
        }
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    let raw = env_var(name)?;
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Ignoring {}={:?}: expected a boolean", name, raw);
            None
        }
    }
}
