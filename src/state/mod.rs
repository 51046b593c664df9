//! The game reducer.
//!
//! `transition` is the only way game state changes. It is total: an action
//! that does not apply to the current state returns the state untouched, and
//! callers are expected to check preconditions before dispatching.

mod export;
mod game;
mod joker;
mod question;
mod score;

pub use export::{decode_snapshot, GameSnapshot, LEGACY_SCHEMA_VERSION, SCHEMA_VERSION};

use crate::protocol::Action;
use crate::types::GameState;

/// Apply one action and return the resulting state
pub fn transition(state: GameState, action: Action) -> GameState {
    match action {
        Action::StartGame { groups } => game::start_game(state, groups),
        Action::SetSelectedCategory { category } => game::set_selected_category(state, category),
        Action::SetLanguage { language } => game::set_language(state, language),
        Action::EndGame => game::end_game(state),
        Action::SetQuestion {
            question,
            time_limit,
        } => question::set_question(state, question, time_limit),
        Action::SetTimeRemaining { seconds } => question::set_time_remaining(state, seconds),
        Action::ResetQuestion => question::reset_question(state),
        Action::NextGroup => question::next_group(state),
        Action::AnswerQuestion { correct, category } => {
            score::answer_question(state, correct, category)
        }
        Action::UseJoker { group_id } => joker::use_joker(state, &group_id),
    }
}
