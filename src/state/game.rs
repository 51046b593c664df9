use crate::types::*;

pub(super) fn start_game(state: GameState, groups: Vec<Group>) -> GameState {
    if groups.is_empty() {
        return state;
    }

    GameState {
        groups,
        current_group_index: 0,
        current_question: None,
        selected_category: None,
        is_game_started: true,
        winner: None,
        ..state
    }
}

pub(super) fn set_selected_category(state: GameState, category: Option<Category>) -> GameState {
    GameState {
        selected_category: category,
        ..state
    }
}

pub(super) fn set_language(state: GameState, language: Language) -> GameState {
    GameState { language, ..state }
}

/// Groups and winner survive so a summary can still be shown
pub(super) fn end_game(state: GameState) -> GameState {
    GameState {
        is_game_started: false,
        current_question: None,
        selected_category: None,
        ..state
    }
}
