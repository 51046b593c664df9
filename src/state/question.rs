use crate::types::*;

/// Used both for fresh picks and for joker swaps
pub(super) fn set_question(state: GameState, question: Question, time_limit: u32) -> GameState {
    GameState {
        current_question: Some(question),
        time_remaining: time_limit,
        ..state
    }
}

pub(super) fn set_time_remaining(state: GameState, seconds: u32) -> GameState {
    GameState {
        time_remaining: seconds,
        ..state
    }
}

pub(super) fn reset_question(state: GameState) -> GameState {
    GameState {
        current_question: None,
        ..state
    }
}

pub(super) fn next_group(state: GameState) -> GameState {
    if state.groups.is_empty() {
        return state;
    }

    GameState {
        current_group_index: (state.current_group_index + 1) % state.groups.len(),
        current_question: None,
        ..state
    }
}
