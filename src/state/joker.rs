use crate::types::*;

/// Spend one joker. The replacement question arrives as a separate `SetQuestion`.
pub(super) fn use_joker(mut state: GameState, group_id: &str) -> GameState {
    if let Some(group) = state.groups.iter_mut().find(|g| g.id == group_id) {
        if let Some(left) = group.jokers.checked_sub(1) {
            group.jokers = left;
        }
    }
    state
}
