use crate::types::*;

/// Score the acting group and decide whose turn is next.
///
/// The acting group is the one at `current_group_index` before this call.
/// A correct answer earns the category badge and keeps the turn, a wrong one
/// passes the turn on. The win check runs once, on the updated group.
pub(super) fn answer_question(mut state: GameState, correct: bool, category: Category) -> GameState {
    if state.winner.is_some() {
        return state;
    }

    let acting = state.current_group_index;
    let group_count = state.groups.len();
    let Some(group) = state.groups.get_mut(acting) else {
        return state;
    };

    if let Some(question) = state.current_question.take() {
        group.answered_question_ids.insert(question.id);
    }

    if correct {
        group.correct_answers += 1;
        group.badges.insert(category);
    } else {
        group.wrong_answers += 1;
    }

    if group.has_all_badges() {
        state.winner = Some(group.clone());
    }

    if !correct {
        state.current_group_index = (acting + 1) % group_count;
    }

    state
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::transition;
    use crate::protocol::Action;
    use crate::types::*;
    use std::collections::BTreeSet;

    fn answer(state: GameState, correct: bool, category: Category) -> GameState {
        transition(state, Action::AnswerQuestion { correct, category })
    }

    #[test]
    fn test_alpha_beta_scenario() {
        let state = started();
        assert_eq!(state.current_group_index, 0);

        let state = answer(state, true, Category::History);
        assert_eq!(
            state.groups[0].badges,
            [Category::History].into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(state.groups[0].correct_answers, 1);
        assert_eq!(state.current_group_index, 0);

        let beta_before = state.groups[1].clone();
        let state = answer(state, false, Category::Science);
        assert_eq!(state.groups[1], beta_before);
        assert_eq!(state.groups[0].wrong_answers, 1);
        assert_eq!(state.current_group_index, 1);
    }

    #[test]
    fn test_duplicate_badge_not_counted_twice() {
        let state = answer(started(), true, Category::Art);
        let state = answer(state, true, Category::Art);

        assert_eq!(state.groups[0].badges.len(), 1);
        assert_eq!(state.groups[0].correct_answers, 2);
    }

    #[test]
    fn test_sixth_badge_wins() {
        let mut state = started();
        state.groups[0].badges = Category::ALL[..5].iter().copied().collect();

        let state = answer(state, true, Category::Entertainment);

        let winner = state.winner.as_ref().expect("winner should be set");
        assert_eq!(winner.id, "g1");
        assert_eq!(winner.badges.len(), CATEGORY_COUNT);
        assert_eq!(winner, &state.groups[0]);
        assert!(state.is_game_started);
        assert_eq!(state.phase(), Phase::Won);
    }

    #[test]
    fn test_repeat_badge_at_five_does_not_win() {
        let mut state = started();
        state.groups[0].badges = Category::ALL[..5].iter().copied().collect();

        let state = answer(state, true, Category::History);

        assert!(state.winner.is_none());
        assert_eq!(state.groups[0].badges.len(), 5);
    }

    #[test]
    fn test_credit_goes_to_group_acting_before_advance() {
        let mut state = started();
        state.current_group_index = 1;

        let state = answer(state, false, Category::Art);

        assert_eq!(state.groups[1].wrong_answers, 1);
        assert_eq!(state.groups[0].wrong_answers, 0);
        assert_eq!(state.current_group_index, 0);
    }

    #[test]
    fn test_answer_records_current_question() {
        let state = transition(
            started(),
            Action::SetQuestion {
                question: question(42, Category::Science),
                time_limit: 30,
            },
        );

        let state = answer(state, true, Category::Science);

        assert!(state.current_question.is_none());
        assert!(state.groups[0]
            .answered_question_ids
            .contains(&QuestionId::Number(42)));
        assert!(state.groups[1].answered_question_ids.is_empty());
    }

    #[test]
    fn test_answers_ignored_after_win() {
        let mut state = started();
        state.groups[0].badges = Category::ALL[..5].iter().copied().collect();
        let state = answer(state, true, Category::Entertainment);

        let next = answer(state.clone(), false, Category::Art);
        assert_eq!(next, state);
    }

    #[test]
    fn test_answer_without_groups_is_ignored() {
        let state = GameState::default();
        assert_eq!(answer(state.clone(), true, Category::Art), state);
    }
}
