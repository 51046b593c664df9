use rand::Rng;
use std::collections::HashSet;

use crate::types::{GameState, Question, QuestionId};

/// Pick a question uniformly among those not excluded.
///
/// `None` means the pool is exhausted for this group, which callers surface as
/// "no more questions" rather than treating as a failure.
pub fn select_question<'a, R: Rng + ?Sized>(
    pool: &'a [Question],
    exclude: &HashSet<QuestionId>,
    rng: &mut R,
) -> Option<&'a Question> {
    let eligible: Vec<&Question> = pool.iter().filter(|q| !exclude.contains(&q.id)).collect();
    if eligible.is_empty() {
        return None;
    }
    Some(eligible[rng.random_range(0..eligible.len())])
}

/// Ids the acting group must not be asked: everything it already answered,
/// plus the question on screen so a joker never hands it straight back
pub fn excluded_ids(state: &GameState) -> HashSet<QuestionId> {
    let mut ids: HashSet<QuestionId> = state
        .current_group()
        .map(|g| g.answered_question_ids.iter().cloned().collect())
        .unwrap_or_default();
    if let Some(ref question) = state.current_question {
        ids.insert(question.id.clone());
    }
    ids
}
