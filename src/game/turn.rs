use super::{GameController, GameError, GameResult};
use crate::protocol::{Action, AnswerOutcome, JokerOutcome};
use crate::questions::select_question;
use crate::types::*;
use crate::wheel::{self, Spin};

/// Map the derived phase onto the error a caller should show
fn require_phase(state: &GameState, expected: Phase) -> GameResult<()> {
    match (state.phase(), expected) {
        (actual, expected) if actual == expected => Ok(()),
        (Phase::NotStarted, _) => Err(GameError::NotStarted),
        (Phase::Won, _) => Err(GameError::GameOver),
        (Phase::AwaitingAnswer, _) => Err(GameError::QuestionAlreadyActive),
        (Phase::AwaitingCategory, _) => Err(GameError::NoActiveQuestion),
    }
}

impl GameController {
    /// Spin the category wheel for the acting group
    pub async fn spin_wheel(&self) -> GameResult<Spin> {
        let mut session = self.session.write().await;
        require_phase(&session.game, Phase::AwaitingCategory)?;

        let spin = self.with_rng(|rng| wheel::spin(&Category::ALL, rng));
        tracing::info!("Wheel landed on {}", spin.result);
        self.apply(
            &mut session,
            Action::SetSelectedCategory {
                category: Some(spin.result),
            },
        );
        Ok(spin)
    }

    /// Attach a question from `category` the acting group has not seen
    pub async fn select_category(&self, category: Category) -> GameResult<Question> {
        let language = {
            let mut session = self.session.write().await;
            require_phase(&session.game, Phase::AwaitingCategory)?;
            self.apply(
                &mut session,
                Action::SetSelectedCategory {
                    category: Some(category),
                },
            );
            session.game.language
        };

        let pool = self.pool.load_questions(language, category).await?;

        let mut session = self.session.write().await;
        // The state may have moved on while the pool was loading
        require_phase(&session.game, Phase::AwaitingCategory)?;

        let exclude = session.excluded_ids();
        let question = self
            .with_rng(|rng| select_question(&pool, &exclude, rng).cloned())
            .ok_or(GameError::NoQuestionsAvailable { category })?;

        tracing::info!("Asking question {} from {}", question.id, category);
        self.apply(
            &mut session,
            Action::SetQuestion {
                question: question.clone(),
                time_limit: self.config.settings.answer_time.seconds(),
            },
        );
        Ok(question)
    }

    /// Continue a category pick that was interrupted, e.g. by a restart
    pub async fn resume_pending_category(&self) -> GameResult<Option<Question>> {
        let pending = {
            let session = self.session.read().await;
            match session.game.phase() {
                Phase::AwaitingCategory => session.game.selected_category,
                _ => None,
            }
        };

        match pending {
            Some(category) => self.select_category(category).await.map(Some),
            None => Ok(None),
        }
    }

    /// Answer a multiple choice question by option key
    pub async fn answer(&self, choice_key: &str) -> GameResult<AnswerOutcome> {
        self.resolve(|question| question.is_correct(choice_key)).await
    }

    /// Record the host's verdict on an open question
    pub async fn judge(&self, correct: bool) -> GameResult<AnswerOutcome> {
        self.resolve(|_| correct).await
    }

    async fn resolve(&self, verdict: impl FnOnce(&Question) -> bool) -> GameResult<AnswerOutcome> {
        let mut session = self.session.write().await;
        require_phase(&session.game, Phase::AwaitingAnswer)?;

        let question = session
            .game
            .current_question
            .clone()
            .ok_or(GameError::NoActiveQuestion)?;
        let group_id = session
            .game
            .current_group()
            .map(|g| g.id.clone())
            .ok_or(GameError::NotStarted)?;
        let correct = verdict(&question);

        self.apply(
            &mut session,
            Action::AnswerQuestion {
                correct,
                category: question.category,
            },
        );
        let game = self.apply(&mut session, Action::SetSelectedCategory { category: None });

        if let Some(ref winner) = game.winner {
            tracing::info!("{} collected every badge and wins", winner.name);
        }

        Ok(AnswerOutcome {
            correct,
            correct_answer_key: question.correct_answer_key,
            group_id,
            next_group_index: game.current_group_index,
            winner: game.winner,
        })
    }

    /// Stop the countdown and hand out the question so its answer can be shown
    pub async fn reveal_answer(&self) -> GameResult<Question> {
        let mut session = self.session.write().await;
        require_phase(&session.game, Phase::AwaitingAnswer)?;

        session.timer = None;
        session
            .game
            .current_question
            .clone()
            .ok_or(GameError::NoActiveQuestion)
    }

    /// Spend the acting group's joker and swap in another question of the
    /// same category. The joker stays spent even when no replacement exists.
    pub async fn use_joker(&self) -> GameResult<JokerOutcome> {
        let (language, category, replaced_id) = {
            let mut session = self.session.write().await;
            require_phase(&session.game, Phase::AwaitingAnswer)?;

            let group = session.game.current_group().ok_or(GameError::NotStarted)?;
            if group.jokers == 0 {
                return Err(GameError::NoJokersLeft {
                    group: group.name.clone(),
                });
            }
            tracing::info!("{} used a joker", group.name);
            let group_id = group.id.clone();

            let question = session
                .game
                .current_question
                .clone()
                .ok_or(GameError::NoActiveQuestion)?;
            self.apply(&mut session, Action::UseJoker { group_id });
            (session.game.language, question.category, question.id)
        };

        let pool = self.pool.load_questions(language, category).await?;

        let mut session = self.session.write().await;
        let still_current = session
            .game
            .current_question
            .as_ref()
            .is_some_and(|q| q.id == replaced_id);
        if session.game.phase() != Phase::AwaitingAnswer || !still_current {
            return Ok(JokerOutcome::NoReplacement);
        }

        let exclude = session.excluded_ids();
        let Some(question) = self.with_rng(|rng| select_question(&pool, &exclude, rng).cloned()) else {
            tracing::info!("No replacement question left in {}", category);
            return Ok(JokerOutcome::NoReplacement);
        };

        self.apply(
            &mut session,
            Action::SetQuestion {
                question: question.clone(),
                time_limit: self.config.settings.answer_time.seconds(),
            },
        );
        Ok(JokerOutcome::Replaced { question })
    }

    /// Give the turn to the next group without scoring
    pub async fn pass_turn(&self) -> GameResult<GameState> {
        let mut session = self.session.write().await;
        match session.game.phase() {
            Phase::NotStarted => return Err(GameError::NotStarted),
            Phase::Won => return Err(GameError::GameOver),
            Phase::AwaitingCategory | Phase::AwaitingAnswer => {}
        }
        self.apply(&mut session, Action::NextGroup);
        Ok(self.apply(&mut session, Action::SetSelectedCategory { category: None }))
    }

    /// Drop the current question without scoring it; the same group picks again
    pub async fn reset_question(&self) -> GameResult<GameState> {
        let mut session = self.session.write().await;
        require_phase(&session.game, Phase::AwaitingAnswer)?;

        self.apply(&mut session, Action::ResetQuestion);
        Ok(self.apply(&mut session, Action::SetSelectedCategory { category: None }))
    }

    pub async fn set_language(&self, language: Language) -> GameState {
        self.dispatch(Action::SetLanguage { language }).await
    }

    /// Stop the game and forget the saved state; the summary stays in memory
    pub async fn end_game(&self) -> GameState {
        let game = self.dispatch(Action::EndGame).await;
        self.writer.clear();
        tracing::info!("Game ended");
        game
    }

    /// Close the winner screen
    pub async fn acknowledge_winner(&self) -> GameResult<GameState> {
        {
            let session = self.session.read().await;
            require_phase(&session.game, Phase::Won)?;
        }
        Ok(self.end_game().await)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::game::GroupSetup;
    use crate::questions::StaticPool;
    use crate::state::test_support::question;
    use crate::store::{GameStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_requests_before_start_are_refused() {
        let (controller, _store) = controller();

        assert!(matches!(controller.spin_wheel().await, Err(GameError::NotStarted)));
        assert!(matches!(
            controller.select_category(Category::Art).await,
            Err(GameError::NotStarted)
        ));
        assert!(matches!(controller.judge(true).await, Err(GameError::NotStarted)));
        assert!(matches!(controller.use_joker().await, Err(GameError::NotStarted)));
        assert!(matches!(controller.pass_turn().await, Err(GameError::NotStarted)));
    }

    #[tokio::test]
    async fn test_spin_records_pending_category() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();

        let spin = controller.spin_wheel().await.unwrap();

        assert_eq!(spin.sequence.last(), Some(&spin.result));
        assert_eq!(controller.state().await.selected_category, Some(spin.result));
    }

    #[tokio::test]
    async fn test_select_category_attaches_question() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();

        let question = controller.select_category(Category::Science).await.unwrap();
        let state = controller.state().await;

        assert_eq!(question.category, Category::Science);
        assert_eq!(state.current_question, Some(question));
        assert_eq!(state.selected_category, Some(Category::Science));
        assert_eq!(state.time_remaining, 30);
        assert!(matches!(
            controller.select_category(Category::Art).await,
            Err(GameError::QuestionAlreadyActive)
        ));
    }

    #[tokio::test]
    async fn test_category_exhaustion_is_reported() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();

        for _ in 0..3 {
            controller.select_category(Category::Art).await.unwrap();
            controller.judge(true).await.unwrap();
        }

        let result = controller.select_category(Category::Art).await;
        assert!(matches!(
            result,
            Err(GameError::NoQuestionsAvailable {
                category: Category::Art
            })
        ));
        assert_eq!(controller.state().await.phase(), Phase::AwaitingCategory);
    }

    #[tokio::test]
    async fn test_other_group_can_still_get_same_questions() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();

        let mut alpha_seen = Vec::new();
        for _ in 0..3 {
            alpha_seen.push(controller.select_category(Category::Art).await.unwrap().id);
            controller.judge(true).await.unwrap();
        }
        controller.pass_turn().await.unwrap();

        let for_beta = controller.select_category(Category::Art).await.unwrap();
        assert!(alpha_seen.contains(&for_beta.id));
    }

    #[tokio::test]
    async fn test_answer_by_key() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();

        controller.select_category(Category::History).await.unwrap();
        let outcome = controller.answer("A").await.unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.next_group_index, 0);

        controller.select_category(Category::History).await.unwrap();
        let outcome = controller.answer("b").await.unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer_key, "a");
        assert_eq!(outcome.next_group_index, 1);

        let state = controller.state().await;
        assert_eq!(state.groups[0].correct_answers, 1);
        assert_eq!(state.groups[0].wrong_answers, 1);
        assert!(state.selected_category.is_none());
        assert!(matches!(
            controller.answer("a").await,
            Err(GameError::NoActiveQuestion)
        ));
    }

    #[tokio::test]
    async fn test_joker_swaps_question() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();
        let first = controller.select_category(Category::Geography).await.unwrap();

        let outcome = controller.use_joker().await.unwrap();

        let JokerOutcome::Replaced { question } = outcome else {
            panic!("expected a replacement question");
        };
        assert_ne!(question.id, first.id);
        assert_eq!(question.category, Category::Geography);

        let state = controller.state().await;
        assert_eq!(state.groups[0].jokers, 0);
        assert_eq!(state.current_question, Some(question));
        assert_eq!(state.current_group_index, 0);
    }

    #[tokio::test]
    async fn test_joker_refused_when_none_left() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();
        controller.select_category(Category::Art).await.unwrap();
        controller.use_joker().await.unwrap();

        let before = controller.state().await;
        let result = controller.use_joker().await;

        assert!(matches!(result, Err(GameError::NoJokersLeft { ref group }) if group == "Alpha"));
        assert_eq!(controller.state().await, before);
    }

    #[tokio::test]
    async fn test_joker_spent_without_replacement() {
        let pool = StaticPool::new(vec![question(1, Category::Sports)]);
        let controller = controller_with(pool, Arc::new(MemoryStore::new()));
        controller.start_game(setup()).await.unwrap();
        controller.select_category(Category::Sports).await.unwrap();

        let outcome = controller.use_joker().await.unwrap();

        assert_eq!(outcome, JokerOutcome::NoReplacement);
        let state = controller.state().await;
        assert_eq!(state.groups[0].jokers, 0);
        assert_eq!(
            state.current_question.map(|q| q.id),
            Some(QuestionId::Number(1))
        );
    }

    #[tokio::test]
    async fn test_reveal_then_judge() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();
        let asked = controller.select_category(Category::Art).await.unwrap();

        let revealed = controller.reveal_answer().await.unwrap();
        assert_eq!(revealed, asked);
        assert!(!controller.timer_running().await);

        let outcome = controller.judge(false).await.unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.next_group_index, 1);
    }

    #[tokio::test]
    async fn test_winning_flow_and_acknowledgement() {
        let (controller, store) = controller();
        controller.start_game(setup()).await.unwrap();

        let mut last = None;
        for category in Category::ALL {
            controller.select_category(category).await.unwrap();
            last = Some(controller.judge(true).await.unwrap());
        }

        let outcome = last.unwrap();
        let winner = outcome.winner.expect("sixth badge should win");
        assert_eq!(winner.name, "Alpha");
        assert_eq!(controller.state().await.phase(), Phase::Won);
        assert!(matches!(controller.spin_wheel().await, Err(GameError::GameOver)));

        let state = controller.acknowledge_winner().await.unwrap();
        assert_eq!(state.phase(), Phase::NotStarted);
        assert!(state.winner.is_some());

        controller.flush().await;
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pass_turn_clears_pending_pick() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();
        controller.select_category(Category::History).await.unwrap();

        let state = controller.pass_turn().await.unwrap();

        assert_eq!(state.current_group_index, 1);
        assert!(state.current_question.is_none());
        assert!(state.selected_category.is_none());
    }

    #[tokio::test]
    async fn test_resume_pending_category_after_restart() {
        let store = Arc::new(MemoryStore::new());
        let first = controller_with(pool(), store.clone());
        first.start_game(setup()).await.unwrap();
        first
            .dispatch(Action::SetSelectedCategory {
                category: Some(Category::Entertainment),
            })
            .await;
        first.flush().await;

        let second = controller_with(pool(), store);
        second.restore().await;
        let question = second.resume_pending_category().await.unwrap();

        assert_eq!(question.map(|q| q.category), Some(Category::Entertainment));
        assert_eq!(second.resume_pending_category().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_question_lets_group_pick_again() {
        let (controller, _store) = controller();
        controller.start_game(setup()).await.unwrap();
        assert!(matches!(
            controller.reset_question().await,
            Err(GameError::NoActiveQuestion)
        ));

        let skipped = controller.select_category(Category::History).await.unwrap();
        let state = controller.reset_question().await.unwrap();

        assert_eq!(state.phase(), Phase::AwaitingCategory);
        assert_eq!(state.current_group_index, 0);
        assert!(state.selected_category.is_none());
        assert_eq!(state.groups[0].correct_answers, 0);
        assert_eq!(state.groups[0].wrong_answers, 0);
        assert!(!controller.timer_running().await);

        let next = controller.select_category(Category::History).await.unwrap();
        assert_ne!(next.id, skipped.id);
    }

    #[tokio::test]
    async fn test_passed_question_not_handed_back_to_same_group() {
        let pool = StaticPool::new(vec![question(1, Category::Art), question(2, Category::Art)]);
        let controller = controller_with(pool, Arc::new(MemoryStore::new()));
        controller
            .start_game(vec![GroupSetup::new("Solo", ["Ann"])])
            .await
            .unwrap();

        let first = controller.select_category(Category::Art).await.unwrap();
        let state = controller.pass_turn().await.unwrap();
        assert_eq!(state.current_group_index, 0);

        let second = controller.select_category(Category::Art).await.unwrap();
        assert_ne!(second.id, first.id);

        controller.pass_turn().await.unwrap();
        assert!(matches!(
            controller.select_category(Category::Art).await,
            Err(GameError::NoQuestionsAvailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_joker_swapped_question_not_asked_again() {
        let pool = StaticPool::new(vec![question(1, Category::Art), question(2, Category::Art)]);
        let controller = controller_with(pool, Arc::new(MemoryStore::new()));
        controller.start_game(setup()).await.unwrap();

        let first = controller.select_category(Category::Art).await.unwrap();
        let JokerOutcome::Replaced { question } = controller.use_joker().await.unwrap() else {
            panic!("expected a replacement question");
        };
        assert_ne!(question.id, first.id);

        controller.judge(true).await.unwrap();
        assert!(matches!(
            controller.select_category(Category::Art).await,
            Err(GameError::NoQuestionsAvailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_new_game_forgets_skipped_questions() {
        let pool = StaticPool::new(vec![question(1, Category::Art)]);
        let controller = controller_with(pool, Arc::new(MemoryStore::new()));
        let solo = || vec![GroupSetup::new("Solo", ["Ann"])];
        controller.start_game(solo()).await.unwrap();
        controller.select_category(Category::Art).await.unwrap();
        controller.reset_question().await.unwrap();

        controller.start_game(solo()).await.unwrap();
        let question = controller.select_category(Category::Art).await.unwrap();
        assert_eq!(question.id, QuestionId::Number(1));
    }
}
