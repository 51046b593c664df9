//! Game controller
//!
//! Owns the single live [`GameState`] and is the only writer to it. Every
//! change goes through [`state::transition`] under one write lock, so actions
//! apply strictly in dispatch order. After each transition the new state is
//! broadcast to renderers and queued for persistence.

mod setup;
mod turn;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{broadcast, RwLock};

use crate::config::{AppConfig, Settings};
use crate::protocol::Action;
use crate::questions::{excluded_ids, PoolError, QuestionPool};
use crate::state;
use crate::store::{GameStore, StoreWriter};
use crate::timer::QuestionTimer;
use crate::types::*;

pub use setup::{validate_setup, GroupSetup, MAX_GROUPS};

/// Result type for controller operations
pub type GameResult<T> = Result<T, GameError>;

/// Reasons a player request is refused. None of them end the game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("no game is running")]
    NotStarted,

    #[error("invalid game setup: {0}")]
    InvalidSetup(String),

    #[error("there is no question to answer")]
    NoActiveQuestion,

    #[error("a question is already being answered")]
    QuestionAlreadyActive,

    #[error("{group} has no jokers left")]
    NoJokersLeft { group: String },

    #[error("no more questions in {category}")]
    NoQuestionsAvailable { category: Category },

    #[error("questions could not be loaded: {0}")]
    Pool(#[from] PoolError),

    #[error("the game is already won")]
    GameOver,
}

/// State guarded by the controller's single lock
struct Session {
    game: GameState,
    timer: Option<QuestionTimer>,
    /// Bumped for every attached question so old countdowns can be told apart
    generation: u64,
    /// Questions a group saw but never answered (skipped, passed, swapped by a joker)
    skipped: HashMap<GroupId, HashSet<QuestionId>>,
}

impl Session {
    /// Everything the acting group must not be asked next
    fn excluded_ids(&self) -> HashSet<QuestionId> {
        let mut ids = excluded_ids(&self.game);
        if let Some(skipped) = self
            .game
            .current_group()
            .and_then(|g| self.skipped.get(&g.id))
        {
            ids.extend(skipped.iter().cloned());
        }
        ids
    }
}

#[derive(Clone)]
pub struct GameController {
    session: Arc<RwLock<Session>>,
    config: Arc<AppConfig>,
    pool: Arc<dyn QuestionPool>,
    store: Arc<dyn GameStore>,
    writer: StoreWriter,
    rng: Arc<Mutex<StdRng>>,
    updates: broadcast::Sender<GameState>,
}

/// Handle that does not keep the session alive, held by the countdown task
struct WeakController {
    session: Weak<RwLock<Session>>,
    config: Arc<AppConfig>,
    pool: Arc<dyn QuestionPool>,
    store: Arc<dyn GameStore>,
    writer: StoreWriter,
    rng: Arc<Mutex<StdRng>>,
    updates: broadcast::Sender<GameState>,
}

impl WeakController {
    fn upgrade(&self) -> Option<GameController> {
        Some(GameController {
            session: self.session.upgrade()?,
            config: self.config.clone(),
            pool: self.pool.clone(),
            store: self.store.clone(),
            writer: self.writer.clone(),
            rng: self.rng.clone(),
            updates: self.updates.clone(),
        })
    }
}

impl GameController {
    /// Must be called from within a tokio runtime
    pub fn new(config: AppConfig, pool: Arc<dyn QuestionPool>, store: Arc<dyn GameStore>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (updates, _rx) = broadcast::channel(64);

        Self {
            session: Arc::new(RwLock::new(Session {
                game: GameState::new(config.language),
                timer: None,
                generation: 0,
                skipped: HashMap::new(),
            })),
            writer: StoreWriter::spawn(store.clone()),
            config: Arc::new(config),
            pool,
            store,
            rng: Arc::new(Mutex::new(rng)),
            updates,
        }
    }

    /// Replace the live state with whatever the store holds.
    ///
    /// A missing or unreadable save starts from a fresh state; the failure is
    /// only logged.
    pub async fn restore(&self) -> GameState {
        let restored = match self.store.load().await {
            Ok(Some(game)) => {
                tracing::info!(
                    "Restored game state from {} store ({} groups)",
                    self.store.name(),
                    game.groups.len()
                );
                game
            }
            Ok(None) => GameState::new(self.config.language),
            Err(e) => {
                tracing::warn!(
                    "Failed to load game state from {} store, starting fresh: {}",
                    self.store.name(),
                    e
                );
                GameState::new(self.config.language)
            }
        };

        let mut session = self.session.write().await;
        session.game = restored;
        session.timer = None;
        session.skipped.clear();
        if session.game.phase() == Phase::AwaitingAnswer && session.game.time_remaining > 0 {
            self.start_timer(&mut session);
        }

        let game = session.game.clone();
        let _ = self.updates.send(game.clone());
        game
    }

    /// Current state
    pub async fn state(&self) -> GameState {
        self.session.read().await.game.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Receive every state produced from now on
    pub fn subscribe(&self) -> broadcast::Receiver<GameState> {
        self.updates.subscribe()
    }

    /// Wait for queued saves to reach the store
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Whether an answer countdown is currently ticking
    pub async fn timer_running(&self) -> bool {
        self.session
            .read()
            .await
            .timer
            .as_ref()
            .is_some_and(QuestionTimer::is_running)
    }

    /// Apply an action without precondition checks
    pub async fn dispatch(&self, action: Action) -> GameState {
        let mut session = self.session.write().await;
        self.apply(&mut session, action)
    }

    fn apply(&self, session: &mut Session, action: Action) -> GameState {
        tracing::debug!(action = action.kind(), "Applying action");
        let question_attached = matches!(action, Action::SetQuestion { .. });
        let new_game = matches!(action, Action::StartGame { .. });

        let previous = std::mem::take(&mut session.game);
        let shown = previous
            .current_question
            .as_ref()
            .zip(previous.current_group())
            .map(|(q, g)| (g.id.clone(), q.id.clone()));
        session.game = state::transition(previous, action);

        if let Some((group_id, question_id)) = shown {
            let still_shown = session
                .game
                .current_question
                .as_ref()
                .is_some_and(|q| q.id == question_id);
            if !still_shown {
                session.skipped.entry(group_id).or_default().insert(question_id);
            }
        }
        if new_game {
            session.skipped.clear();
        }

        if session.game.current_question.is_none() || session.game.winner.is_some() {
            if session.timer.take().is_some() {
                tracing::debug!("Answer countdown cancelled");
            }
        } else if question_attached {
            self.start_timer(session);
        }

        let game = session.game.clone();
        self.writer.save(game.clone());
        // No subscribers is fine
        let _ = self.updates.send(game.clone());
        game
    }

    /// Start a countdown for the attached question, replacing any older one
    fn start_timer(&self, session: &mut Session) {
        let Some(question_id) = session.game.current_question.as_ref().map(|q| q.id.clone()) else {
            return;
        };

        session.generation += 1;
        let generation = session.generation;
        let handle = self.downgrade();
        session.timer = Some(QuestionTimer::spawn(generation, question_id, move || {
            let controller = handle.upgrade();
            async move {
                match controller {
                    Some(controller) => controller.tick(generation).await,
                    None => false,
                }
            }
        }));
    }

    /// One countdown step; returns whether the countdown should continue
    async fn tick(&self, generation: u64) -> bool {
        let mut session = self.session.write().await;
        if session.timer.as_ref().map(QuestionTimer::generation) != Some(generation) {
            return false;
        }

        let Some(seconds) = session.game.time_remaining.checked_sub(1) else {
            return false;
        };
        self.apply(&mut session, Action::SetTimeRemaining { seconds });

        if seconds == 0 {
            if let Some(group) = session.game.current_group() {
                tracing::info!("Time is up for {}", group.name);
            }
            return false;
        }
        true
    }

    fn downgrade(&self) -> WeakController {
        WeakController {
            session: Arc::downgrade(&self.session),
            config: self.config.clone(),
            pool: self.pool.clone(),
            store: self.store.clone(),
            writer: self.writer.clone(),
            rng: self.rng.clone(),
            updates: self.updates.clone(),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}
