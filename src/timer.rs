//! Answer countdown.
//!
//! A [`QuestionTimer`] belongs to exactly one attached question. Dropping the
//! handle aborts its task, so a replaced or cleared question can never receive
//! a stale tick.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::types::QuestionId;

pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct QuestionTimer {
    generation: u64,
    question_id: QuestionId,
    handle: JoinHandle<()>,
}

impl QuestionTimer {
    /// Call `tick` once per second until it returns `false` or the handle is dropped
    pub fn spawn<F, Fut>(generation: u64, question_id: QuestionId, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send,
    {
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(TICK).await;
                if !tick().await {
                    break;
                }
            }
        });

        Self {
            generation,
            question_id,
            handle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
