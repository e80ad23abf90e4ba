use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::info;

use crate::model::Snapshot;
use crate::pipeline::Pipeline;
use crate::quiz::Quiz;

/// State of one interactive session.
#[derive(Debug, Default)]
pub struct Session {
    snapshot: Option<Snapshot>,
    quiz: Option<Quiz>,
}

impl Session {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    /// Install the result of a new fetch; anything derived from the old one goes.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = Some(snapshot);
        self.quiz = None;
    }

    pub fn set_quiz(&mut self, quiz: Quiz) {
        self.quiz = Some(quiz);
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        self.quiz = None;
    }
}

/// Session plus the single-fetch guard. Buckets are only written once a
/// fetch has fully completed.
#[derive(Default)]
pub struct SessionStore {
    session: RwLock<Session>,
    fetching: AtomicBool,
}

/// Marks a fetch as running; the mark is released on drop, including when
/// the fetching future is cancelled.
pub struct FetchGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &RwLock<Session> {
        &self.session
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// Claim the fetch slot, or `None` if another fetch holds it.
    pub fn try_begin_fetch(&self) -> Option<FetchGuard<'_>> {
        self.fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchGuard {
                flag: &self.fetching,
            })
    }

    /// Run the pipeline and install its snapshot. Returns `false` without
    /// doing anything if a fetch is already in progress.
    pub async fn refresh(&self, pipeline: &Pipeline) -> bool {
        let Some(_guard) = self.try_begin_fetch() else {
            info!("Fetch already in progress, skipping");
            return false;
        };

        let snapshot = pipeline.run().await;
        self.session.write().await.replace_snapshot(snapshot);
        true
    }
}
