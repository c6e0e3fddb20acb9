use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use storage::repository::KeyValueStore;
use vocab_core::Clock;
use vocab_core::model::{
    AnswerMode, Entry, Intent, Phase, RunLabels, Session, SessionStateError, StudyDirection,
};

use super::persistence::SessionStore;
use super::service::SessionService;
use crate::error::SessionError;

/// Settings chosen when a run is started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    pub study_direction: StudyDirection,
    pub answer_mode: AnswerMode,
    pub labels: RunLabels,
}

/// Result of answering a single card in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionAnswerResult {
    pub intent: Intent,
    pub phase: Phase,
    pub is_complete: bool,
    /// Set when this answer finished the run and its key was newly recorded.
    pub newly_completed: bool,
}

/// Orchestrates session start, answering and best-effort persistence.
///
/// Storage failures never fail an intent: they are logged and the in-memory
/// session carries on.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    store: SessionStore,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            store: SessionStore::new(kv),
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Shuffle `entries` and start a fresh run, replacing any stored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` if `entries` is empty.
    pub async fn start_session<R: Rng + ?Sized>(
        &self,
        mut entries: Vec<Entry>,
        options: StartOptions,
        rng: &mut R,
    ) -> Result<SessionService, SessionError> {
        if entries.is_empty() {
            return Err(SessionStateError::Empty.into());
        }
        entries.shuffle(rng);

        let session = Session::start(
            entries,
            self.clock.now(),
            options.study_direction,
            options.answer_mode,
            options.labels,
        )?;
        tracing::info!(
            entries = session.entries().len(),
            direction = %session.study_direction(),
            mode = %session.answer_mode(),
            "session started"
        );

        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "failed to clear previous session");
        }
        self.persist(&session).await;
        Ok(SessionService::new(session))
    }

    /// Pick up the stored session, if any. Undo history starts empty.
    pub async fn resume(&self) -> Option<SessionService> {
        let session = self.store.load().await?;
        tracing::info!(remaining = session.remaining(), "session resumed");
        Some(SessionService::new(session))
    }

    /// Apply `intent`, persist the new state and record completion.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` when the session has no current card.
    pub async fn answer_current(
        &self,
        session: &mut SessionService,
        intent: Intent,
    ) -> Result<SessionAnswerResult, SessionError> {
        let was_complete = session.is_complete();
        let state = session.answer(intent)?;
        let (phase, is_complete) = (state.phase(), state.is_complete());
        tracing::debug!(?intent, ?phase, remaining = state.remaining(), "answer recorded");

        self.persist(session.session()).await;

        let mut newly_completed = false;
        if is_complete && !was_complete {
            newly_completed = self.record_completion(session.session()).await;
        }

        Ok(SessionAnswerResult {
            intent,
            phase,
            is_complete,
            newly_completed,
        })
    }

    /// # Errors
    ///
    /// See [`SessionLoopService::answer_current`].
    pub async fn answer_correct(
        &self,
        session: &mut SessionService,
    ) -> Result<SessionAnswerResult, SessionError> {
        self.answer_current(session, Intent::Correct).await
    }

    /// # Errors
    ///
    /// See [`SessionLoopService::answer_current`].
    pub async fn answer_wrong(
        &self,
        session: &mut SessionService,
    ) -> Result<SessionAnswerResult, SessionError> {
        self.answer_current(session, Intent::Wrong).await
    }

    /// Undo the last intent. Returns `false` when there is nothing to undo.
    pub async fn previous(&self, session: &mut SessionService) -> bool {
        if !session.previous() {
            return false;
        }
        self.persist(session.session()).await;
        true
    }

    pub async fn set_study_direction(&self, session: &mut SessionService, direction: StudyDirection) {
        session.set_study_direction(direction);
        self.persist(session.session()).await;
    }

    pub async fn set_answer_mode(&self, session: &mut SessionService, mode: AnswerMode) {
        session.set_answer_mode(mode);
        self.persist(session.session()).await;
    }

    /// Drop the session and its stored snapshot.
    pub async fn abandon(&self, session: SessionService) {
        tracing::info!(
            remaining = session.session().remaining(),
            "session abandoned"
        );
        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "failed to clear abandoned session");
        }
    }

    async fn persist(&self, session: &Session) {
        if let Err(err) = self.store.save(session).await {
            tracing::warn!(error = %err, "failed to persist session");
        }
    }

    async fn record_completion(&self, session: &Session) -> bool {
        tracing::info!(
            accuracy = session.accuracy(),
            attempts = session.attempt_count(),
            "session complete"
        );
        match self.store.mark_completed(session.labels()).await {
            Ok(added) => added,
            Err(err) => {
                tracing::warn!(error = %err, "failed to record completed run");
                false
            }
        }
    }
}
