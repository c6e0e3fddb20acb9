use std::collections::VecDeque;
use std::mem;

use vocab_core::model::{AnswerMode, Entry, Intent, Session, StudyDirection};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// Number of prior session states kept for undo.
pub const HISTORY_CAPACITY: usize = 20;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory learning session with bounded undo.
///
/// Each intent computes the next [`Session`] from the current one and swaps it
/// in whole; the replaced state is pushed onto the history ring first, dropping
/// the oldest snapshot once [`HISTORY_CAPACITY`] is reached.
#[derive(Debug, Clone)]
pub struct SessionService {
    session: Session,
    history: VecDeque<Session>,
}

impl SessionService {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&Entry> {
        self.session.current_entry()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::of(&self.session)
    }

    /// Apply an intent to the current card.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` when there is no current card. Nothing is
    /// pushed onto the history in that case.
    pub fn answer(&mut self, intent: Intent) -> Result<&Session, SessionError> {
        let next = self.session.apply(intent)?;
        let previous = mem::replace(&mut self.session, next);
        self.push_history(previous);
        Ok(&self.session)
    }

    /// # Errors
    ///
    /// See [`SessionService::answer`].
    pub fn answer_correct(&mut self) -> Result<&Session, SessionError> {
        self.answer(Intent::Correct)
    }

    /// # Errors
    ///
    /// See [`SessionService::answer`].
    pub fn answer_wrong(&mut self) -> Result<&Session, SessionError> {
        self.answer(Intent::Wrong)
    }

    /// Restore the most recent snapshot. Returns `false` when history is empty.
    pub fn previous(&mut self) -> bool {
        match self.history.pop_back() {
            Some(snapshot) => {
                self.session = snapshot;
                true
            }
            None => false,
        }
    }

    /// Mode changes are not undoable.
    pub fn set_study_direction(&mut self, direction: StudyDirection) {
        self.session.set_study_direction(direction);
    }

    pub fn set_answer_mode(&mut self, mode: AnswerMode) {
        self.session.set_answer_mode(mode);
    }

    fn push_history(&mut self, snapshot: Session) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::{Phase, RunLabels};
    use vocab_core::time::fixed_now;

    fn service(words: &[&str]) -> SessionService {
        let entries = words
            .iter()
            .map(|w| Entry::new(*w, "", format!("{w}-meaning")).unwrap())
            .collect();
        let session = Session::start(
            entries,
            fixed_now(),
            StudyDirection::default(),
            AnswerMode::default(),
            RunLabels::default(),
        )
        .unwrap();
        SessionService::new(session)
    }

    #[test]
    fn undo_restores_prior_state_exactly() {
        let mut svc = service(&["a", "b", "c"]);
        let before = svc.session().clone();
        svc.answer_wrong().unwrap();
        assert_ne!(svc.session(), &before);

        assert!(svc.can_undo());
        assert!(svc.previous());
        assert_eq!(svc.session(), &before);
        assert!(!svc.can_undo());
        assert!(!svc.previous());
    }

    #[test]
    fn history_is_capped_and_drops_oldest() {
        let words: Vec<String> = (0..30).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let mut svc = service(&refs);

        let mut states = vec![svc.session().clone()];
        for _ in 0..25 {
            svc.answer_correct().unwrap();
            states.push(svc.session().clone());
        }
        assert_eq!(svc.history_len(), HISTORY_CAPACITY);

        for _ in 0..HISTORY_CAPACITY {
            assert!(svc.previous());
        }
        assert!(!svc.previous());
        assert_eq!(svc.session(), &states[25 - HISTORY_CAPACITY]);
    }

    #[test]
    fn intent_on_complete_session_leaves_history_untouched() {
        let mut svc = service(&["solo"]);
        svc.answer_correct().unwrap();
        assert_eq!(svc.session().phase(), Phase::FinalReview);
        svc.answer_correct().unwrap();
        assert!(svc.is_complete());

        let len = svc.history_len();
        assert!(svc.answer_correct().is_err());
        assert_eq!(svc.history_len(), len);
    }

    #[test]
    fn mode_changes_skip_history() {
        let mut svc = service(&["a"]);
        svc.set_answer_mode(AnswerMode::TypeAnswer);
        svc.set_study_direction(StudyDirection::RandomPerCard);
        assert!(!svc.can_undo());
        assert_eq!(svc.session().answer_mode(), AnswerMode::TypeAnswer);
    }
}
