use vocab_core::model::{Phase, Session};

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub phase: Phase,
    /// 1-based index of the card being shown within the current pass, capped at
    /// `total`. During drill this counts mastered entries.
    pub position: usize,
    pub total: usize,
    pub unseen: usize,
    pub drilling: usize,
    pub mastered: usize,
    pub wrong: usize,
    pub correct: u32,
    pub attempts: u32,
    pub accuracy: u32,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn of(session: &Session) -> Self {
        let total = session.entries().len();
        let settled = match session.phase() {
            Phase::Assessment => total - session.unseen().len(),
            Phase::Drill => session.mastered().len(),
            Phase::FinalReview => session.cursor(),
        };
        Self {
            phase: session.phase(),
            position: (settled + 1).min(total),
            total,
            unseen: session.unseen().len(),
            drilling: session.drill_pile().len(),
            mastered: session.mastered().len(),
            wrong: session.wrong_log().len(),
            correct: session.correct_count(),
            attempts: session.attempt_count(),
            accuracy: session.accuracy(),
            remaining: session.remaining(),
            is_complete: session.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::{AnswerMode, Entry, Intent, RunLabels, StudyDirection};
    use vocab_core::time::fixed_now;

    #[test]
    fn progress_tracks_piles_and_accuracy() {
        let entries = vec![
            Entry::new("a", "", "1").unwrap(),
            Entry::new("b", "", "2").unwrap(),
        ];
        let session = Session::start(
            entries,
            fixed_now(),
            StudyDirection::default(),
            AnswerMode::default(),
            RunLabels::default(),
        )
        .unwrap();
        let start = SessionProgress::of(&session);
        assert_eq!((start.position, start.total, start.unseen), (1, 2, 2));
        assert_eq!(start.accuracy, 100);

        let session = session.apply(Intent::Wrong).unwrap();
        let progress = SessionProgress::of(&session);
        assert_eq!(progress.position, 2);
        assert_eq!(progress.drilling, 1);
        assert_eq!(progress.wrong, 1);
        assert_eq!(progress.accuracy, 0);
        assert_eq!(progress.remaining, 2);
    }
}
