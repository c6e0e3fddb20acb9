use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerMode, Entry, StudyDirection};

/// Consecutive correct drill answers needed before an entry is mastered.
pub const MASTERY_STREAK_TARGET: u32 = 2;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("no entries available for session")]
    Empty,

    #[error("session has no current card")]
    NoCurrentCard,

    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}

//
// ─── PHASE / INTENT ───────────────────────────────────────────────────────────
//

/// Study phases. Transitions only move forward:
/// `Assessment -> Drill -> FinalReview`, with `Drill` skipped when nothing was missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Assessment,
    Drill,
    FinalReview,
}

/// The two pile-mutating answers a learner can give.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Correct,
    Wrong,
}

/// Optional identifiers used to remember which bundled runs were completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLabels {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub run: Option<String>,
}

impl RunLabels {
    #[must_use]
    pub fn new(collection: Option<String>, run: Option<String>) -> Self {
        Self { collection, run }
    }

    /// `"<collection>:<run>"`, only when both labels are present.
    #[must_use]
    pub fn completion_key(&self) -> Option<String> {
        match (&self.collection, &self.run) {
            (Some(collection), Some(run)) => Some(format!("{collection}:{run}")),
            _ => None,
        }
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Full mutable state of one study run.
///
/// `Session` is a value: [`Session::apply`] never mutates `self`, it returns the
/// successor state so callers can snapshot and swap atomically.
///
/// While in `Assessment` or `Drill`, every entry sits in exactly one of
/// `unseen`, `drill_pile` or `mastered`. `FinalReview` walks `entries` by
/// `cursor` and leaves the piles untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    entries: Vec<Entry>,
    phase: Phase,
    unseen: VecDeque<Entry>,
    drill_pile: VecDeque<Entry>,
    mastered: Vec<Entry>,
    wrong_log: Vec<Entry>,
    cursor: usize,
    correct_count: u32,
    attempt_count: u32,
    started_at: DateTime<Utc>,
    complete: bool,
    study_direction: StudyDirection,
    answer_mode: AnswerMode,
    #[serde(default)]
    labels: RunLabels,
}

impl Session {
    /// Start a run over `entries` in the order given (callers shuffle first).
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Empty` if `entries` is empty.
    pub fn start(
        entries: Vec<Entry>,
        started_at: DateTime<Utc>,
        study_direction: StudyDirection,
        answer_mode: AnswerMode,
        labels: RunLabels,
    ) -> Result<Self, SessionStateError> {
        if entries.is_empty() {
            return Err(SessionStateError::Empty);
        }

        let entries: Vec<Entry> = entries.iter().map(Entry::without_streak).collect();
        Ok(Self {
            unseen: entries.iter().cloned().collect(),
            entries,
            phase: Phase::Assessment,
            drill_pile: VecDeque::new(),
            mastered: Vec::new(),
            wrong_log: Vec::new(),
            cursor: 0,
            correct_count: 0,
            attempt_count: 0,
            started_at,
            complete: false,
            study_direction,
            answer_mode,
            labels,
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn unseen(&self) -> &VecDeque<Entry> {
        &self.unseen
    }

    #[must_use]
    pub fn drill_pile(&self) -> &VecDeque<Entry> {
        &self.drill_pile
    }

    #[must_use]
    pub fn mastered(&self) -> &[Entry] {
        &self.mastered
    }

    #[must_use]
    pub fn wrong_log(&self) -> &[Entry] {
        &self.wrong_log
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub fn study_direction(&self) -> StudyDirection {
        self.study_direction
    }

    #[must_use]
    pub fn answer_mode(&self) -> AnswerMode {
        self.answer_mode
    }

    #[must_use]
    pub fn labels(&self) -> &RunLabels {
        &self.labels
    }

    /// Entries still to be sorted or drilled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.unseen.len() + self.drill_pile.len()
    }

    /// Percentage of correct answers, rounded; 100 before any attempt.
    #[must_use]
    pub fn accuracy(&self) -> u32 {
        if self.attempt_count == 0 {
            return 100;
        }
        let correct = u64::from(self.correct_count) * 100;
        let attempts = u64::from(self.attempt_count);
        u32::try_from((correct + attempts / 2) / attempts).unwrap_or(100)
    }

    /// The card currently shown to the learner, if any.
    #[must_use]
    pub fn current_entry(&self) -> Option<&Entry> {
        if self.complete {
            return None;
        }
        match self.phase {
            Phase::Assessment => self.unseen.front(),
            Phase::Drill => self.drill_pile.front(),
            Phase::FinalReview => self.entries.get(self.cursor),
        }
    }

    /// Compute the state that follows answering the current card.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NoCurrentCard` once the session is complete.
    pub fn apply(&self, intent: Intent) -> Result<Self, SessionStateError> {
        let current = self
            .current_entry()
            .cloned()
            .ok_or(SessionStateError::NoCurrentCard)?;

        let mut next = self.clone();
        next.attempt_count = next.attempt_count.saturating_add(1);
        match intent {
            Intent::Correct => next.correct_count = next.correct_count.saturating_add(1),
            Intent::Wrong => next.log_wrong(&current),
        }

        match self.phase {
            Phase::Assessment => {
                next.unseen.pop_front();
                match intent {
                    Intent::Correct => next.mastered.push(current),
                    Intent::Wrong => next.drill_pile.push_back(current.with_streak(0)),
                }
                if next.unseen.is_empty() {
                    if next.drill_pile.is_empty() {
                        next.enter_final_review();
                    } else {
                        next.phase = Phase::Drill;
                    }
                }
            }
            Phase::Drill => {
                next.drill_pile.pop_front();
                match intent {
                    Intent::Correct => {
                        let streak = current.correct_streak().unwrap_or(0).saturating_add(1);
                        let updated = current.with_streak(streak);
                        if streak >= MASTERY_STREAK_TARGET {
                            next.mastered.push(updated);
                        } else {
                            next.drill_pile.push_back(updated);
                        }
                    }
                    Intent::Wrong => next.drill_pile.push_back(current.with_streak(0)),
                }
                if next.drill_pile.is_empty() {
                    next.enter_final_review();
                }
            }
            Phase::FinalReview => {
                next.cursor += 1;
                if next.cursor >= next.entries.len() {
                    next.complete = true;
                }
            }
        }

        Ok(next)
    }

    pub fn set_study_direction(&mut self, direction: StudyDirection) {
        self.study_direction = direction;
    }

    pub fn set_answer_mode(&mut self, mode: AnswerMode) {
        self.answer_mode = mode;
    }

    /// Shape checks for state read back from durable storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Corrupt` describing the first violated invariant.
    pub fn validate(&self) -> Result<(), SessionStateError> {
        let corrupt = |msg: &str| Err(SessionStateError::Corrupt(msg.to_owned()));

        if self.entries.is_empty() {
            return corrupt("no entries");
        }
        let all_piles = self
            .entries
            .iter()
            .chain(&self.unseen)
            .chain(&self.drill_pile)
            .chain(&self.mastered)
            .chain(&self.wrong_log);
        if !all_piles.into_iter().all(Entry::is_well_formed) {
            return corrupt("entry with empty word or meaning");
        }
        if self.correct_count > self.attempt_count {
            return corrupt("more correct answers than attempts");
        }

        let piles = self.unseen.len() + self.drill_pile.len() + self.mastered.len();
        match self.phase {
            Phase::Assessment | Phase::Drill => {
                if piles != self.entries.len() {
                    return corrupt("pile sizes do not add up to entry count");
                }
                if self.complete || self.cursor != 0 {
                    return corrupt("review cursor set before final review");
                }
                if self.phase == Phase::Assessment && self.unseen.is_empty() {
                    return corrupt("assessment with nothing unseen");
                }
                if self.phase == Phase::Drill
                    && (!self.unseen.is_empty() || self.drill_pile.is_empty())
                {
                    return corrupt("drill with unseen entries or an empty drill pile");
                }
            }
            Phase::FinalReview => {
                if self.cursor > self.entries.len() {
                    return corrupt("review cursor past the end");
                }
                if self.complete != (self.cursor == self.entries.len()) {
                    return corrupt("completion flag disagrees with cursor");
                }
            }
        }

        Ok(())
    }

    fn enter_final_review(&mut self) {
        self.phase = Phase::FinalReview;
        self.cursor = 0;
    }

    fn log_wrong(&mut self, entry: &Entry) {
        if !self.wrong_log.iter().any(|w| w.word() == entry.word()) {
            self.wrong_log.push(entry.without_streak());
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
