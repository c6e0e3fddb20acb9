//! Per-presentation card views and typed-answer checking.

use rand::Rng;

use crate::model::{Direction, Entry, Intent, StudyDirection};

/// Canonical form used when comparing typed answers: trimmed and case-folded.
#[must_use]
pub fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

#[must_use]
pub fn answers_match(typed: &str, expected: &str) -> bool {
    normalize_answer(typed) == normalize_answer(expected)
}

//
// ─── CARD VIEW ────────────────────────────────────────────────────────────────
//

/// One presentation of an entry with its direction already resolved.
///
/// The prompt and the expected answer are both derived from the same
/// `direction`, so a `RandomPerCard` coin flip cannot disagree between render
/// and check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    entry: Entry,
    direction: Direction,
}

impl CardView {
    /// Resolve `study` for this presentation and capture the entry.
    pub fn present<R: Rng + ?Sized>(entry: &Entry, study: StudyDirection, rng: &mut R) -> Self {
        Self::with_direction(entry, study.resolve(rng))
    }

    #[must_use]
    pub fn with_direction(entry: &Entry, direction: Direction) -> Self {
        Self {
            entry: entry.clone(),
            direction,
        }
    }

    #[must_use]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        match self.direction {
            Direction::SourceToTarget => self.entry.word(),
            Direction::TargetToSource => self.entry.meaning(),
        }
    }

    #[must_use]
    pub fn expected_answer(&self) -> &str {
        match self.direction {
            Direction::SourceToTarget => self.entry.meaning(),
            Direction::TargetToSource => self.entry.word(),
        }
    }

    /// Check a typed answer against this view's expected side.
    #[must_use]
    pub fn check(&self, typed: &str) -> AnswerFeedback {
        let verdict = if answers_match(typed, self.expected_answer()) {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        AnswerFeedback {
            verdict,
            expected: self.expected_answer().to_owned(),
        }
    }
}

//
// ─── FEEDBACK ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// The learner claimed an incorrect verdict was actually right.
    Overridden,
}

/// Transient outcome of a typed answer, shown before the learner advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    verdict: Verdict,
    expected: String,
}

impl AnswerFeedback {
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Flip an `Incorrect` verdict to `Overridden`. Other verdicts are unchanged.
    pub fn override_as_correct(&mut self) {
        if self.verdict == Verdict::Incorrect {
            self.verdict = Verdict::Overridden;
        }
    }

    /// The pile-mutating intent to fire when the learner moves on.
    #[must_use]
    pub fn intent(&self) -> Intent {
        match self.verdict {
            Verdict::Correct | Verdict::Overridden => Intent::Correct,
            Verdict::Incorrect => Intent::Wrong,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self.verdict {
            Verdict::Correct => "Correct!".to_owned(),
            Verdict::Incorrect => format!("Incorrect. The answer was: {}", self.expected),
            Verdict::Overridden => "Overridden: marked as correct".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cat() -> Entry {
        Entry::new("cat", "/kæt/", "گربه").unwrap()
    }

    #[test]
    fn typed_answer_ignores_case_and_whitespace() {
        let entry = Entry::new("gato", "", "cat").unwrap();
        let view = CardView::with_direction(&entry, Direction::SourceToTarget);
        let feedback = view.check("Cat ");
        assert_eq!(feedback.verdict(), Verdict::Correct);
        assert_eq!(feedback.intent(), Intent::Correct);
    }

    #[test]
    fn reverse_direction_expects_the_word() {
        let view = CardView::with_direction(&cat(), Direction::TargetToSource);
        assert_eq!(view.prompt(), "گربه");
        assert_eq!(view.expected_answer(), "cat");
        assert_eq!(view.check("  CAT").verdict(), Verdict::Correct);
    }

    #[test]
    fn override_turns_a_miss_into_a_correct_intent() {
        let view = CardView::with_direction(&cat(), Direction::SourceToTarget);
        let mut feedback = view.check("dog");
        assert_eq!(feedback.intent(), Intent::Wrong);
        assert_eq!(feedback.message(), "Incorrect. The answer was: گربه");

        feedback.override_as_correct();
        assert_eq!(feedback.verdict(), Verdict::Overridden);
        assert_eq!(feedback.intent(), Intent::Correct);
    }

    #[test]
    fn override_does_not_touch_correct_feedback() {
        let view = CardView::with_direction(&cat(), Direction::SourceToTarget);
        let mut feedback = view.check("گربه");
        feedback.override_as_correct();
        assert_eq!(feedback.verdict(), Verdict::Correct);
    }

    #[test]
    fn random_view_checks_against_its_own_prompt_side() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..32 {
            let view = CardView::present(&cat(), StudyDirection::RandomPerCard, &mut rng);
            let typed = match view.direction() {
                Direction::SourceToTarget => "گربه",
                Direction::TargetToSource => "cat",
            };
            assert_ne!(view.prompt(), view.expected_answer());
            assert_eq!(view.check(typed).verdict(), Verdict::Correct);
        }
    }
}
