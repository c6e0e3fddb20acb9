use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of an entry is shown as the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyDirection {
    /// Show the word, expect the meaning.
    #[default]
    SourceToTarget,
    /// Show the meaning, expect the word.
    TargetToSource,
    /// Flip a coin for every card presentation.
    RandomPerCard,
}

/// A direction after `RandomPerCard` has been resolved for one presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    SourceToTarget,
    TargetToSource,
}

impl StudyDirection {
    /// Resolve to a fixed direction. Only `RandomPerCard` consumes randomness.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Direction {
        match self {
            StudyDirection::SourceToTarget => Direction::SourceToTarget,
            StudyDirection::TargetToSource => Direction::TargetToSource,
            StudyDirection::RandomPerCard => {
                if rng.random_bool(0.5) {
                    Direction::SourceToTarget
                } else {
                    Direction::TargetToSource
                }
            }
        }
    }
}

/// How the learner answers a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Flip the card and self-grade.
    #[default]
    Reveal,
    /// Type the answer and have it checked.
    TypeAnswer,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {raw}")]
pub struct ModeParseError {
    kind: &'static str,
    raw: String,
}

impl FromStr for StudyDirection {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source-to-target" | "source" | "forward" => Ok(Self::SourceToTarget),
            "target-to-source" | "target" | "reverse" => Ok(Self::TargetToSource),
            "random-per-card" | "random" | "mix" => Ok(Self::RandomPerCard),
            _ => Err(ModeParseError {
                kind: "study direction",
                raw: s.to_owned(),
            }),
        }
    }
}

impl FromStr for AnswerMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reveal" | "flashcard" => Ok(Self::Reveal),
            "type" | "type-answer" | "typing" => Ok(Self::TypeAnswer),
            _ => Err(ModeParseError {
                kind: "answer mode",
                raw: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for StudyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StudyDirection::SourceToTarget => "source-to-target",
            StudyDirection::TargetToSource => "target-to-source",
            StudyDirection::RandomPerCard => "random-per-card",
        };
        f.write_str(label)
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerMode::Reveal => f.write_str("reveal"),
            AnswerMode::TypeAnswer => f.write_str("type-answer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fixed_directions_ignore_rng() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(
                StudyDirection::TargetToSource.resolve(&mut rng),
                Direction::TargetToSource
            );
        }
    }

    #[test]
    fn random_per_card_produces_both_directions() {
        let mut rng = StdRng::seed_from_u64(42);
        let resolved: Vec<_> = (0..64)
            .map(|_| StudyDirection::RandomPerCard.resolve(&mut rng))
            .collect();
        assert!(resolved.contains(&Direction::SourceToTarget));
        assert!(resolved.contains(&Direction::TargetToSource));
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("mix".parse::<StudyDirection>().unwrap(), StudyDirection::RandomPerCard);
        assert_eq!("typing".parse::<AnswerMode>().unwrap(), AnswerMode::TypeAnswer);
        assert!("sideways".parse::<StudyDirection>().is_err());
    }
}
