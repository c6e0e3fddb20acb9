mod entry;
mod modes;
mod session;

pub use entry::{Entry, EntryError, Examples};
pub use modes::{AnswerMode, Direction, ModeParseError, StudyDirection};
pub use session::{Intent, MASTERY_STREAK_TARGET, Phase, RunLabels, Session, SessionStateError};
