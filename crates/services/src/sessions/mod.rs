mod persistence;
mod progress;
mod service;
mod timer;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use persistence::{COMPLETED_KEY, ResumeInfo, SESSION_KEY, SessionStore};
pub use progress::SessionProgress;
pub use service::{HISTORY_CAPACITY, SessionService};
pub use timer::{ElapsedTimer, format_elapsed};
pub use workflow::{SessionAnswerResult, SessionLoopService, StartOptions};
