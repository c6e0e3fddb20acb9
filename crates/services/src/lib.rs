#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod import;
pub mod manifest;
pub mod sessions;
pub mod speech;

pub use vocab_core::Clock;

pub use error::{ImportError, ManifestError, SessionError};
pub use export::{WrongLogExport, export_wrong_log};
pub use import::{Importer, SourceFormat, WorkbookReader};
pub use manifest::{CollectionEntry, CollectionFormat, CollectionManifest, RunSource};
pub use sessions::{
    ElapsedTimer, ResumeInfo, SessionAnswerResult, SessionLoopService, SessionProgress,
    SessionService, SessionStore, StartOptions,
};
pub use speech::{Speaker, SpeechPlayer, Utterance};
