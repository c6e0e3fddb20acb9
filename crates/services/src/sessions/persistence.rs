//! Durable snapshot of the active session plus the completed-run registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::{KeyValueStore, StorageError};
use vocab_core::model::{Phase, RunLabels, Session, SessionStateError};

/// Key holding the serialized active session.
pub const SESSION_KEY: &str = "vocab_session_v2";
/// Key holding a JSON array of `"<collection>:<run>"` strings.
pub const COMPLETED_KEY: &str = "completed_sessions";

/// What a "continue where you left off" prompt needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeInfo {
    pub remaining: usize,
    pub phase: Phase,
    pub labels: RunLabels,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read the stored session.
    ///
    /// Read failures and undecodable snapshots both yield `None`; a corrupt
    /// snapshot is also removed so it is not offered again.
    pub async fn load(&self) -> Option<Session> {
        let raw = match self.kv.get(SESSION_KEY).await {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored session");
                return None;
            }
        };

        match decode(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable stored session");
                if let Err(err) = self.clear().await {
                    tracing::warn!(error = %err, "failed to remove unreadable session");
                }
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be encoded or written.
    pub async fn save(&self, session: &Session) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(SESSION_KEY, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(SESSION_KEY).await
    }

    /// Summary of the stored session when it can still be continued.
    pub async fn resume_info(&self) -> Option<ResumeInfo> {
        let session = self.load().await?;
        if session.is_complete() {
            return None;
        }
        Some(ResumeInfo {
            remaining: session.remaining(),
            phase: session.phase(),
            labels: session.labels().clone(),
            started_at: session.started_at(),
        })
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the registry cannot be read or decoded.
    pub async fn completed_keys(&self) -> Result<Vec<String>, StorageError> {
        match self.kv.get(COMPLETED_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the registry cannot be read.
    pub async fn is_completed(&self, collection: &str, run: &str) -> Result<bool, StorageError> {
        let key = format!("{collection}:{run}");
        Ok(self.completed_keys().await?.contains(&key))
    }

    /// Record a finished run. Returns `true` when a new key was added; runs
    /// without both labels are never recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the registry cannot be read or written.
    pub async fn mark_completed(&self, labels: &RunLabels) -> Result<bool, StorageError> {
        let Some(key) = labels.completion_key() else {
            return Ok(false);
        };

        let mut keys = self.completed_keys().await?;
        if keys.contains(&key) {
            return Ok(false);
        }
        keys.push(key);
        let raw =
            serde_json::to_string(&keys).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(COMPLETED_KEY, &raw).await?;
        Ok(true)
    }
}

fn decode(raw: &str) -> Result<Session, SessionStateError> {
    let session: Session =
        serde_json::from_str(raw).map_err(|e| SessionStateError::Corrupt(e.to_string()))?;
    session.validate()?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryStore;
    use vocab_core::model::{AnswerMode, Entry, Intent, StudyDirection};
    use vocab_core::time::fixed_now;

    fn session(labels: RunLabels) -> Session {
        let entries = vec![
            Entry::new("a", "", "1").unwrap(),
            Entry::new("b", "", "2").unwrap(),
        ];
        Session::start(
            entries,
            fixed_now(),
            StudyDirection::TargetToSource,
            AnswerMode::TypeAnswer,
            labels,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let kv = Arc::new(InMemoryStore::new());
        let store = SessionStore::new(kv);
        let s = session(RunLabels::default()).apply(Intent::Wrong).unwrap();
        store.save(&s).await.unwrap();
        assert_eq!(store.load().await, Some(s));
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_discarded() {
        let kv = Arc::new(InMemoryStore::new());
        kv.set(SESSION_KEY, "{not json").await.unwrap();
        let store = SessionStore::new(kv.clone());

        assert_eq!(store.load().await, None);
        assert_eq!(kv.get(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn resume_info_reports_remaining_work() {
        let store = SessionStore::new(Arc::new(InMemoryStore::new()));
        assert_eq!(store.resume_info().await, None);

        let labels = RunLabels::new(Some("504".into()), Some("3".into()));
        store.save(&session(labels.clone())).await.unwrap();
        let info = store.resume_info().await.unwrap();
        assert_eq!(info.remaining, 2);
        assert_eq!(info.phase, Phase::Assessment);
        assert_eq!(info.labels, labels);
        assert_eq!(info.started_at, fixed_now());
    }

    #[tokio::test]
    async fn completion_registry_deduplicates() {
        let store = SessionStore::new(Arc::new(InMemoryStore::new()));
        let labels = RunLabels::new(Some("504".into()), Some("1".into()));

        assert!(store.mark_completed(&labels).await.unwrap());
        assert!(!store.mark_completed(&labels).await.unwrap());
        assert!(!store.mark_completed(&RunLabels::default()).await.unwrap());

        assert_eq!(store.completed_keys().await.unwrap(), vec!["504:1".to_owned()]);
        assert!(store.is_completed("504", "1").await.unwrap());
        assert!(!store.is_completed("504", "2").await.unwrap());
    }
}
