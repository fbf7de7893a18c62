//! Per-session conversation history
//!
//! An append-only, in-memory log of question/answer exchanges. Each session
//! owns its log exclusively; nothing survives process restart.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::Result;

/// Fixed filename offered for history downloads
pub const DOWNLOAD_FILE_NAME: &str = "voice_bot_history.json";

/// Timestamp format for history entries (second granularity)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded question/answer exchange
///
/// Entries are never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Transcribed question
    pub question: String,

    /// Generated answer
    pub answer: String,

    /// Local time the exchange was recorded
    pub timestamp: String,
}

/// Append-only log of exchanges for one session
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Create an empty log
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record an exchange, stamping it with the current local time
    pub fn append(&mut self, question: String, answer: String) -> &HistoryEntry {
        let entry = HistoryEntry {
            question,
            answer,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        self.entries.push(entry);
        self.entries.last().expect("entry was just pushed")
    }

    /// Entries in insertion order
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of recorded exchanges
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the full log as indented JSON for download
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

/// One user session: an id and its exclusively-owned history log
///
/// The log mutex also serializes pipeline invocations: the gateway holds it
/// for a whole invocation, so one upload per session is processed at a time.
#[derive(Debug)]
pub struct Session {
    /// Session identifier
    pub id: String,

    /// The session's history log
    pub log: Mutex<HistoryLog>,
}

/// Registry of live sessions
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<Session>>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a session by id, or create a fresh one when `id` is absent
    /// or unknown
    pub async fn get_or_create(&self, id: Option<&str>) -> Arc<Session> {
        if let Some(id) = id {
            if let Some(session) = self.inner.read().await.get(id) {
                return Arc::clone(session);
            }
        }

        let id = id.map_or_else(|| uuid::Uuid::new_v4().to_string(), ToString::to_string);
        let session = Arc::new(Session {
            id: id.clone(),
            log: Mutex::new(HistoryLog::new()),
        });

        let mut sessions = self.inner.write().await;
        let entry = sessions.entry(id).or_insert(session);
        tracing::debug!(session = %entry.id, "session opened");
        Arc::clone(entry)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether no sessions are live
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_insertion_order() {
        let mut log = HistoryLog::new();
        log.append("q1".to_string(), "a1".to_string());
        log.append("q2".to_string(), "a2".to_string());
        log.append("q3".to_string(), "a3".to_string());

        assert_eq!(log.len(), 3);
        let questions: Vec<&str> = log.entries().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["q1", "q2", "q3"]);
    }

    #[test]
    fn serialized_log_roundtrips() {
        let mut log = HistoryLog::new();
        log.append("what is your superpower?".to_string(), "Deep focus.".to_string());
        log.append("how do you grow?".to_string(), "Outside my comfort zone.".to_string());

        let json = log.to_json().unwrap();
        let parsed: Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, log.entries());
    }

    #[test]
    fn timestamps_have_second_granularity() {
        let mut log = HistoryLog::new();
        let entry = log.append("q".to_string(), "a".to_string());
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(entry.timestamp.len(), 19);
        assert_eq!(entry.timestamp.as_bytes()[10], b' ');
    }

    #[tokio::test]
    async fn registry_returns_same_session_for_same_id() {
        let registry = SessionRegistry::new();
        let first = registry.get_or_create(None).await;
        let again = registry.get_or_create(Some(&first.id)).await;

        assert_eq!(first.id, again.id);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn registry_creates_distinct_sessions() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create(None).await;
        let b = registry.get_or_create(None).await;

        assert_ne!(a.id, b.id);
        assert_eq!(registry.len().await, 2);
    }
}
