use crate::models::conversation::{last_turns, HistoryEntry};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Turns kept per session; reads never look further back than this.
const MAX_STORED_TURNS: usize = 10;

struct SessionHistory {
    entries: Vec<HistoryEntry>,
    last_seen: DateTime<Utc>,
}

/// Server-side conversation history keyed by session id.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHistory>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            lifetime,
        }
    }

    /// The last `n` turns of the session, oldest first.
    pub fn recent(&self, session_id: &str, n: usize) -> Vec<HistoryEntry> {
        let sessions = match self.sessions.lock() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions
            .get(session_id)
            .map(|session| last_turns(&session.entries, n).to_vec())
            .unwrap_or_default()
    }

    pub fn append(&self, session_id: &str, entry: HistoryEntry) {
        let now = Utc::now();
        let mut sessions = match self.sessions.lock() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        };

        let lifetime = self.lifetime;
        sessions.retain(|_, session| now - session.last_seen < lifetime);

        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionHistory {
                entries: Vec::new(),
                last_seen: now,
            });
        session.entries.push(entry);
        session.last_seen = now;

        let excess = session.entries.len().saturating_sub(MAX_STORED_TURNS);
        session.entries.drain(..excess);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::days(31))
    }
}
