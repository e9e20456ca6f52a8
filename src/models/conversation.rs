use serde::{Deserialize, Serialize};

/// One destination-chat turn as stored in the session history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    pub user: String,
    pub bot: String,
}

impl HistoryEntry {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}

/// Returns at most the last `n` entries of `history`.
pub fn last_turns(history: &[HistoryEntry], n: usize) -> &[HistoryEntry] {
    &history[history.len().saturating_sub(n)..]
}
