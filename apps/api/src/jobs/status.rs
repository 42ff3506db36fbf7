//! In-process lifecycle tracking for background job searches.
//!
//! One entry per client correlation id, written by exactly one orchestrator
//! task and read by at most one notification channel. Entries are never
//! evicted; growth is bounded by process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::warn;

/// Lifecycle state of one background job search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatusEntry {
    pub state: JobState,
    pub message: String,
}

/// Mapping from correlation id to job lifecycle state, shared between the
/// request path, the scrape orchestrator, and the notification channel.
///
/// Transitions are monotone: `pending → completed` or `pending → failed`,
/// never reversed. A write against a terminal entry is logged and ignored.
#[derive(Clone, Default)]
pub struct JobStatusTracker {
    entries: Arc<RwLock<HashMap<String, JobStatusEntry>>>,
}

impl JobStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create: registers `client_id` as pending and returns the entry.
    /// Call sites that only observe state must use [`get`](Self::get) instead.
    pub fn register(&self, client_id: &str, message: &str) -> JobStatusEntry {
        let mut entries = self.entries.write().unwrap();
        entries
            .entry(client_id.to_string())
            .or_insert_with(|| JobStatusEntry {
                state: JobState::Pending,
                message: message.to_string(),
            })
            .clone()
    }

    /// Read-only lookup. Never creates an entry.
    pub fn get(&self, client_id: &str) -> Option<JobStatusEntry> {
        self.entries.read().unwrap().get(client_id).cloned()
    }

    pub fn complete(&self, client_id: &str, message: &str) {
        self.transition(client_id, JobState::Completed, message);
    }

    pub fn fail(&self, client_id: &str, message: &str) {
        self.transition(client_id, JobState::Failed, message);
    }

    fn transition(&self, client_id: &str, state: JobState, message: &str) {
        let mut entries = self.entries.write().unwrap();
        let entry = entries
            .entry(client_id.to_string())
            .or_insert_with(|| JobStatusEntry {
                state: JobState::Pending,
                message: String::new(),
            });
        if entry.state.is_terminal() {
            warn!(
                client_id,
                current = ?entry.state,
                rejected = ?state,
                "ignoring status write after terminal state"
            );
            return;
        }
        entry.state = state;
        entry.message = message.to_string();
    }
}
