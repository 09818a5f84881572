//! Pipeline states and in-flight request tracking

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Stage of the serialized append → layout → commit pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    #[default]
    Idle,
    /// Topic submitted or node expanded; a batch of siblings is pending
    AppendingBulk,
    /// One chat-proposed concept is pending attachment
    AppendingSingle,
    LayingOut,
    Committing,
}

impl OrchestratorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AppendingBulk => "appending_bulk",
            Self::AppendingSingle => "appending_single",
            Self::LayingOut => "laying_out",
            Self::Committing => "committing",
        }
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-flight key for a bulk expansion of `node_id`
pub(crate) fn expand_key(node_id: &str) -> String {
    format!("expand:{}", node_id)
}

/// In-flight key for chat-driven insertions
pub(crate) const CHAT_KEY: &str = "chat";

/// Pending external requests, counted per context key
#[derive(Default)]
pub(crate) struct InFlightRegistry {
    pending: Mutex<HashMap<String, usize>>,
}

impl InFlightRegistry {
    /// Register a request. With `exclusive`, returns `None` while another
    /// request for the same key is pending.
    pub(crate) fn enter(&self, key: &str, exclusive: bool) -> Option<InFlightGuard<'_>> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let count = pending.entry(key.to_string()).or_insert(0);
        if exclusive && *count > 0 {
            return None;
        }
        *count += 1;
        Some(InFlightGuard {
            registry: self,
            key: key.to_string(),
        })
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

/// Deregisters its request when dropped
pub(crate) struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self
            .registry
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = pending.get_mut(&self.key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                pending.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_entry_rejects_second_request() {
        let registry = InFlightRegistry::default();
        let first = registry.enter("chat", true);
        assert!(first.is_some());
        assert!(registry.enter("chat", true).is_none());
        assert!(registry.enter("expand:a", true).is_some());

        drop(first);
        assert!(!registry.contains("chat"));
        assert!(registry.enter("chat", true).is_some());
    }

    #[test]
    fn test_shared_entry_counts_requests() {
        let registry = InFlightRegistry::default();
        let a = registry.enter("expand:n", false);
        let b = registry.enter("expand:n", false);
        assert!(a.is_some() && b.is_some());

        drop(a);
        assert!(registry.contains("expand:n"));
        drop(b);
        assert!(!registry.contains("expand:n"));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(OrchestratorState::LayingOut.to_string(), "laying_out");
        assert_eq!(OrchestratorState::default(), OrchestratorState::Idle);
    }
}
