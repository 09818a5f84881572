//! Engine configuration

use crate::layout::LayoutConfig;
use crate::store::DEFAULT_EVENT_CHANNEL_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name for the flat-file session store
pub const DEFAULT_SESSIONS_FILE: &str = "sessions.json";

/// What to do when a second append arrives for a context that already has
/// one pending (`expand:{node_id}` or `chat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlightPolicy {
    /// Fail the second request with `AppendInFlight`
    #[default]
    Reject,
    /// Let both run; rapid double triggers may add duplicate siblings
    Independent,
}

/// Configuration for the mutation orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub in_flight_policy: InFlightPolicy,
    /// Enrichment calls slower than this count as failed
    pub enrichment_timeout_secs: u64,
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            in_flight_policy: InFlightPolicy::default(),
            enrichment_timeout_secs: 60,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.layout.validate()?;

        if self.enrichment_timeout_secs == 0 {
            return Err("enrichment_timeout_secs must be greater than 0".to_string());
        }

        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Where the flat-file session store keeps its data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStoreConfig {
    /// Explicit file path; defaults to `~/.mindgraph/sessions.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SessionStoreConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Resolve the session file path.
    ///
    /// Uses the explicit path when set, otherwise the shared data directory:
    /// - macOS/Linux: ~/.mindgraph/sessions.json
    /// - Windows: %USERPROFILE%\.mindgraph\sessions.json
    pub fn resolve_path(&self) -> Result<PathBuf, std::io::Error> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let home_dir = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine home directory",
            )
        })?;

        Ok(home_dir.join(".mindgraph").join(DEFAULT_SESSIONS_FILE))
    }
}
