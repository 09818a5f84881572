//! Session Persistence
//!
//! Whole-snapshot storage of mind maps. There is no partial persistence:
//! every save hands the store a complete `Session`, every restore gets one
//! back.
//!
//! Two backends share the same upsert rules:
//!
//! - `MemorySessionStore` for tests and throwaway sessions
//! - `JsonFileSessionStore` keeping every session in one JSON array file

mod error;
mod json_file;

pub use error::PersistenceError;
pub use json_file::JsonFileSessionStore;

use crate::models::{Session, SessionMetadata};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Metadata of every stored session, most recently created first
    async fn list(&self) -> Result<Vec<SessionMetadata>, PersistenceError>;

    async fn get(&self, id: &str) -> Result<Option<Session>, PersistenceError>;

    /// Insert or replace a session keyed by id.
    ///
    /// Returns the session as stored, with its timestamps assigned.
    async fn upsert(&self, session: Session) -> Result<Session, PersistenceError>;

    /// Returns `false` when no session had this id
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;
}

/// Apply one upsert to an in-order session list.
///
/// New sessions go to the front with both timestamps set to now. Existing
/// sessions are replaced in place, keep their `created_at`, and get a fresh
/// `updated_at`.
pub(crate) fn upsert_into(
    sessions: &mut Vec<Session>,
    mut session: Session,
) -> Result<Session, PersistenceError> {
    if session.id.trim().is_empty() {
        return Err(PersistenceError::missing_field("id"));
    }
    if session.title.trim().is_empty() {
        return Err(PersistenceError::missing_field("title"));
    }

    let now = Utc::now();
    session.updated_at = now;

    match sessions.iter().position(|s| s.id == session.id) {
        Some(index) => {
            session.created_at = sessions[index].created_at;
            sessions[index] = session.clone();
        }
        None => {
            session.created_at = now;
            sessions.insert(0, session.clone());
        }
    }

    Ok(session)
}

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<Vec<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn list(&self) -> Result<Vec<SessionMetadata>, PersistenceError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.iter().map(Session::metadata).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>, PersistenceError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn upsert(&self, session: Session) -> Result<Session, PersistenceError> {
        let mut sessions = self.sessions.write().await;
        upsert_into(&mut sessions, session)
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        Ok(sessions.len() < before)
    }
}
