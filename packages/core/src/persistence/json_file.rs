//! Flat-file session store
//!
//! All sessions live in a single pretty-printed JSON array. A missing file
//! reads as an empty list; the parent directory is created on first write.
//! Each mutation rewrites the whole file under an async mutex.

use super::{upsert_into, PersistenceError, SessionStore};
use crate::config::SessionStoreConfig;
use crate::models::{Session, SessionMetadata};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct JsonFileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Open the store at the configured (or default) location
    pub fn from_config(config: &SessionStoreConfig) -> Result<Self, PersistenceError> {
        Ok(Self::new(config.resolve_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Session>, PersistenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, sessions: &[Session]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(sessions)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!(
            "Wrote {} sessions to {}",
            sessions.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn list(&self) -> Result<Vec<SessionMetadata>, PersistenceError> {
        let sessions = self.read_all().await?;
        Ok(sessions.iter().map(Session::metadata).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>, PersistenceError> {
        let sessions = self.read_all().await?;
        Ok(sessions.into_iter().find(|s| s.id == id))
    }

    async fn upsert(&self, session: Session) -> Result<Session, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.read_all().await?;
        let stored = upsert_into(&mut sessions, session)?;
        self.write_all(&sessions).await?;
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.read_all().await?;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Ok(false);
        }
        self.write_all(&sessions).await?;
        Ok(true)
    }
}
