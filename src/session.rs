//! Session Store
//!
//! Persists the bearer token obtained at login so later console commands
//! can create reference records. The token lives in `session.json` under
//! the user configuration directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Session store errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No configuration directory available")]
    NoConfigDir,
}

/// A stored login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub username: String,
    pub saved_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn new(username: impl Into<String>, token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type: token_type.into(),
            username: username.into(),
            saved_at: Utc::now(),
        }
    }
}

/// File-backed token store
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/epiwatch/session.json`
    pub fn default_location() -> Result<Self, SessionError> {
        let dir = dirs::config_dir().ok_or(SessionError::NoConfigDir)?;
        Ok(Self::new(dir.join("epiwatch").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session; `None` when nobody is logged in
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the stored session. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);

        let session = Session::new("admin", "tok-123", "bearer");
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(matches!(store.load(), Err(SessionError::Serialization(_))));
    }
}
