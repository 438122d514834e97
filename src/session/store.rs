use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Session, SessionError};
use crate::config::SessionConfig;

/// Client-local persistence for the active session
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<Session>, SessionError>;
    async fn save(&self, session: &Session) -> Result<(), SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Session persisted as `session.json` inside the CLI config directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join("session.json"),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        Ok(Self::new(get_config_dir(config)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn get_config_dir(config: &SessionConfig) -> Result<PathBuf, SessionError> {
    let config_dir = match &config.config_dir {
        Some(dir) => dir.clone(),
        None => {
            let home = std::env::var("HOME").map_err(|_| SessionError::NoConfigDir)?;
            PathBuf::from(home).join(".config").join("workforce")
        }
    };

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.slot.lock().map(|s| s.clone()).unwrap_or(None)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.snapshot())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().map_err(|_| SessionError::Poisoned)?;
        *slot = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().map_err(|_| SessionError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("workforce_{}_{}", tag, uuid::Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn file_store_round_trips_and_clears() {
        let dir = temp_dir("store");
        let store = FileSessionStore::new(&dir);

        assert!(store.load().await.unwrap().is_none());

        let session = Session::new("tok-1", "u-42", "Admin", 1);
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        assert!(!store.path().exists());

        // clearing an absent file is not an error
        store.clear().await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn memory_store_clear_erases_identity() {
        let store = MemorySessionStore::with_session(Session::new("tok", "u-1", "HR", 3));
        assert!(store.snapshot().is_some());
        store.clear().await.unwrap();
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn config_dir_is_created_from_explicit_setting() {
        let dir = temp_dir("cfg");
        let config = SessionConfig {
            config_dir: Some(dir.clone()),
            ..SessionConfig::default()
        };
        let resolved = get_config_dir(&config).unwrap();
        assert_eq!(resolved, dir);
        assert!(dir.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
