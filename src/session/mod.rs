pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

/// Authenticated actor: opaque bearer credential plus minimal identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub role: String,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>, role: impl Into<String>, role_id: i64) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            role: role.into(),
            role_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("HOME environment variable not set and no config directory configured")]
    NoConfigDir,

    #[error("Session storage lock poisoned")]
    Poisoned,
}

/// Handle to the single active session of this client context.
///
/// Cloning shares the same session; it is passed explicitly to whatever
/// needs credentials instead of living in a global.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    current: RwLock<Option<Session>>,
    store: Arc<dyn SessionStore>,
}

impl SessionHandle {
    /// Empty handle backed by `store`; nothing is loaded
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                current: RwLock::new(None),
                store,
            }),
        }
    }

    /// Handle seeded from whatever the store has persisted
    pub async fn restore(store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        let persisted = store.load().await?;
        if let Some(session) = &persisted {
            tracing::debug!("Restored session for user '{}'", session.user_id);
        }

        Ok(Self {
            inner: Arc::new(SessionInner {
                current: RwLock::new(persisted),
                store,
            }),
        })
    }

    /// Handle with an in-memory store and no session
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Start a session (login). Replaces any session already active.
    pub async fn begin(&self, session: Session) -> Result<(), SessionError> {
        let mut current = self.inner.current.write().await;
        self.inner.store.save(&session).await?;

        if let Some(previous) = current.as_ref() {
            tracing::debug!("Replacing session for user '{}'", previous.user_id);
        }
        tracing::info!("Session started for user '{}' (role {})", session.user_id, session.role);
        *current = Some(session);
        Ok(())
    }

    /// Destroy the session (logout or authentication failure).
    ///
    /// Memory is cleared before the store is touched. Returns whether a
    /// session was active.
    pub async fn end(&self) -> Result<bool, SessionError> {
        let mut current = self.inner.current.write().await;
        self.erase(&mut current).await
    }

    /// End the session only if it still holds `token`, the credential a
    /// rejected request was sent with (`None` when it went out anonymous).
    ///
    /// Returns `Ok(false)` without touching anything when a newer session
    /// has taken its place in the meantime.
    pub async fn end_if_current(&self, token: Option<&str>) -> Result<bool, SessionError> {
        let mut current = self.inner.current.write().await;
        if current.as_ref().map(|s| s.token.as_str()) != token {
            tracing::debug!("Session changed since the rejected request; keeping it");
            return Ok(false);
        }
        self.erase(&mut current).await?;
        Ok(true)
    }

    // Runs under the write lock so a concurrent begin cannot interleave with the store
    async fn erase(&self, current: &mut Option<Session>) -> Result<bool, SessionError> {
        let previous = current.take();

        if let Err(e) = self.inner.store.clear().await {
            tracing::error!("Failed to clear persisted session: {}", e);
            return Err(e);
        }

        if let Some(session) = &previous {
            tracing::info!("Session ended for user '{}'", session.user_id);
        }
        Ok(previous.is_some())
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.current.read().await.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.current.read().await.is_some()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").finish_non_exhaustive()
    }
}
