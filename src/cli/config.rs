use std::sync::Arc;

use crate::config::ClientConfig;
use crate::http::{ApiClient, HeadlessNavigator};
use crate::session::{FileSessionStore, SessionHandle};

/// Everything a CLI command needs: config, the persisted session and a client using it
pub struct CliContext {
    pub config: ClientConfig,
    pub client: ApiClient,
}

impl CliContext {
    pub async fn from_env() -> anyhow::Result<Self> {
        Self::from_config(crate::config::config().clone()).await
    }

    pub async fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        let store = FileSessionStore::from_config(&config.session)?;
        tracing::debug!("Session file: {}", store.path().display());

        let session = SessionHandle::restore(Arc::new(store)).await?;

        // A terminal cannot be navigated; a 401 only clears the stored session
        let client = ApiClient::new(&config, session, Arc::new(HeadlessNavigator))?;

        Ok(Self { config, client })
    }

    pub fn session(&self) -> &SessionHandle {
        self.client.session()
    }
}
