use anyhow::Result;
use stackchat_core::{
    ApiClient, FileSessionStore, MemorySessionStore, SessionStore, StackchatConfig, StackchatError,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs: the resolved configuration and a client whose
/// session is backed by the on-disk session file.
pub struct CliContext {
    pub config: StackchatConfig,
    pub client: Arc<ApiClient>,
    pub session_path: Option<PathBuf>,
}

impl CliContext {
    pub fn load(api_url: Option<&str>) -> Result<Self> {
        let mut config = StackchatConfig::load().map_err(StackchatError::from)?;

        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
            config.validate().map_err(StackchatError::from)?;
        }

        Self::from_config(config)
    }

    pub fn from_config(config: StackchatConfig) -> Result<Self> {
        let session_path = config.session_path();
        let store: Arc<dyn SessionStore> = match &session_path {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => {
                tracing::warn!("No data directory; the session will not outlive this command");
                Arc::new(MemorySessionStore::new())
            }
        };

        let client = ApiClient::new(&config.api, store)?;

        Ok(Self {
            config,
            client: Arc::new(client),
            session_path,
        })
    }

    pub fn datetime_format(&self) -> &str {
        &self.config.display.datetime_format
    }
}
