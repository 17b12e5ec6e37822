//! Client-held session state: the bearer token pair and the id of the last
//! training task. The session is owned by the API client and written through
//! to a [`SessionStore`] on every change.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{StackchatError, StackchatResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<SessionTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(tokens: SessionTokens) -> Self {
        Self {
            tokens: Some(tokens),
            task_id: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn access_token(&self) -> StackchatResult<&str> {
        self.tokens
            .as_ref()
            .map(|t| t.access.as_str())
            .ok_or(StackchatError::NotAuthenticated)
    }

    pub fn refresh_token(&self) -> StackchatResult<&str> {
        self.tokens
            .as_ref()
            .map(|t| t.refresh.as_str())
            .ok_or(StackchatError::NotAuthenticated)
    }

    pub fn task_id(&self) -> StackchatResult<&str> {
        self.task_id.as_deref().ok_or(StackchatError::MissingTaskId)
    }

    pub fn clear(&mut self) {
        self.tokens = None;
        self.task_id = None;
    }
}

/// Persistence for the session between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> StackchatResult<Session>;
    fn save(&self, session: &Session) -> StackchatResult<()>;
    fn clear(&self) -> StackchatResult<()>;
}

/// JSON file store. A missing file loads as an anonymous session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> StackchatResult<Session> {
        if !self.path.exists() {
            return Ok(Session::anonymous());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Session::anonymous());
        }
        serde_json::from_str(&raw).map_err(|e| {
            StackchatError::SessionStore(format!(
                "Corrupt session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, session: &Session) -> StackchatResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(session)?;

        // Holds bearer tokens: owner read/write only.
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(raw.as_bytes())?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> StackchatResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and embedders.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> StackchatResult<Session> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &Session) -> StackchatResult<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| StackchatError::SessionStore("session lock poisoned".to_string()))?;
        *guard = session.clone();
        Ok(())
    }

    fn clear(&self) -> StackchatResult<()> {
        self.save(&Session::anonymous())
    }
}
