use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{ApiConfig, LoginField};
use crate::error::{StackchatError, StackchatResult};
use crate::session::{MemorySessionStore, Session, SessionStore};

/// HTTP client for the chat backend. Owns the session and keeps the
/// session store in sync with it.
pub struct ApiClient {
    http: Client,
    base_url: String,
    login_field: LoginField,
    session: RwLock<Session>,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, store: Arc<dyn SessionStore>) -> StackchatResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| StackchatError::Internal(format!("HTTP client: {}", e)))?;

        let session = store.load()?;
        debug!(
            base_url = %config.base_url,
            authenticated = session.is_authenticated(),
            "API client ready"
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login_field: config.login_field,
            session: RwLock::new(session),
            store,
        })
    }

    /// Client whose session lives only in memory.
    pub fn in_memory(config: &ApiConfig) -> StackchatResult<Self> {
        Self::new(config, Arc::new(MemorySessionStore::new()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn login_field(&self) -> LoginField {
        self.login_field
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Apply `change` to the session and write the result to the store.
    pub(crate) async fn update_session<F>(&self, change: F) -> StackchatResult<()>
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self.session.write().await;
        change(&mut guard);
        if guard.is_authenticated() || guard.task_id.is_some() {
            self.store.save(&guard)
        } else {
            self.store.clear()
        }
    }

    pub(crate) async fn access_token(&self) -> StackchatResult<String> {
        let guard = self.session.read().await;
        guard.access_token().map(str::to_string).map_err(|e| {
            e.log();
            e
        })
    }

    /// Task id of the last training run; requires a logged-in session.
    pub(crate) async fn stored_task_id(&self) -> StackchatResult<String> {
        let guard = self.session.read().await;
        let result = guard
            .access_token()
            .and_then(|_| guard.task_id())
            .map(str::to_string);
        if let Err(e) = &result {
            e.log();
        }
        result
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(method = %method, path = path, "Backend request");
        self.http.request(method, self.url(path))
    }

    /// Bearer-authenticated request. Fails before anything is sent when the
    /// session holds no token.
    pub(crate) async fn authorized(
        &self,
        method: Method,
        path: &str,
    ) -> StackchatResult<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self
            .request(method, path)
            .header("Authorization", format!("Bearer {}", token)))
    }

    pub(crate) async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> StackchatResult<Response> {
        match request.send().await {
            Ok(response) => Ok(response),
            Err(e) => {
                let err = StackchatError::from(e);
                debug!(operation = operation, "Transport failure");
                err.log();
                Err(err)
            }
        }
    }

    /// Turn a non-2xx response into the operation's error.
    pub(crate) async fn ensure_success(
        &self,
        operation: &'static str,
        response: Response,
        authenticated: bool,
    ) -> StackchatResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = if authenticated
            && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
        {
            StackchatError::SessionExpired { operation }
        } else {
            StackchatError::ApiRequestFailed {
                operation,
                status: status.as_u16(),
                detail: error_detail(&body),
            }
        };
        err.log();
        Err(err)
    }

    pub(crate) async fn decode<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        response: Response,
    ) -> StackchatResult<T> {
        let body = response.text().await.map_err(StackchatError::from)?;
        serde_json::from_str(&body).map_err(|e| {
            let err = StackchatError::ApiParseError(format!("{}: {}", operation, e));
            err.log();
            err
        })
    }

    /// Send, check status, decode.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        authenticated: bool,
    ) -> StackchatResult<T> {
        let response = self.send(operation, request).await?;
        let response = self.ensure_success(operation, response, authenticated).await?;
        self.decode(operation, response).await
    }

    /// Send and check status, ignoring the body.
    pub(crate) async fn call_empty(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        authenticated: bool,
    ) -> StackchatResult<()> {
        let response = self.send(operation, request).await?;
        self.ensure_success(operation, response, authenticated)
            .await
            .map(|_| ())
    }

    /// Like [`call_empty`](Self::call_empty) but returns the server's
    /// `message` field when one is present.
    pub(crate) async fn call_message(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        authenticated: bool,
    ) -> StackchatResult<Option<String>> {
        let response = self.send(operation, request).await?;
        let response = self.ensure_success(operation, response, authenticated).await?;
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<ServerMessage>(&body)
            .ok()
            .and_then(|m| m.message))
    }
}

#[derive(Debug, Deserialize)]
struct ServerMessage {
    #[serde(default)]
    message: Option<String>,
}

/// Pull a human-readable reason out of an error body. The backend uses
/// `{"error": ...}`, `{"detail": ...}` or `{"error on <op>": ...}`.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() || trimmed.starts_with('<') {
                return None;
            }
            return Some(trimmed.chars().take(200).collect());
        }
    };

    let object = value.as_object()?;
    let field = ["error", "detail", "message"]
        .iter()
        .find_map(|key| object.get(*key))
        .or_else(|| {
            object
                .iter()
                .find(|(k, _)| k.starts_with("error"))
                .map(|(_, v)| v)
        })?;

    Some(match field {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
