use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};

use super::client::ApiClient;
use super::endpoints;
use crate::error::{StackchatError, StackchatResult};
use crate::models::NewUser;
use crate::session::{Session, SessionTokens};

#[derive(Debug, Deserialize)]
struct RefreshedToken {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

impl ApiClient {
    /// Exchange credentials for a token pair and store it in the session.
    pub async fn login(&self, identifier: &str, password: &str) -> StackchatResult<SessionTokens> {
        let mut payload = serde_json::Map::new();
        payload.insert(
            self.login_field().as_str().to_string(),
            serde_json::Value::String(identifier.to_string()),
        );
        payload.insert(
            "password".to_string(),
            serde_json::Value::String(password.to_string()),
        );

        let request = self
            .request(Method::POST, endpoints::LOGIN)
            .json(&serde_json::Value::Object(payload));
        let tokens: SessionTokens = self.call("Login", request, false).await?;

        let stored = tokens.clone();
        self.update_session(move |session| *session = Session::authenticated(stored))
            .await?;
        info!("Logged in");
        Ok(tokens)
    }

    /// Blacklist the refresh token and drop the local session.
    ///
    /// A rejected token also clears the local session, since it can no
    /// longer be used for anything.
    pub async fn logout(&self) -> StackchatResult<()> {
        let refresh = {
            let session = self.session().await;
            session.access_token().map_err(|e| {
                e.log();
                e
            })?;
            session.refresh_token()?.to_string()
        };

        let request = self
            .authorized(Method::POST, endpoints::LOGOUT)
            .await?
            .json(&serde_json::json!({ "refresh": refresh }));

        match self.call_empty("Logout", request, true).await {
            Ok(()) => {
                self.update_session(Session::clear).await?;
                info!("Logged out");
                Ok(())
            }
            Err(err @ StackchatError::SessionExpired { .. }) => {
                self.update_session(Session::clear).await?;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Drops the local session without contacting the backend.
    ///
    /// Used once the backend has already rejected the tokens.
    pub async fn forget_session(&self) -> StackchatResult<()> {
        self.update_session(Session::clear).await?;
        debug!("Local session cleared");
        Ok(())
    }

    /// Ask the backend for a fresh access token. Never called implicitly.
    pub async fn refresh_access_token(&self) -> StackchatResult<()> {
        let refresh = self.session().await.refresh_token()?.to_string();

        let request = self
            .request(Method::POST, endpoints::TOKEN_REFRESH)
            .json(&serde_json::json!({ "refresh": refresh }));
        let refreshed: RefreshedToken = self.call("Refresh token", request, false).await?;

        self.update_session(move |session| {
            if let Some(tokens) = session.tokens.as_mut() {
                tokens.access = refreshed.access;
                if let Some(rotated) = refreshed.refresh {
                    tokens.refresh = rotated;
                }
            }
        })
        .await?;
        info!("Access token refreshed");
        Ok(())
    }

    /// Create an account. Input is validated locally before anything is sent.
    pub async fn sign_up(&self, user: &NewUser) -> StackchatResult<String> {
        user.validate()?;

        let request = self.request(Method::POST, endpoints::USER_CREATE).json(user);
        let message = self.call_message("Sign up", request, false).await?;
        info!(email = %user.email, "Account created");
        Ok(message.unwrap_or_else(|| "User created successfully".to_string()))
    }
}
