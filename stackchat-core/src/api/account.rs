use reqwest::Method;
use tracing::info;

use super::client::ApiClient;
use super::endpoints;
use crate::error::StackchatResult;
use crate::models::{User, UserUpdate};
use crate::session::Session;

impl ApiClient {
    pub async fn read_user(&self) -> StackchatResult<User> {
        let request = self.authorized(Method::GET, endpoints::USER_READ).await?;
        self.call("Read user", request, true).await
    }

    pub async fn update_user(&self, update: &UserUpdate) -> StackchatResult<String> {
        update.validate()?;

        let request = self
            .authorized(Method::PUT, endpoints::USER_UPDATE)
            .await?
            .json(update);
        let message = self.call_message("Update user", request, true).await?;
        info!("Account updated");
        Ok(message.unwrap_or_else(|| "User updated successfully".to_string()))
    }

    /// Delete the account; the session ends with it.
    pub async fn delete_user(&self) -> StackchatResult<()> {
        let request = self.authorized(Method::DELETE, endpoints::USER_DELETE).await?;
        self.call_empty("Delete user", request, true).await?;
        self.update_session(Session::clear).await?;
        info!("Account deleted");
        Ok(())
    }
}
