use reqwest::{Method, StatusCode};
use tracing::{debug, info};

use super::client::ApiClient;
use super::endpoints;
use crate::error::{StackchatError, StackchatResult};
use crate::models::{sort_newest_first, Chat};

impl ApiClient {
    /// All chats of the user, newest first.
    pub async fn list_chats(&self) -> StackchatResult<Vec<Chat>> {
        let request = self.authorized(Method::GET, endpoints::CHAT_LIST).await?;
        let mut chats: Vec<Chat> = self.call("List chats", request, true).await?;
        sort_newest_first(&mut chats);
        debug!(count = chats.len(), "Chats listed");
        Ok(chats)
    }

    pub async fn create_chat(&self, name: &str) -> StackchatResult<Chat> {
        let name = name.trim();
        if name.is_empty() {
            let err = StackchatError::EmptyChatName;
            err.log();
            return Err(err);
        }

        let request = self
            .authorized(Method::POST, endpoints::CHAT_CREATE)
            .await?
            .json(&serde_json::json!({ "chat_name": name }));
        let chat: Chat = self.call("Create chat", request, true).await?;
        info!(chat_id = chat.id, "Chat created");
        Ok(chat)
    }

    /// Returns `false` when the chat no longer exists.
    pub async fn delete_chat(&self, chat_id: i64) -> StackchatResult<bool> {
        let request = self
            .authorized(Method::DELETE, &endpoints::chat_delete(chat_id))
            .await?;
        let response = self.send("Delete chat", request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(chat_id = chat_id, "Chat already gone");
            return Ok(false);
        }
        self.ensure_success("Delete chat", response, true).await?;
        info!(chat_id = chat_id, "Chat deleted");
        Ok(true)
    }
}
