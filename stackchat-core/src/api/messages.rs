use reqwest::Method;
use tracing::debug;

use super::client::ApiClient;
use super::endpoints;
use crate::error::{StackchatError, StackchatResult};
use crate::models::{Message, NewMessage};

impl ApiClient {
    /// Messages of a chat in the order the backend returns them.
    pub async fn list_messages(&self, chat_id: i64) -> StackchatResult<Vec<Message>> {
        let request = self
            .authorized(Method::GET, &endpoints::message_list(chat_id))
            .await?;
        let messages: Vec<Message> = self.call("List messages", request, true).await?;
        debug!(chat_id = chat_id, count = messages.len(), "Messages listed");
        Ok(messages)
    }

    pub async fn create_message(
        &self,
        chat_id: i64,
        text: &str,
        is_user: bool,
    ) -> StackchatResult<Message> {
        let request = self
            .authorized(Method::POST, &endpoints::message_create(chat_id))
            .await?
            .json(&NewMessage {
                chat_id,
                text,
                is_user,
            });
        self.call("Create message", request, true).await
    }

    /// Ask the answer service. The result is the raw answer text, which may
    /// itself be a JSON envelope with `response` and `references`.
    pub async fn get_answer(&self, prompt: &str) -> StackchatResult<String> {
        if prompt.trim().is_empty() {
            return Err(StackchatError::EmptyPrompt);
        }

        let request = self
            .authorized(Method::POST, endpoints::SEARCH_INFORMATION)
            .await?
            .json(&serde_json::json!({ "prompt": prompt }));
        let value: serde_json::Value = self.call("Get answer", request, true).await?;

        Ok(match value {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        })
    }
}
