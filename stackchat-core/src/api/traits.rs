use async_trait::async_trait;

use super::client::ApiClient;
use crate::error::StackchatResult;
use crate::models::{Message, TrainingStatus};

/// The backend calls the message send flow depends on.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_messages(&self, chat_id: i64) -> StackchatResult<Vec<Message>>;

    async fn create_message(
        &self,
        chat_id: i64,
        text: &str,
        is_user: bool,
    ) -> StackchatResult<Message>;

    async fn get_answer(&self, prompt: &str) -> StackchatResult<String>;
}

/// The single call the training poller makes on every tick.
#[async_trait]
pub trait TrainingMonitor: Send + Sync {
    async fn monitor_training(&self) -> StackchatResult<TrainingStatus>;
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn list_messages(&self, chat_id: i64) -> StackchatResult<Vec<Message>> {
        ApiClient::list_messages(self, chat_id).await
    }

    async fn create_message(
        &self,
        chat_id: i64,
        text: &str,
        is_user: bool,
    ) -> StackchatResult<Message> {
        ApiClient::create_message(self, chat_id, text, is_user).await
    }

    async fn get_answer(&self, prompt: &str) -> StackchatResult<String> {
        ApiClient::get_answer(self, prompt).await
    }
}

#[async_trait]
impl TrainingMonitor for ApiClient {
    async fn monitor_training(&self) -> StackchatResult<TrainingStatus> {
        ApiClient::monitor_training(self).await
    }
}
