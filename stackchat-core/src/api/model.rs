use reqwest::Method;
use tracing::{debug, info};

use super::client::ApiClient;
use super::endpoints;
use crate::error::StackchatResult;
use crate::models::{TrainResponse, TrainingStatus};

impl ApiClient {
    /// Start the ingestion/indexing task. Returns `false` when the backend
    /// answered without a task id, in which case nothing is stored.
    pub async fn train_model(&self) -> StackchatResult<bool> {
        let request = self.authorized(Method::POST, endpoints::TRAIN_MODEL).await?;
        let response: TrainResponse = self.call("Train model", request, true).await?;

        match response.task_id {
            Some(task_id) => {
                info!(task_id = %task_id, "Training started");
                self.update_session(move |session| session.task_id = Some(task_id))
                    .await?;
                Ok(true)
            }
            None => {
                debug!(message = ?response.message, "Training request was a no-op");
                Ok(false)
            }
        }
    }

    pub async fn monitor_training(&self) -> StackchatResult<TrainingStatus> {
        let task_id = self.stored_task_id().await?;

        let request = self
            .authorized(Method::POST, endpoints::MONITOR_TRAINING)
            .await?
            .json(&serde_json::json!({ "task_id": task_id }));
        self.call("Monitor training", request, true).await
    }
}
