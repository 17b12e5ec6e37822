use serde::{Deserialize, Deserializer, Serialize};

/// Celery task state as reported by the monitor endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Started,
    Retry,
    Success,
    Failure,
    Revoked,
    Other(String),
}

impl TaskState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => TaskState::Pending,
            "STARTED" | "PROGRESS" => TaskState::Started,
            "RETRY" => TaskState::Retry,
            "SUCCESS" => TaskState::Success,
            "FAILURE" => TaskState::Failure,
            "REVOKED" => TaskState::Revoked,
            _ => TaskState::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Pending => "PENDING",
            TaskState::Started => "STARTED",
            TaskState::Retry => "RETRY",
            TaskState::Success => "SUCCESS",
            TaskState::Failure => "FAILURE",
            TaskState::Revoked => "REVOKED",
            TaskState::Other(s) => s,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TaskState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TaskState::parse(&raw))
    }
}

/// Response of the monitor-training endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: TaskState,
    #[serde(default, deserialize_with = "deserialize_result")]
    pub result: Option<String>,
}

/// `result` is usually the progress phrase but carries the exception text
/// (or any JSON value) on failure.
fn deserialize_result<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Known progress phrases reported by the indexing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStage {
    Starting,
    Downloading,
    LoadingDatabase,
    BuildingEmbeddings,
    IndexReady,
}

impl TrainingStage {
    pub const ALL: [TrainingStage; 5] = [
        TrainingStage::Starting,
        TrainingStage::Downloading,
        TrainingStage::LoadingDatabase,
        TrainingStage::BuildingEmbeddings,
        TrainingStage::IndexReady,
    ];

    pub fn phrase(&self) -> &'static str {
        match self {
            TrainingStage::Starting => "Starting",
            TrainingStage::Downloading => "Downloading data from HuggingFace",
            TrainingStage::LoadingDatabase => "Setting data on Postgre database",
            TrainingStage::BuildingEmbeddings => "Creating embeddings and vector base",
            TrainingStage::IndexReady => "Creating FAISS vector base success",
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            TrainingStage::Starting => 0,
            TrainingStage::Downloading => 25,
            TrainingStage::LoadingDatabase => 50,
            TrainingStage::BuildingEmbeddings => 75,
            TrainingStage::IndexReady => 100,
        }
    }

    /// Exact match only.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.phrase() == phrase)
    }
}

/// Progress for a reported phrase, or `None` when the phrase is unknown.
pub fn progress_for(result: &str) -> Option<u8> {
    TrainingStage::from_phrase(result).map(|s| s.percent())
}

/// Body of a successful train request.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrainResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_task_id")]
    pub task_id: Option<String>,
}

fn deserialize_task_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
