use serde::Serialize;

use crate::models::{progress_for, TaskState, TrainingStatus};

/// What the database-setup screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingProgress {
    pub status_text: String,
    pub percent: u8,
    /// Set once the task succeeded; gates the "continue" action.
    pub continue_ready: bool,
}

impl Default for TrainingProgress {
    fn default() -> Self {
        Self {
            status_text: "Starting".to_string(),
            percent: 0,
            continue_ready: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Continue,
    Succeeded,
    Failed,
}

impl TrainingProgress {
    /// Fold one monitor response into the progress.
    ///
    /// Known phrases set the percentage; unknown ones only change the text.
    pub fn apply(&mut self, status: &TrainingStatus) -> PollOutcome {
        match status.result.as_deref() {
            Some(result) => {
                self.status_text = result.to_string();
                if let Some(percent) = progress_for(result) {
                    self.percent = percent;
                }
            }
            None => self.status_text = status.status.to_string(),
        }

        match status.status {
            TaskState::Success => {
                self.percent = 100;
                self.continue_ready = true;
                PollOutcome::Succeeded
            }
            TaskState::Failure => PollOutcome::Failed,
            _ => PollOutcome::Continue,
        }
    }
}
