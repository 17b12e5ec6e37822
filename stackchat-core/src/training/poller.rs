use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::progress::{PollOutcome, TrainingProgress};
use crate::api::TrainingMonitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    Idle,
    Polling,
    Succeeded,
    Failed,
    Aborted,
}

impl PollerState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollerState::Succeeded | PollerState::Failed | PollerState::Aborted
        )
    }
}

impl std::fmt::Display for PollerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollerState::Idle => write!(f, "idle"),
            PollerState::Polling => write!(f, "polling"),
            PollerState::Succeeded => write!(f, "succeeded"),
            PollerState::Failed => write!(f, "failed"),
            PollerState::Aborted => write!(f, "aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollerSnapshot {
    pub state: PollerState,
    pub progress: TrainingProgress,
    pub polls: u32,
}

impl Default for PollerSnapshot {
    fn default() -> Self {
        Self {
            state: PollerState::Idle,
            progress: TrainingProgress::default(),
            polls: 0,
        }
    }
}

/// Polls the training monitor at a fixed interval until the task finishes.
///
/// Each tick waits for the previous request, so polls never overlap.
pub struct TrainingPoller {
    monitor: Arc<dyn TrainingMonitor>,
    interval: Duration,
}

impl TrainingPoller {
    pub fn new(monitor: Arc<dyn TrainingMonitor>, interval: Duration) -> Self {
        Self { monitor, interval }
    }

    pub fn spawn(self) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(PollerSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!(
            "Training poller started with interval: {} seconds",
            self.interval.as_secs_f64()
        );
        let task = tokio::spawn(self.background_loop(state_tx, shutdown_rx));

        PollerHandle {
            state_rx,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    async fn background_loop(
        self,
        state_tx: watch::Sender<PollerSnapshot>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let mut snapshot = PollerSnapshot {
            state: PollerState::Polling,
            ..PollerSnapshot::default()
        };
        state_tx.send_replace(snapshot.clone());

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown_rx => {
                    info!("Training poller cancelled");
                    snapshot.state = PollerState::Aborted;
                    state_tx.send_replace(snapshot);
                    return;
                }
            }

            let response = tokio::select! {
                response = self.monitor.monitor_training() => response,
                _ = &mut shutdown_rx => {
                    info!("Training poller cancelled during request");
                    snapshot.state = PollerState::Aborted;
                    state_tx.send_replace(snapshot);
                    return;
                }
            };
            snapshot.polls += 1;

            match response {
                Ok(status) => {
                    let outcome = snapshot.progress.apply(&status);
                    debug!(
                        status = %status.status,
                        percent = snapshot.progress.percent,
                        "Training status"
                    );
                    match outcome {
                        PollOutcome::Continue => {
                            state_tx.send_replace(snapshot.clone());
                        }
                        PollOutcome::Succeeded => {
                            info!("Training finished");
                            snapshot.state = PollerState::Succeeded;
                            state_tx.send_replace(snapshot);
                            return;
                        }
                        PollOutcome::Failed => {
                            warn!(result = %snapshot.progress.status_text, "Training failed");
                            snapshot.state = PollerState::Failed;
                            state_tx.send_replace(snapshot);
                            return;
                        }
                    }
                }
                Err(e) => {
                    debug!("Training poll stopped: {}", e);
                    snapshot.state = PollerState::Aborted;
                    state_tx.send_replace(snapshot);
                    return;
                }
            }
        }
    }
}

/// Owner of a running poller. Dropping it cancels the poll loop.
pub struct PollerHandle {
    state_rx: watch::Receiver<PollerSnapshot>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn subscribe(&self) -> watch::Receiver<PollerSnapshot> {
        self.state_rx.clone()
    }

    pub fn snapshot(&self) -> PollerSnapshot {
        self.state_rx.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling. No-op once the poller reached a terminal state.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait until the poller reaches a terminal state.
    pub async fn wait(&self) -> PollerSnapshot {
        let mut rx = self.state_rx.clone();
        loop {
            {
                let current = rx.borrow_and_update();
                if current.state.is_terminal() {
                    return current.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
