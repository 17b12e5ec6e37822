use std::sync::Arc;
use std::time::Duration;

use stackchat_core::{
    send_message, ApiClient, PollerHandle, StackchatError, StackchatResult, TrainingMonitor,
    TrainingPoller,
};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{AppEvent, Task, TaskFailure, TaskKind};

/// Runs [`Task`]s against the backend and reports results as [`AppEvent`]s.
///
/// Owns the training poller so leaving the setup screen can cancel it.
pub struct TaskRunner {
    client: Arc<ApiClient>,
    events: UnboundedSender<AppEvent>,
    poll_interval: Duration,
    poller: Option<PollerHandle>,
    forwarder: Option<JoinHandle<()>>,
}

impl TaskRunner {
    pub fn new(
        client: Arc<ApiClient>,
        events: UnboundedSender<AppEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            events,
            poll_interval,
            poller: None,
            forwarder: None,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    pub fn dispatch(&mut self, task: Task) {
        debug!(task = ?task.kind(), "Dispatching task");
        match task {
            Task::WatchTraining => self.watch_training(),
            Task::StopTraining => self.stop_training(),
            Task::ClearSession => {
                let client = self.client.clone();
                let tx = self.events.clone();
                tokio::spawn(async move {
                    if let Err(e) = client.forget_session().await {
                        e.log();
                        let failure = TaskFailure::new(TaskKind::ClearSession, &e);
                        let _ = tx.send(AppEvent::Failed(failure));
                    }
                });
            }
            Task::SendMessage { transcript, prompt } => {
                let client = self.client.clone();
                let tx = self.events.clone();
                tokio::spawn(async move {
                    let mut transcript = transcript;
                    let chat_id = transcript.chat_id();
                    let progress = tx.clone();
                    let result = send_message(client.as_ref(), &mut transcript, &prompt, |stage, t| {
                        let _ = progress.send(AppEvent::SendProgress {
                            stage,
                            transcript: t.clone(),
                        });
                    })
                    .await;
                    let failure = result.err().map(|e| {
                        e.log();
                        TaskFailure::new(TaskKind::SendMessage, &e)
                    });
                    let _ = tx.send(AppEvent::SendFinished { chat_id, failure });
                });
            }
            other => {
                let client = self.client.clone();
                let tx = self.events.clone();
                tokio::spawn(async move {
                    let kind = other.kind();
                    let event = match execute(&client, other).await {
                        Ok(event) => event,
                        Err(e) => {
                            e.log();
                            AppEvent::Failed(TaskFailure::new(kind, &e))
                        }
                    };
                    let _ = tx.send(event);
                });
            }
        }
    }

    fn watch_training(&mut self) {
        self.stop_training();

        let monitor: Arc<dyn TrainingMonitor> = self.client.clone();
        let handle = TrainingPoller::new(monitor, self.poll_interval).spawn();
        let mut rx = handle.subscribe();
        let tx = self.events.clone();

        self.forwarder = Some(tokio::spawn(async move {
            loop {
                let snapshot = rx.borrow_and_update().clone();
                let terminal = snapshot.state.is_terminal();
                if tx.send(AppEvent::TrainingProgress(snapshot)).is_err() || terminal {
                    break;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }));
        self.poller = Some(handle);
    }

    fn stop_training(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        if let Some(mut poller) = self.poller.take() {
            debug!("Stopping training poller");
            poller.cancel();
        }
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.stop_training();
    }
}

async fn execute(client: &ApiClient, task: Task) -> StackchatResult<AppEvent> {
    let event = match task {
        Task::Login {
            identifier,
            password,
        } => {
            client.login(&identifier, &password).await?;
            AppEvent::LoggedIn
        }
        Task::SignUp(user) => AppEvent::SignedUp(client.sign_up(&user).await?),
        Task::Logout => {
            client.logout().await?;
            AppEvent::LoggedOut
        }
        Task::LoadChats => AppEvent::ChatsLoaded(client.list_chats().await?),
        Task::CreateChat(name) => AppEvent::ChatCreated(client.create_chat(&name).await?),
        Task::DeleteChat(chat_id) => AppEvent::ChatDeleted {
            chat_id,
            existed: client.delete_chat(chat_id).await?,
        },
        Task::LoadMessages(chat_id) => AppEvent::MessagesLoaded {
            chat_id,
            messages: client.list_messages(chat_id).await?,
        },
        Task::LoadAccount => AppEvent::AccountLoaded(client.read_user().await?),
        Task::UpdateAccount(update) => AppEvent::AccountUpdated(client.update_user(&update).await?),
        Task::DeleteAccount => {
            client.delete_user().await?;
            AppEvent::AccountDeleted
        }
        Task::StartTraining => AppEvent::TrainingStarted {
            started: client.train_model().await?,
        },
        other => {
            return Err(StackchatError::Internal(format!(
                "{:?} is not a backend request",
                other.kind()
            )))
        }
    };
    Ok(event)
}
