mod runner;

pub use runner::TaskRunner;

use stackchat_core::{
    Chat, Message, NewUser, PollerSnapshot, SendStage, StackchatError, Transcript, User,
    UserUpdate,
};

/// Side effect requested by the UI. Executed by [`TaskRunner`].
#[derive(Debug, Clone)]
pub enum Task {
    Login { identifier: String, password: String },
    SignUp(NewUser),
    Logout,
    /// Forget the stored tokens locally, without a backend call.
    ClearSession,
    LoadChats,
    CreateChat(String),
    DeleteChat(i64),
    LoadMessages(i64),
    SendMessage { transcript: Transcript, prompt: String },
    LoadAccount,
    UpdateAccount(UserUpdate),
    DeleteAccount,
    StartTraining,
    WatchTraining,
    StopTraining,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Login { .. } => TaskKind::Login,
            Task::SignUp(_) => TaskKind::SignUp,
            Task::Logout => TaskKind::Logout,
            Task::ClearSession => TaskKind::ClearSession,
            Task::LoadChats => TaskKind::LoadChats,
            Task::CreateChat(_) => TaskKind::CreateChat,
            Task::DeleteChat(_) => TaskKind::DeleteChat,
            Task::LoadMessages(_) => TaskKind::LoadMessages,
            Task::SendMessage { .. } => TaskKind::SendMessage,
            Task::LoadAccount => TaskKind::LoadAccount,
            Task::UpdateAccount(_) => TaskKind::UpdateAccount,
            Task::DeleteAccount => TaskKind::DeleteAccount,
            Task::StartTraining => TaskKind::StartTraining,
            Task::WatchTraining => TaskKind::WatchTraining,
            Task::StopTraining => TaskKind::StopTraining,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Login,
    SignUp,
    Logout,
    ClearSession,
    LoadChats,
    CreateChat,
    DeleteChat,
    LoadMessages,
    SendMessage,
    LoadAccount,
    UpdateAccount,
    DeleteAccount,
    StartTraining,
    WatchTraining,
    StopTraining,
}

/// Result of a [`Task`], delivered back to the app.
#[derive(Debug, Clone)]
pub enum AppEvent {
    LoggedIn,
    SignedUp(String),
    LoggedOut,
    ChatsLoaded(Vec<Chat>),
    ChatCreated(Chat),
    ChatDeleted { chat_id: i64, existed: bool },
    MessagesLoaded { chat_id: i64, messages: Vec<Message> },
    SendProgress { stage: SendStage, transcript: Transcript },
    SendFinished { chat_id: i64, failure: Option<TaskFailure> },
    AccountLoaded(User),
    AccountUpdated(String),
    AccountDeleted,
    TrainingStarted { started: bool },
    TrainingProgress(PollerSnapshot),
    Failed(TaskFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub kind: TaskKind,
    pub message: String,
    /// The session is gone; the app returns to the login screen.
    pub session_lost: bool,
}

impl TaskFailure {
    pub fn new(kind: TaskKind, error: &StackchatError) -> Self {
        Self {
            kind,
            message: error.to_string(),
            session_lost: matches!(
                error,
                StackchatError::NotAuthenticated | StackchatError::SessionExpired { .. }
            ),
        }
    }
}
