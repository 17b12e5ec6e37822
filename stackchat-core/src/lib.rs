#![allow(
    clippy::needless_borrows_for_generic_args,
    clippy::manual_range_contains,
    clippy::derivable_impls,
    clippy::type_complexity,
    clippy::len_zero,
    dead_code,
    unused_imports,
    unused_variables,
    unused_mut
)]

pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod models;
pub mod session;
pub mod training;

pub use api::{ApiClient, ChatBackend, TrainingMonitor};
pub use config::{
    ensure_data_dir, get_config_dir, get_data_dir, ApiConfig, ConfigLoadError, DisplayConfig,
    LoggingConfig, LoginField, SessionConfig, StackchatConfig, TrainingConfig, TuiConfig,
    DEFAULT_API_URL,
};
pub use conversation::{
    require_chat, send_message, PendingReply, SendStage, Transcript, TranscriptEntry,
};
pub use error::{CliErrorDisplay, StackchatError, StackchatResult};
pub use logging::{init_logging, LogTarget};
pub use grouping::{days_between, group_chats_by_date, ChatGroup, ChatGroups};
pub use models::{
    progress_for, sort_newest_first, validate_password, Chat, Message, MessageBody, NewMessage,
    NewUser, Reference, TaskState, TrainingStage, TrainingStatus, User, UserUpdate,
    MIN_PASSWORD_LEN,
};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore, SessionTokens};
pub use training::{
    PollOutcome, PollerHandle, PollerSnapshot, PollerState, TrainingPoller, TrainingProgress,
};
