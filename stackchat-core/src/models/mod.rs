mod chat;
mod message;
pub(crate) mod timestamp;
mod training;
mod user;

pub use chat::{sort_newest_first, Chat};
pub use message::{Message, MessageBody, NewMessage, Reference};
pub(crate) use training::TrainResponse;
pub use training::{progress_for, TaskState, TrainingStage, TrainingStatus};
pub use user::{validate_password, NewUser, User, UserUpdate, MIN_PASSWORD_LEN};
