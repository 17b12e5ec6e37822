mod account;
mod auth;
mod chats;
mod client;
pub mod endpoints;
mod messages;
mod model;
mod traits;

pub use client::ApiClient;
pub use traits::{ChatBackend, TrainingMonitor};
