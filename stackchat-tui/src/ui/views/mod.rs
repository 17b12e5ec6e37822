pub mod chats;
pub mod login;
pub mod settings;
pub mod setup;
pub mod signup;
