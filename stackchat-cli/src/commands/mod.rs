pub mod account;
pub mod auth;
pub mod chats;
pub mod messages;
pub mod status;
pub mod train;

pub use account::{handle_account_command, AccountCommand};
pub use auth::{handle_login, handle_logout, handle_refresh, handle_signup};
pub use chats::{handle_chats_command, ChatsCommand};
pub use messages::{handle_ask, handle_messages};
pub use status::handle_status;
pub use train::{handle_train_command, TrainCommand};

use anyhow::{bail, Result};
use chrono::{DateTime, Local, Utc};
use std::io::{self, BufRead, Write};

pub(crate) fn format_datetime(at: &DateTime<Utc>, format: &str) -> String {
    at.with_timezone(&Local).format(format).to_string()
}

/// Read one trimmed line from stdin after printing `label`.
pub(crate) fn prompt_line(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub(crate) fn prompt_password(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    Ok(rpassword::read_password()?)
}

/// Use the flag value, or ask for it.
pub(crate) fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt_line(label),
    }
}

pub(crate) fn check_format(format: &str) -> Result<()> {
    match format {
        "text" | "json" => Ok(()),
        other => bail!("Unknown output format '{}'. Use text or json.", other),
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
