use chrono::{DateTime, Utc};
use stackchat_core::{
    group_chats_by_date, Chat, ChatGroups, Message, NewUser, PollerSnapshot, PollerState,
    Transcript, TranscriptEntry, User, UserUpdate,
};

use super::input::TextInput;
use super::typing::TypingReveal;

/// Move a focus index forward or backward with wrap-around.
pub fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub identifier: TextInput,
    pub password: TextInput,
    pub focus: usize,
    pub submitting: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub const FIELDS: usize = 2;

    pub fn new() -> Self {
        Self {
            password: TextInput::masked(),
            ..Self::default()
        }
    }

    pub fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            0 => &mut self.identifier,
            _ => &mut self.password,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.identifier.value().trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub fields: [TextInput; 5],
    pub focus: usize,
    pub submitting: bool,
    pub error: Option<String>,
}

impl SignUpForm {
    pub const LABELS: [&'static str; 5] = [
        "First name",
        "Last name",
        "Email",
        "Password",
        "Confirm password",
    ];

    pub fn new() -> Self {
        Self {
            fields: [
                TextInput::new(),
                TextInput::new(),
                TextInput::new(),
                TextInput::masked(),
                TextInput::masked(),
            ],
            focus: 0,
            submitting: false,
            error: None,
        }
    }

    pub fn focused_mut(&mut self) -> &mut TextInput {
        let index = self.focus.min(self.fields.len() - 1);
        &mut self.fields[index]
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    /// Build the sign-up payload, checking it locally first.
    pub fn to_new_user(&self) -> Result<NewUser, String> {
        let [first, last, email, password, confirm] = &self.fields;
        if password.value() != confirm.value() {
            return Err("Passwords do not match".to_string());
        }
        let user = NewUser::new(
            first.value().trim(),
            last.value().trim(),
            email.value().trim(),
            password.value(),
        );
        user.validate().map_err(|e| e.to_string())?;
        Ok(user)
    }
}

impl Default for SignUpForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub fields: [TextInput; 3],
    pub focus: usize,
    pub loaded: bool,
    pub saving: bool,
}

impl SettingsForm {
    pub const LABELS: [&'static str; 3] = ["First name", "Last name", "Email"];

    pub fn fill(&mut self, user: &User) {
        self.fields[0].set(user.first_name.clone());
        self.fields[1].set(user.last_name.clone());
        self.fields[2].set(user.email.clone());
        self.loaded = true;
    }

    pub fn focused_mut(&mut self) -> &mut TextInput {
        let index = self.focus.min(self.fields.len() - 1);
        &mut self.fields[index]
    }

    pub fn to_update(&self) -> Result<UserUpdate, String> {
        let update = UserUpdate {
            first_name: self.fields[0].value().trim().to_string(),
            last_name: self.fields[1].value().trim().to_string(),
            email: self.fields[2].value().trim().to_string(),
        };
        update.validate().map_err(|e| e.to_string())?;
        Ok(update)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatsFocus {
    #[default]
    Sidebar,
    Input,
    Transcript,
}

impl ChatsFocus {
    pub fn next(&self) -> Self {
        match self {
            ChatsFocus::Sidebar => ChatsFocus::Input,
            ChatsFocus::Input => ChatsFocus::Transcript,
            ChatsFocus::Transcript => ChatsFocus::Sidebar,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatsState {
    pub chats: Vec<Chat>,
    pub loading: bool,
    pub selected: usize,
    pub select_after_load: Option<i64>,
    pub open_chat: Option<i64>,
    pub transcript: Option<Transcript>,
    pub loading_messages: bool,
    pub input: TextInput,
    pub sending: bool,
    pub focus: ChatsFocus,
    pub reveal: Option<TypingReveal>,
    /// Transcript entry whose references are shown.
    pub selected_answer: Option<usize>,
}

impl ChatsState {
    pub fn groups(&self, now: DateTime<Utc>) -> ChatGroups {
        group_chats_by_date(&self.chats, now)
    }

    /// Chats in sidebar order.
    pub fn ordered(&self, now: DateTime<Utc>) -> Vec<Chat> {
        self.groups(now).flatten().into_iter().cloned().collect()
    }

    pub fn selected_chat(&self, now: DateTime<Utc>) -> Option<Chat> {
        self.ordered(now).into_iter().nth(self.selected)
    }

    pub fn move_selection(&mut self, forward: bool, now: DateTime<Utc>) {
        let len = self.ordered(now).len();
        self.selected = cycle(self.selected, len, forward);
    }

    /// Replace the list, keeping the selection on a sensible chat.
    pub fn set_chats(&mut self, chats: Vec<Chat>, now: DateTime<Utc>) {
        let keep = self
            .select_after_load
            .take()
            .or_else(|| self.selected_chat(now).map(|c| c.id));
        self.chats = chats;
        self.loading = false;

        let ordered = self.ordered(now);
        self.selected = keep
            .and_then(|id| ordered.iter().position(|c| c.id == id))
            .unwrap_or(0)
            .min(ordered.len().saturating_sub(1));

        if let Some(open) = self.open_chat {
            if !self.chats.iter().any(|c| c.id == open) {
                self.close_chat();
            }
        }
    }

    pub fn open(&mut self, chat_id: i64) {
        self.open_chat = Some(chat_id);
        self.transcript = None;
        self.loading_messages = true;
        self.reveal = None;
        self.selected_answer = None;
    }

    pub fn close_chat(&mut self) {
        self.open_chat = None;
        self.transcript = None;
        self.loading_messages = false;
        self.reveal = None;
        self.selected_answer = None;
        if self.focus != ChatsFocus::Sidebar {
            self.focus = ChatsFocus::Sidebar;
        }
    }

    pub fn remove_chat(&mut self, chat_id: i64, now: DateTime<Utc>) {
        self.chats.retain(|c| c.id != chat_id);
        if self.open_chat == Some(chat_id) {
            self.close_chat();
        }
        let len = self.ordered(now).len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn open_chat_name(&self) -> Option<&str> {
        let id = self.open_chat?;
        self.chats
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.chat_name.as_str())
    }

    /// Indices of bot messages in the open transcript.
    pub fn answer_indices(&self) -> Vec<usize> {
        match &self.transcript {
            Some(t) => t
                .entries()
                .iter()
                .enumerate()
                .filter(|(_, e)| e.message().is_some_and(Message::is_bot))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn select_last_answer(&mut self) {
        self.selected_answer = self.answer_indices().last().copied();
    }

    pub fn move_answer(&mut self, forward: bool) {
        let answers = self.answer_indices();
        if answers.is_empty() {
            self.selected_answer = None;
            return;
        }
        let pos = self
            .selected_answer
            .and_then(|sel| answers.iter().position(|&i| i == sel))
            .unwrap_or(answers.len() - 1);
        let next = if forward {
            (pos + 1).min(answers.len() - 1)
        } else {
            pos.saturating_sub(1)
        };
        self.selected_answer = Some(answers[next]);
    }

    pub fn selected_message(&self) -> Option<&Message> {
        let index = self.selected_answer?;
        self.transcript.as_ref()?.entries().get(index)?.message()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetupState {
    pub snapshot: PollerSnapshot,
    pub starting: bool,
    /// The backend answered without a task id.
    pub not_started: bool,
}

impl SetupState {
    pub fn can_continue(&self) -> bool {
        self.snapshot.progress.continue_ready
    }

    pub fn can_retry(&self) -> bool {
        !self.starting
            && (self.not_started
                || matches!(
                    self.snapshot.state,
                    PollerState::Failed | PollerState::Aborted
                ))
    }

    /// Status line with an ellipsis while work is still in progress.
    pub fn status_line(&self) -> String {
        let text = &self.snapshot.progress.status_text;
        if self.can_continue() {
            format!("{} ✔", text)
        } else if self.snapshot.state.is_terminal() {
            text.clone()
        } else {
            format!("{}...", text)
        }
    }
}
