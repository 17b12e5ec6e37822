use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use stackchat_core::{require_chat, LoginField, PollerState, SendStage, User};
use tracing::{debug, warn};

use crate::data::{
    cycle, ChatsFocus, ChatsState, LoginForm, SettingsForm, SetupState, SignUpForm, TextInput,
    TypingReveal,
};
use crate::events::{AppEvent, Task, TaskFailure, TaskKind};
use crate::theme::{ThemeLoader, ThemeManager};
use crate::ui::widgets::{ConfirmAction, ConfirmDialog, ToastManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    SignUp,
    Chats,
    DatabaseSetup,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Login => "Log in",
            View::SignUp => "Sign up",
            View::Chats => "Chats",
            View::DatabaseSetup => "Set up database",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Modal {
    NewChat(TextInput),
    Settings(SettingsForm),
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub typing_speed: Duration,
    pub login_field: LoginField,
    pub authenticated: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            typing_speed: Duration::from_millis(20),
            login_field: LoginField::Email,
            authenticated: false,
        }
    }
}

pub struct App {
    pub view: View,
    pub should_quit: bool,
    pub login: LoginForm,
    pub signup: SignUpForm,
    pub chats: ChatsState,
    pub setup: SetupState,
    pub modal: Option<Modal>,
    pub dialog: Option<ConfirmDialog>,
    pub toasts: ToastManager,
    pub theme_manager: ThemeManager,
    pub user: Option<User>,
    pub animation_tick: u64,
    theme_loader: Option<ThemeLoader>,
    typing_speed: Duration,
    login_field: LoginField,
}

impl App {
    pub fn new(
        settings: AppSettings,
        theme_manager: ThemeManager,
        theme_loader: Option<ThemeLoader>,
    ) -> Self {
        let view = if settings.authenticated {
            View::Chats
        } else {
            View::Login
        };
        Self {
            view,
            should_quit: false,
            login: LoginForm::new(),
            signup: SignUpForm::new(),
            chats: ChatsState::default(),
            setup: SetupState::default(),
            modal: None,
            dialog: None,
            toasts: ToastManager::new(),
            theme_manager,
            user: None,
            animation_tick: 0,
            theme_loader,
            typing_speed: settings.typing_speed,
            login_field: settings.login_field,
        }
    }

    pub fn startup_tasks(&mut self) -> Vec<Task> {
        if self.view == View::Chats {
            self.chats.loading = true;
            vec![Task::LoadChats, Task::LoadAccount]
        } else {
            Vec::new()
        }
    }

    pub fn login_label(&self) -> &'static str {
        match self.login_field {
            LoginField::Email => "Email",
            LoginField::Username => "Username",
        }
    }

    /// Whether the UI needs frames faster than the idle tick.
    pub fn is_animating(&self) -> bool {
        self.chats.reveal.is_some()
            || self.chats.sending
            || self.chats.loading_messages
            || self.setup.starting
            || self.setup.snapshot.state == PollerState::Polling
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.animation_tick = self.animation_tick.wrapping_add(1);
        self.toasts.cleanup(now);

        if self.chats.reveal.as_ref().is_some_and(|r| r.is_done(now)) {
            self.chats.reveal = None;
            if let Some(transcript) = self.chats.transcript.as_mut() {
                transcript.clear_reveal();
            }
        }
    }

    pub fn status_message(&self) -> Option<&'static str> {
        if self.login.submitting || self.signup.submitting {
            Some("Contacting backend…")
        } else if self.chats.sending {
            Some("Waiting for the answer…")
        } else if self.chats.loading_messages {
            Some("Loading messages…")
        } else if self.chats.loading {
            Some("Loading chats…")
        } else {
            None
        }
    }

    pub fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.dialog.is_some() {
            return vec![("Tab", "Switch"), ("Enter", "Choose"), ("y", "Yes"), ("Esc", "Cancel")];
        }
        match &self.modal {
            Some(Modal::NewChat(_)) => return vec![("Enter", "Create"), ("Esc", "Cancel")],
            Some(Modal::Settings(_)) => {
                return vec![
                    ("Tab", "Field"),
                    ("Enter", "Save"),
                    ("^D", "Delete account"),
                    ("^L", "Log out"),
                    ("Esc", "Close"),
                ]
            }
            None => {}
        }
        match self.view {
            View::Login => vec![("Tab", "Field"), ("Enter", "Log in"), ("F2", "Sign up"), ("F3", "Theme"), ("Esc", "Quit")],
            View::SignUp => vec![("Tab", "Field"), ("Enter", "Submit"), ("F2", "Log in"), ("Esc", "Back")],
            View::Chats => match self.chats.focus {
                ChatsFocus::Sidebar => vec![
                    ("↑↓", "Select"),
                    ("Enter", "Open"),
                    ("n", "New"),
                    ("d", "Delete"),
                    ("s", "Settings"),
                    ("t", "Set up database"),
                    ("L", "Log out"),
                    ("q", "Quit"),
                ],
                ChatsFocus::Input => vec![("Enter", "Send"), ("Tab", "Answers"), ("Esc", "Chats")],
                ChatsFocus::Transcript => vec![("↑↓", "Answer"), ("Tab", "Chats"), ("Esc", "Input")],
            },
            View::DatabaseSetup => {
                if self.setup.can_continue() {
                    vec![("Enter", "Start chat"), ("Esc", "Back")]
                } else if self.setup.can_retry() {
                    vec![("r", "Retry"), ("Esc", "Back")]
                } else {
                    vec![("Esc", "Back")]
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Task> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }
        if key.code == KeyCode::F(3) {
            self.cycle_theme();
            return Vec::new();
        }
        if self.dialog.is_some() {
            return self.handle_dialog_key(key);
        }
        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }

        match self.view {
            View::Login => self.handle_login_key(key),
            View::SignUp => self.handle_signup_key(key),
            View::Chats => self.handle_chats_key(key),
            View::DatabaseSetup => self.handle_setup_key(key),
        }
    }

    fn cycle_theme(&mut self) {
        self.theme_manager.cycle_theme();
        let name = self.theme_manager.current_theme().name();
        if let Some(loader) = &self.theme_loader {
            if let Err(e) = loader.save_theme_name(name) {
                warn!("Failed to save theme preference: {:#}", e);
            }
        }
        self.toasts.info(format!("Theme: {}", name));
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Vec<Task> {
        let Some(dialog) = self.dialog.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') => {
                self.dialog = None;
            }
            KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Char('h')
            | KeyCode::Char('l') => dialog.toggle(),
            KeyCode::Char('y') => {
                let action = dialog.action;
                self.dialog = None;
                return self.confirm(action);
            }
            KeyCode::Enter => {
                let accepted = dialog.is_confirm_selected();
                let action = dialog.action;
                self.dialog = None;
                if accepted {
                    return self.confirm(action);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn confirm(&mut self, action: ConfirmAction) -> Vec<Task> {
        debug!(?action, "Confirmed");
        match action {
            ConfirmAction::DeleteChat(chat_id) => vec![Task::DeleteChat(chat_id)],
            ConfirmAction::DeleteAccount => vec![Task::DeleteAccount],
            ConfirmAction::Logout => vec![Task::Logout],
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Vec<Task> {
        let Some(modal) = self.modal.take() else {
            return Vec::new();
        };
        match modal {
            Modal::NewChat(mut input) => match key.code {
                KeyCode::Esc => Vec::new(),
                KeyCode::Enter => {
                    let name = input.value().trim().to_string();
                    if name.is_empty() {
                        self.toasts.error("Chat name cannot be empty");
                        self.modal = Some(Modal::NewChat(input));
                        return Vec::new();
                    }
                    vec![Task::CreateChat(name)]
                }
                _ => {
                    input.handle_key(key);
                    self.modal = Some(Modal::NewChat(input));
                    Vec::new()
                }
            },
            Modal::Settings(mut form) => {
                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                let mut tasks = Vec::new();
                match key.code {
                    KeyCode::Esc => return Vec::new(),
                    KeyCode::Char('d') if ctrl => {
                        self.dialog = Some(ConfirmDialog::danger(
                            "Delete account",
                            "Delete your account and all of its chats? This cannot be undone.",
                            ConfirmAction::DeleteAccount,
                        ));
                    }
                    KeyCode::Char('l') if ctrl => return vec![Task::Logout],
                    KeyCode::Tab | KeyCode::Down => {
                        form.focus = cycle(form.focus, form.fields.len(), true)
                    }
                    KeyCode::BackTab | KeyCode::Up => {
                        form.focus = cycle(form.focus, form.fields.len(), false)
                    }
                    KeyCode::Enter => {
                        if !form.loaded {
                            self.toasts.warning("Account details are still loading");
                        } else if !form.saving {
                            match form.to_update() {
                                Ok(update) => {
                                    form.saving = true;
                                    tasks.push(Task::UpdateAccount(update));
                                }
                                Err(message) => self.toasts.error(message),
                            }
                        }
                    }
                    _ => {
                        form.focused_mut().handle_key(key);
                    }
                }
                self.modal = Some(Modal::Settings(form));
                tasks
            }
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Vec<Task> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(2) => {
                self.signup = SignUpForm::new();
                self.view = View::SignUp;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.login.focus = cycle(self.login.focus, LoginForm::FIELDS, true)
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.login.focus = cycle(self.login.focus, LoginForm::FIELDS, false)
            }
            KeyCode::Enter if self.login.focus == 0 => self.login.focus = 1,
            KeyCode::Enter => return self.submit_login(),
            _ => {
                self.login.focused_mut().handle_key(key);
            }
        }
        Vec::new()
    }

    fn submit_login(&mut self) -> Vec<Task> {
        if self.login.submitting {
            return Vec::new();
        }
        if !self.login.is_complete() {
            self.login.error = Some(format!(
                "Enter your {} and password",
                self.login_label().to_lowercase()
            ));
            return Vec::new();
        }
        self.login.submitting = true;
        self.login.error = None;
        vec![Task::Login {
            identifier: self.login.identifier.value().trim().to_string(),
            password: self.login.password.value().to_string(),
        }]
    }

    fn handle_signup_key(&mut self, key: KeyEvent) -> Vec<Task> {
        let len = self.signup.fields.len();
        match key.code {
            KeyCode::Esc | KeyCode::F(2) => self.view = View::Login,
            KeyCode::Tab | KeyCode::Down => self.signup.focus = cycle(self.signup.focus, len, true),
            KeyCode::BackTab | KeyCode::Up => {
                self.signup.focus = cycle(self.signup.focus, len, false)
            }
            KeyCode::Enter if !self.signup.is_last_field() => self.signup.focus += 1,
            KeyCode::Enter => {
                if self.signup.submitting {
                    return Vec::new();
                }
                match self.signup.to_new_user() {
                    Ok(user) => {
                        self.signup.submitting = true;
                        self.signup.error = None;
                        return vec![Task::SignUp(user)];
                    }
                    Err(message) => self.signup.error = Some(message),
                }
            }
            _ => {
                self.signup.focused_mut().handle_key(key);
            }
        }
        Vec::new()
    }

    fn handle_chats_key(&mut self, key: KeyEvent) -> Vec<Task> {
        match self.chats.focus {
            ChatsFocus::Sidebar => self.handle_sidebar_key(key),
            ChatsFocus::Input => match key.code {
                KeyCode::Esc => {
                    self.chats.focus = ChatsFocus::Sidebar;
                    Vec::new()
                }
                KeyCode::Tab => {
                    self.chats.focus = ChatsFocus::Transcript;
                    Vec::new()
                }
                KeyCode::Enter => self.send(),
                _ => {
                    self.chats.input.handle_key(key);
                    Vec::new()
                }
            },
            ChatsFocus::Transcript => {
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => self.chats.move_answer(false),
                    KeyCode::Down | KeyCode::Char('j') => self.chats.move_answer(true),
                    KeyCode::Tab => self.chats.focus = ChatsFocus::Sidebar,
                    KeyCode::Esc => self.chats.focus = ChatsFocus::Input,
                    _ => {}
                }
                Vec::new()
            }
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) -> Vec<Task> {
        let now = Utc::now();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.chats.move_selection(false, now),
            KeyCode::Down | KeyCode::Char('j') => self.chats.move_selection(true, now),
            KeyCode::Tab => self.chats.focus = self.chats.focus.next(),
            KeyCode::Enter => {
                if let Some(chat) = self.chats.selected_chat(now) {
                    self.chats.open(chat.id);
                    self.chats.focus = ChatsFocus::Input;
                    return vec![Task::LoadMessages(chat.id)];
                }
            }
            KeyCode::Char('n') => self.modal = Some(Modal::NewChat(TextInput::new())),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(chat) = self.chats.selected_chat(now) {
                    self.dialog = Some(ConfirmDialog::danger(
                        "Delete chat",
                        format!("Delete '{}' and all of its messages?", chat.chat_name),
                        ConfirmAction::DeleteChat(chat.id),
                    ));
                }
            }
            KeyCode::Char('s') => {
                let mut form = SettingsForm::default();
                if let Some(user) = &self.user {
                    form.fill(user);
                }
                self.modal = Some(Modal::Settings(form));
                return vec![Task::LoadAccount];
            }
            KeyCode::Char('t') => {
                self.view = View::DatabaseSetup;
                self.setup = SetupState {
                    starting: true,
                    ..SetupState::default()
                };
                return vec![Task::StartTraining];
            }
            KeyCode::Char('r') => {
                self.chats.loading = true;
                return vec![Task::LoadChats];
            }
            KeyCode::Char('L') => {
                self.dialog = Some(ConfirmDialog::new(
                    "Log out",
                    "End this session?",
                    ConfirmAction::Logout,
                ));
            }
            _ => {}
        }
        Vec::new()
    }

    fn send(&mut self) -> Vec<Task> {
        if let Err(e) = require_chat(self.chats.open_chat) {
            self.toasts.error(e.to_string());
            return Vec::new();
        }
        if self.chats.sending {
            self.toasts.warning("Wait for the current answer");
            return Vec::new();
        }
        let Some(transcript) = self.chats.transcript.clone() else {
            self.toasts.info("Messages are still loading");
            return Vec::new();
        };
        if self.chats.input.value().trim().is_empty() {
            return Vec::new();
        }

        let prompt = self.chats.input.take().trim().to_string();
        self.chats.sending = true;
        vec![Task::SendMessage { transcript, prompt }]
    }

    fn handle_setup_key(&mut self, key: KeyEvent) -> Vec<Task> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('c') if self.setup.can_continue() => {
                self.view = View::Chats;
                self.chats.loading = true;
                vec![Task::StopTraining, Task::LoadChats]
            }
            KeyCode::Char('r') if self.setup.can_retry() => {
                self.setup = SetupState {
                    starting: true,
                    ..SetupState::default()
                };
                vec![Task::StartTraining]
            }
            KeyCode::Esc => {
                self.view = View::Chats;
                vec![Task::StopTraining]
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Task results
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: AppEvent) -> Vec<Task> {
        let now = Utc::now();
        match event {
            AppEvent::LoggedIn => {
                self.login = LoginForm::new();
                self.chats = ChatsState {
                    loading: true,
                    ..ChatsState::default()
                };
                self.view = View::Chats;
                self.toasts.success("Logged in");
                return vec![Task::LoadChats, Task::LoadAccount];
            }
            AppEvent::SignedUp(message) => {
                let email = self.signup.fields[2].value().trim().to_string();
                self.signup = SignUpForm::new();
                self.login = LoginForm::new();
                if self.login_field == LoginField::Email {
                    self.login.identifier.set(email);
                    self.login.focus = 1;
                }
                self.view = View::Login;
                self.toasts.success(message);
            }
            AppEvent::LoggedOut => {
                self.reset_session();
                self.toasts.info("Logged out");
                return vec![Task::StopTraining];
            }
            AppEvent::ChatsLoaded(chats) => self.chats.set_chats(chats, now),
            AppEvent::ChatCreated(chat) => {
                self.chats.select_after_load = Some(chat.id);
                self.toasts
                    .success(format!("Chat '{}' created", chat.chat_name));
                return vec![Task::LoadChats];
            }
            AppEvent::ChatDeleted { chat_id, existed } => {
                self.chats.remove_chat(chat_id, now);
                if existed {
                    self.toasts.success("Chat deleted");
                } else {
                    self.toasts.info("Chat was already deleted");
                }
                return vec![Task::LoadChats];
            }
            AppEvent::MessagesLoaded { chat_id, messages } => {
                if self.chats.open_chat == Some(chat_id) {
                    self.chats.transcript =
                        Some(stackchat_core::Transcript::with_messages(chat_id, messages));
                    self.chats.loading_messages = false;
                    self.chats.select_last_answer();
                }
            }
            AppEvent::SendProgress { stage, transcript } => {
                if self.chats.open_chat == Some(transcript.chat_id()) {
                    if stage == SendStage::RevealMarked {
                        self.chats.reveal = transcript.reveal_target().and_then(|id| {
                            transcript
                                .persisted()
                                .find(|m| m.id == id)
                                .map(|m| {
                                    TypingReveal::new(
                                        id,
                                        &m.display_text(),
                                        self.typing_speed,
                                        Instant::now(),
                                    )
                                })
                        });
                    }
                    self.chats.transcript = Some(transcript);
                    self.chats.loading_messages = false;
                    self.chats.select_last_answer();
                }
            }
            AppEvent::SendFinished { chat_id, failure } => {
                self.chats.sending = false;
                if let Some(failure) = failure {
                    return self.fail(failure);
                }
                debug!(chat_id = chat_id, "Send finished");
            }
            AppEvent::AccountLoaded(user) => {
                if let Some(Modal::Settings(form)) = self.modal.as_mut() {
                    if !form.saving {
                        form.fill(&user);
                    }
                }
                self.user = Some(user);
            }
            AppEvent::AccountUpdated(message) => {
                if let Some(Modal::Settings(form)) = self.modal.as_mut() {
                    form.saving = false;
                }
                self.toasts.success(message);
                return vec![Task::LoadAccount];
            }
            AppEvent::AccountDeleted => {
                self.reset_session();
                self.toasts.info("Account deleted");
                return vec![Task::StopTraining];
            }
            AppEvent::TrainingStarted { started } => {
                self.setup.starting = false;
                self.setup.snapshot = Default::default();
                if started {
                    self.setup.not_started = false;
                    return vec![Task::WatchTraining];
                }
                self.setup.not_started = true;
                self.toasts
                    .warning("The backend did not start a training task");
            }
            AppEvent::TrainingProgress(snapshot) => {
                let finished_now = snapshot.state == PollerState::Succeeded
                    && self.setup.snapshot.state != PollerState::Succeeded;
                self.setup.snapshot = snapshot;
                if finished_now {
                    self.toasts.success("Answer index is ready");
                }
            }
            AppEvent::Failed(failure) => return self.fail(failure),
        }
        Vec::new()
    }

    fn fail(&mut self, failure: TaskFailure) -> Vec<Task> {
        match failure.kind {
            TaskKind::Login => {
                self.login.submitting = false;
                self.login.error = Some(failure.message.clone());
            }
            TaskKind::SignUp => {
                self.signup.submitting = false;
                self.signup.error = Some(failure.message.clone());
            }
            TaskKind::LoadChats => self.chats.loading = false,
            TaskKind::LoadMessages => self.chats.loading_messages = false,
            TaskKind::UpdateAccount => {
                if let Some(Modal::Settings(form)) = self.modal.as_mut() {
                    form.saving = false;
                }
            }
            TaskKind::StartTraining => {
                self.setup.starting = false;
                self.setup.not_started = true;
            }
            _ => {}
        }

        let signed_in = !matches!(self.view, View::Login | View::SignUp);
        if failure.session_lost && signed_in {
            self.reset_session();
            self.toasts.warning("Session expired, please log in again");
            return vec![Task::StopTraining, Task::ClearSession];
        }
        self.toasts.error(failure.message);
        Vec::new()
    }

    fn reset_session(&mut self) {
        self.view = View::Login;
        self.login = LoginForm::new();
        self.chats = ChatsState::default();
        self.setup = SetupState::default();
        self.modal = None;
        self.dialog = None;
        self.user = None;
    }
}
