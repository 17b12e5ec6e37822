pub mod input;
pub mod state;
pub mod typing;

pub use input::TextInput;
pub use state::{
    cycle, ChatsFocus, ChatsState, LoginForm, SettingsForm, SetupState, SignUpForm,
};
pub use typing::TypingReveal;
