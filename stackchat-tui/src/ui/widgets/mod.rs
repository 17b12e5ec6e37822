pub mod dialog;
pub mod footer;
pub mod header;
pub mod input;
pub mod progress_bar;
pub mod spinner;
pub mod toast;

pub use dialog::{ConfirmAction, ConfirmDialog, DialogButton};
pub use footer::Footer;
pub use header::Header;
pub use input::render_input;
pub use progress_bar::render_training_gauge;
pub use toast::{Toast, ToastLevel, ToastManager};
