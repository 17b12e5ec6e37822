use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

use super::views;
use super::widgets::{Footer, Header};
use crate::app::{App, Modal, View};

/// Draw one frame: header, active view, footer, then overlays.
pub fn render(frame: &mut Frame, app: &App) {
    let theme = app.theme_manager.current_theme();
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background()).fg(theme.foreground())),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let account = app.user.as_ref().map(|u| u.full_name());
    Header {
        view: app.view.name(),
        account: account.as_deref(),
        theme_name: theme.name(),
    }
    .render(frame, chunks[0], theme);

    match app.view {
        View::Login => views::login::render(frame, chunks[1], app, theme),
        View::SignUp => views::signup::render(frame, chunks[1], app, theme),
        View::Chats => views::chats::render(frame, chunks[1], app, theme),
        View::DatabaseSetup => views::setup::render(frame, chunks[1], app, theme),
    }

    let hints = app.key_hints();
    Footer {
        keybinds: &hints,
        status: app.status_message(),
    }
    .render(frame, chunks[2], theme);

    match &app.modal {
        Some(Modal::NewChat(input)) => views::chats::render_new_chat(frame, area, input, theme),
        Some(Modal::Settings(form)) => {
            views::settings::render(frame, area, form, app.animation_tick, theme)
        }
        None => {}
    }

    if let Some(dialog) = &app.dialog {
        dialog.render(frame, area, theme);
    }

    app.toasts.render(frame, area, theme);
}
