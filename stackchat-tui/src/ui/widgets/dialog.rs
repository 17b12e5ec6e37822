use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

/// What happens when a confirmation dialog is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteChat(i64),
    DeleteAccount,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogButton {
    Confirm,
    Cancel,
}

impl DialogButton {
    pub fn other(&self) -> Self {
        match self {
            DialogButton::Confirm => DialogButton::Cancel,
            DialogButton::Cancel => DialogButton::Confirm,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
    pub confirm_label: &'static str,
    pub destructive: bool,
    pub selected: DialogButton,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>, action: ConfirmAction) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            action,
            confirm_label: "Confirm",
            destructive: false,
            selected: DialogButton::Confirm,
        }
    }

    /// Destructive dialogs start on Cancel.
    pub fn danger(title: impl Into<String>, message: impl Into<String>, action: ConfirmAction) -> Self {
        Self {
            confirm_label: "Delete",
            destructive: true,
            selected: DialogButton::Cancel,
            ..Self::new(title, message, action)
        }
    }

    pub fn toggle(&mut self) {
        self.selected = self.selected.other();
    }

    pub fn is_confirm_selected(&self) -> bool {
        self.selected == DialogButton::Confirm
    }

    pub fn area(screen: Rect) -> Rect {
        let width = 52u16.min(screen.width.saturating_sub(4));
        let height = 9u16.min(screen.height.saturating_sub(2));
        Rect::new(
            screen.x + screen.width.saturating_sub(width) / 2,
            screen.y + screen.height.saturating_sub(height) / 2,
            width,
            height,
        )
    }

    pub fn render(&self, frame: &mut Frame, screen: Rect, theme: &dyn Theme) {
        let area = Self::area(screen);
        frame.render_widget(Clear, area);

        let border_color = if self.destructive {
            theme.error()
        } else {
            theme.accent()
        };
        let icon = if self.destructive { "⚠" } else { "?" };

        let block = Block::default()
            .title(format!(" {} {} ", icon, self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(
                Style::default()
                    .fg(border_color)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(theme.surface()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                self.message.clone(),
                Style::default().fg(theme.foreground()),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let selected = |button: DialogButton, color| {
            if self.selected == button {
                Style::default()
                    .fg(theme.background())
                    .bg(color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            }
        };

        let buttons = Line::from(vec![
            Span::styled(" Cancel ", selected(DialogButton::Cancel, theme.foreground())),
            Span::raw("    "),
            Span::styled(
                format!(" {} ", self.confirm_label),
                selected(DialogButton::Confirm, border_color),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}
