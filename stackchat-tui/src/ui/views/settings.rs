use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::data::SettingsForm;
use crate::theme::Theme;
use crate::ui::utils::centered_rect;
use crate::ui::widgets::{render_input, spinner};

pub fn render(frame: &mut Frame, screen: Rect, form: &SettingsForm, tick: u64, theme: &dyn Theme) {
    let area = centered_rect(56, 16, screen);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Settings ")
        .title_alignment(Alignment::Center)
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent()))
        .style(Style::default().bg(theme.surface()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    for (index, (field, label)) in form.fields.iter().zip(SettingsForm::LABELS).enumerate() {
        render_input(frame, rows[index], label, field, form.focus == index, theme);
    }

    let status = if !form.loaded {
        Line::from(Span::styled(
            format!("{} Loading account…", spinner::frame(tick)),
            Style::default().fg(theme.info()),
        ))
    } else if form.saving {
        Line::from(Span::styled(
            format!("{} Saving…", spinner::frame(tick)),
            Style::default().fg(theme.info()),
        ))
    } else {
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(theme.accent())),
            Span::styled(" save  ", Style::default().fg(theme.foreground_dim())),
            Span::styled("^L", Style::default().fg(theme.accent())),
            Span::styled(" log out  ", Style::default().fg(theme.foreground_dim())),
            Span::styled("^D", Style::default().fg(theme.error())),
            Span::styled(" delete account", Style::default().fg(theme.foreground_dim())),
        ])
    };
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), rows[3]);
}
