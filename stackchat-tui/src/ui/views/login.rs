use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::theme::Theme;
use crate::ui::utils::centered_rect;
use crate::ui::widgets::render_input;

pub fn render(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let form = &app.login;
    let card = centered_rect(52, 15, area);

    let block = Block::default()
        .title(" Welcome back ")
        .title_alignment(Alignment::Center)
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent()))
        .style(Style::default().bg(theme.background()));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(inner);

    render_input(frame, rows[0], app.login_label(), &form.identifier, form.focus == 0, theme);
    render_input(frame, rows[1], "Password", &form.password, form.focus == 1, theme);

    let status = if form.submitting {
        Span::styled("Logging in…", Style::default().fg(theme.info()))
    } else if let Some(error) = &form.error {
        Span::styled(error.clone(), Style::default().fg(theme.error()))
    } else {
        Span::raw("")
    };
    frame.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[2],
    );

    let hint = Line::from(vec![
        Span::styled("No account yet? Press ", Style::default().fg(theme.foreground_dim())),
        Span::styled(
            "F2",
            Style::default()
                .fg(theme.accent_secondary())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" to sign up.", Style::default().fg(theme.foreground_dim())),
    ]);
    frame.render_widget(Paragraph::new(hint).alignment(Alignment::Center), rows[3]);
}
