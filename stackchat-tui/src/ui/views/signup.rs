use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use stackchat_core::MIN_PASSWORD_LEN;

use crate::app::App;
use crate::data::SignUpForm;
use crate::theme::Theme;
use crate::ui::utils::centered_rect;
use crate::ui::widgets::render_input;

pub fn render(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let form = &app.signup;
    let card = centered_rect(56, 24, area);

    let block = Block::default()
        .title(" Create an account ")
        .title_alignment(Alignment::Center)
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent()))
        .style(Style::default().bg(theme.background()));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let mut constraints = vec![Constraint::Length(3); form.fields.len()];
    constraints.push(Constraint::Min(2));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for (index, (field, label)) in form.fields.iter().zip(SignUpForm::LABELS).enumerate() {
        render_input(frame, rows[index], label, field, form.focus == index, theme);
    }

    let status = if form.submitting {
        Span::styled("Creating account…", Style::default().fg(theme.info()))
    } else if let Some(error) = &form.error {
        Span::styled(error.clone(), Style::default().fg(theme.error()))
    } else {
        Span::styled(
            format!(
                "At least {} characters with upper and lower case, a digit and a symbol.",
                MIN_PASSWORD_LEN
            ),
            Style::default().fg(theme.foreground_dim()),
        )
    };
    frame.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[form.fields.len()],
    );
}
