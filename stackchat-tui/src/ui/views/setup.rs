use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use stackchat_core::{PollerState, TrainingStage};

use crate::app::App;
use crate::theme::Theme;
use crate::ui::utils::centered_rect;
use crate::ui::widgets::{render_training_gauge, spinner};

pub fn render(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let setup = &app.setup;
    let card = centered_rect(70, 18, area);

    let block = Block::default()
        .title(" Set up the answer database ")
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
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(1),
        ])
        .split(inner);

    let status = if setup.starting {
        Line::from(Span::styled(
            format!("{} Requesting a training task...", spinner::frame(app.animation_tick)),
            Style::default().fg(theme.info()),
        ))
    } else if setup.not_started {
        Line::from(Span::styled(
            "Training was not started.",
            Style::default().fg(theme.warning()),
        ))
    } else {
        let color = match setup.snapshot.state {
            PollerState::Succeeded => theme.success(),
            PollerState::Failed => theme.error(),
            PollerState::Aborted => theme.warning(),
            _ => theme.foreground(),
        };
        let mut spans = Vec::new();
        if setup.snapshot.state == PollerState::Polling {
            spans.push(Span::styled(
                format!("{} ", spinner::frame(app.animation_tick)),
                Style::default().fg(theme.accent()),
            ));
        }
        spans.push(Span::styled(
            setup.status_line(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        Line::from(spans)
    };
    frame.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[0],
    );

    render_training_gauge(
        frame,
        rows[1],
        setup.snapshot.progress.percent,
        setup.snapshot.state,
        theme,
    );

    let reached = setup.snapshot.progress.percent;
    let steps: Vec<Line> = TrainingStage::ALL
        .iter()
        .skip(1)
        .map(|stage| {
            let done = reached >= stage.percent();
            let (mark, color) = if done {
                ("✔", theme.success())
            } else {
                ("·", theme.foreground_dim())
            };
            Line::from(vec![
                Span::styled(format!(" {} ", mark), Style::default().fg(color)),
                Span::styled(
                    format!("{:>3}%  {}", stage.percent(), stage.phrase()),
                    Style::default().fg(if done {
                        theme.foreground()
                    } else {
                        theme.foreground_dim()
                    }),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(steps), rows[2]);

    let action = if setup.can_continue() {
        Line::from(vec![
            Span::styled(
                " Enter ",
                Style::default()
                    .fg(theme.background())
                    .bg(theme.success())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" Start chat", Style::default().fg(theme.success())),
        ])
    } else if setup.can_retry() {
        Line::from(Span::styled(
            "Press r to try again, Esc to go back.",
            Style::default().fg(theme.foreground_dim()),
        ))
    } else {
        Line::from(Span::styled(
            "This can take a few minutes. Esc stops watching.",
            Style::default().fg(theme.foreground_dim()),
        ))
    };
    frame.render_widget(Paragraph::new(action).alignment(Alignment::Center), rows[3]);
}
