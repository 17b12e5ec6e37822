use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};
use stackchat_core::PollerState;

use crate::theme::Theme;

/// Training progress gauge, colored by poller state.
pub fn render_training_gauge(
    frame: &mut Frame,
    area: Rect,
    percent: u8,
    state: PollerState,
    theme: &dyn Theme,
) {
    let color = match state {
        PollerState::Succeeded => theme.success(),
        PollerState::Failed => theme.error(),
        PollerState::Aborted => theme.warning(),
        PollerState::Idle | PollerState::Polling => theme.accent(),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border())),
        )
        .gauge_style(Style::default().fg(color).bg(theme.surface()))
        .label(ratatui::text::Span::styled(
            format!("{}%", percent),
            Style::default()
                .fg(theme.foreground())
                .add_modifier(Modifier::BOLD),
        ))
        .percent(u16::from(percent.min(100)));

    frame.render_widget(gauge, area);
}
