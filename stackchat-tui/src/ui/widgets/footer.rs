use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme::Theme;

pub struct Footer<'a> {
    pub keybinds: &'a [(&'static str, &'static str)],
    pub status: Option<&'a str>,
}

impl Footer<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &dyn Theme) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.border()))
            .style(Style::default().bg(theme.background()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(36)])
            .split(inner);

        let mut spans = Vec::with_capacity(self.keybinds.len() * 3);
        for (key, action) in self.keybinds {
            spans.push(Span::styled(
                format!(" {} ", key),
                Style::default()
                    .fg(theme.background())
                    .bg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {} ", action),
                Style::default().fg(theme.foreground_dim()),
            ));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

        if let Some(status) = self.status {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    status.to_string(),
                    Style::default().fg(theme.info()),
                ))
                .alignment(Alignment::Right),
                chunks[1],
            );
        }
    }
}
