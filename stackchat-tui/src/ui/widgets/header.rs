use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme::Theme;

pub struct Header<'a> {
    pub view: &'a str,
    pub account: Option<&'a str>,
    pub theme_name: &'a str,
}

impl Header<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &dyn Theme) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border()))
            .style(Style::default().bg(theme.background()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(40)])
            .split(inner);

        let title = Line::from(vec![
            Span::styled(" ◆ Stackchat ", theme.title_style()),
            Span::styled("│ ", Style::default().fg(theme.border())),
            Span::styled(
                self.view.to_string(),
                Style::default()
                    .fg(theme.accent_secondary())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), chunks[0]);

        let account = match self.account {
            Some(name) => Span::styled(name.to_string(), Style::default().fg(theme.foreground())),
            None => Span::styled("signed out", Style::default().fg(theme.foreground_dim())),
        };
        let right = Line::from(vec![
            account,
            Span::styled(
                format!("  [{}] ", self.theme_name),
                Style::default().fg(theme.foreground_dim()),
            ),
        ]);
        frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), chunks[1]);
    }
}
