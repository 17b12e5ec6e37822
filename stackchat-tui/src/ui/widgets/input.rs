use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::data::TextInput;
use crate::theme::Theme;

/// Bordered single-line field. Places the terminal cursor when focused.
pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &TextInput,
    focused: bool,
    theme: &dyn Theme,
) {
    let block = Block::default()
        .title(format!(" {} ", label))
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .style(Style::default().bg(theme.surface()));
    let inner = block.inner(area);

    let text = input.display();
    let width = inner.width.saturating_sub(1) as usize;
    let skip = input.cursor().saturating_sub(width);
    let visible: String = text.chars().skip(skip).collect();

    frame.render_widget(
        Paragraph::new(Span::styled(visible, Style::default().fg(theme.foreground())))
            .block(block),
        area,
    );

    if focused && inner.width > 0 {
        let x = inner.x + (input.cursor() - skip) as u16;
        frame.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
    }
}
