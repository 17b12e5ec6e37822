use std::time::Instant;

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use stackchat_core::{PendingReply, TranscriptEntry};

use crate::app::App;
use crate::data::{ChatsFocus, ChatsState, TextInput};
use crate::theme::Theme;
use crate::ui::utils::{centered_rect, truncate, wrap_text};
use crate::ui::widgets::{render_input, spinner};

pub fn render(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);

    render_sidebar(frame, columns[0], &app.chats, theme);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(columns[1]);

    let show_references = app
        .chats
        .selected_message()
        .is_some_and(|m| !m.references().is_empty());
    let body = if show_references {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(38)])
            .split(main[0])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30)])
            .split(main[0])
    };

    render_transcript(frame, body[0], app, theme);
    if show_references {
        render_references(frame, body[1], &app.chats, theme);
    }

    let label = if app.chats.sending {
        "Waiting for the answer"
    } else {
        "Message"
    };
    render_input(
        frame,
        main[1],
        label,
        &app.chats.input,
        app.chats.focus == ChatsFocus::Input && app.modal.is_none() && app.dialog.is_none(),
        theme,
    );
}

fn render_sidebar(frame: &mut Frame, area: Rect, chats: &ChatsState, theme: &dyn Theme) {
    let block = Block::default()
        .title(" Chats ")
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(theme.border_style(chats.focus == ChatsFocus::Sidebar))
        .style(Style::default().bg(theme.background()));

    if chats.chats.is_empty() {
        let text = if chats.loading {
            "Loading…"
        } else {
            "No chats yet.\nPress n to create one."
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(theme.foreground_dim()))
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let mut items = Vec::new();
    let mut highlighted = None;
    let mut index = 0usize;

    for (group, group_chats) in chats.groups(Utc::now()).non_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            group.title(),
            Style::default()
                .fg(theme.accent_secondary())
                .add_modifier(Modifier::BOLD),
        ))));
        for chat in group_chats {
            if index == chats.selected {
                highlighted = Some(items.len());
            }
            let open = chats.open_chat == Some(chat.id);
            let marker = if open { "● " } else { "  " };
            items.push(ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.accent())),
                Span::styled(
                    truncate(&chat.chat_name, width),
                    Style::default().fg(theme.foreground()),
                ),
            ])));
            index += 1;
        }
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style());
    let mut state = ListState::default().with_selected(highlighted);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_transcript(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let chats = &app.chats;
    let title = match chats.open_chat_name() {
        Some(name) => format!(" {} ", name),
        None => " Conversation ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(theme.border_style(chats.focus == ChatsFocus::Transcript))
        .style(Style::default().bg(theme.background()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let placeholder = |text: &str| {
        Paragraph::new(text.to_string())
            .style(Style::default().fg(theme.foreground_dim()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
    };

    let Some(transcript) = chats.transcript.as_ref() else {
        let text = if chats.loading_messages {
            "Loading messages…"
        } else {
            "Select a chat on the left and press Enter."
        };
        frame.render_widget(placeholder(text), inner);
        return;
    };
    if transcript.is_empty() {
        frame.render_widget(placeholder("Ask your first question below."), inner);
        return;
    }

    let now = Instant::now();
    let bubble = (inner.width as usize * 3 / 4).max(10);
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_start = None;

    for (index, entry) in transcript.entries().iter().enumerate() {
        let selected = chats.selected_answer == Some(index);
        if selected {
            selected_start = Some(lines.len());
        }

        match entry {
            TranscriptEntry::Persisted(message) if message.is_user => {
                lines.push(
                    Line::from(Span::styled(
                        "You",
                        Style::default()
                            .fg(theme.accent())
                            .add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Right),
                );
                for text in wrap_text(&message.display_text(), bubble) {
                    lines.push(
                        Line::from(Span::styled(text, Style::default().fg(theme.foreground())))
                            .alignment(Alignment::Right),
                    );
                }
            }
            TranscriptEntry::Persisted(message) => {
                let marker = if selected { "▶ " } else { "" };
                lines.push(Line::from(Span::styled(
                    format!("{}Stackchat", marker),
                    Style::default()
                        .fg(theme.accent_secondary())
                        .add_modifier(Modifier::BOLD),
                )));
                let full = message.display_text();
                let shown = match &chats.reveal {
                    Some(reveal) if reveal.message_id() == message.id => {
                        reveal.apply(&full, now).to_string()
                    }
                    _ => full,
                };
                for text in wrap_text(&shown, bubble) {
                    lines.push(Line::from(Span::styled(
                        text,
                        Style::default().fg(theme.foreground()),
                    )));
                }
            }
            TranscriptEntry::Pending(_) => {
                lines.push(Line::from(Span::styled(
                    "Stackchat",
                    Style::default()
                        .fg(theme.accent_secondary())
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    format!("{} {}", spinner::frame(app.animation_tick), PendingReply::LABEL),
                    Style::default()
                        .fg(theme.foreground_dim())
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
        lines.push(Line::raw(""));
    }

    let height = inner.height as usize;
    let mut offset = lines.len().saturating_sub(height);
    if chats.focus == ChatsFocus::Transcript {
        if let Some(start) = selected_start {
            if start < offset {
                offset = start;
            }
        }
    }

    frame.render_widget(
        Paragraph::new(lines).scroll((offset.min(u16::MAX as usize) as u16, 0)),
        inner,
    );
}

fn render_references(frame: &mut Frame, area: Rect, chats: &ChatsState, theme: &dyn Theme) {
    let block = Block::default()
        .title(" References ")
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border()))
        .style(Style::default().bg(theme.surface()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(message) = chats.selected_message() else {
        return;
    };

    let width = inner.width.saturating_sub(1) as usize;
    let mut lines = Vec::new();
    for (index, reference) in message.references().iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("#{} ", index + 1),
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(reference.score_percent(), Style::default().fg(theme.success())),
        ]));
        for text in wrap_text(&reference.content, width).into_iter().take(6) {
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(theme.foreground_dim()),
            )));
        }
        lines.push(Line::raw(""));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

pub fn render_new_chat(frame: &mut Frame, screen: Rect, input: &TextInput, theme: &dyn Theme) {
    let area = centered_rect(50, 7, screen);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" New chat ")
        .title_alignment(Alignment::Center)
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent()))
        .style(Style::default().bg(theme.surface()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);
    render_input(frame, rows[0], "Name", input, true, theme);
    frame.render_widget(
        Paragraph::new(Span::styled(
            "Enter to create, Esc to cancel",
            Style::default().fg(theme.foreground_dim()),
        ))
        .alignment(Alignment::Center),
        rows[1],
    );
}
