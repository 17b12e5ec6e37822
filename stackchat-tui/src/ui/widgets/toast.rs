use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Info => "ℹ",
            ToastLevel::Success => "✓",
            ToastLevel::Warning => "⚠",
            ToastLevel::Error => "✗",
        }
    }

    /// Errors stay up longer so the message can be read.
    fn lifetime(&self) -> Duration {
        match self {
            ToastLevel::Error => Duration::from_secs(6),
            _ => Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration: level.lifetime(),
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }
}

#[derive(Debug)]
pub struct ToastManager {
    toasts: Vec<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: Vec::new(),
            max_visible: 4,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Success));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Error));
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn cleanup(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired_at(now));
    }

    /// Newest first.
    pub fn visible_toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().rev().take(self.max_visible)
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn count(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn render(&self, frame: &mut Frame, screen: Rect, theme: &dyn Theme) {
        let width = 44u16.min(screen.width.saturating_sub(4));
        let height = 4u16;
        let x = screen.width.saturating_sub(width + 2);
        let mut y = 2u16;

        for toast in self.visible_toasts() {
            if y + height > screen.height {
                break;
            }
            render_toast(frame, Rect::new(x, y, width, height), toast, theme);
            y += height;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast, theme: &dyn Theme) {
    frame.render_widget(Clear, area);

    let color = match toast.level {
        ToastLevel::Info => theme.info(),
        ToastLevel::Success => theme.success(),
        ToastLevel::Warning => theme.warning(),
        ToastLevel::Error => theme.error(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme.surface()));

    let text = Line::from(vec![
        Span::styled(
            format!("{} ", toast.level.icon()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(toast.message.clone(), Style::default().fg(theme.foreground())),
    ]);

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
