use std::time::{Duration, Instant};

/// Character-by-character reveal of a freshly received answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingReveal {
    message_id: i64,
    total: usize,
    started: Instant,
    per_char: Duration,
}

impl TypingReveal {
    pub fn new(message_id: i64, text: &str, per_char: Duration, now: Instant) -> Self {
        Self {
            message_id,
            total: text.chars().count(),
            started: now,
            per_char,
        }
    }

    pub fn message_id(&self) -> i64 {
        self.message_id
    }

    pub fn visible_chars(&self, now: Instant) -> usize {
        if self.per_char.is_zero() {
            return self.total;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let shown = elapsed.as_millis() / self.per_char.as_millis().max(1);
        (shown as usize).min(self.total)
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.visible_chars(now) >= self.total
    }

    /// Prefix of `text` visible at `now`.
    pub fn apply<'a>(&self, text: &'a str, now: Instant) -> &'a str {
        let n = self.visible_chars(now);
        match text.char_indices().nth(n) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }
}
