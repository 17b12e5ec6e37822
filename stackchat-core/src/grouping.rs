//! Sidebar buckets for chats, by whole days elapsed since creation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Chat;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatGroup {
    Today,
    Yesterday,
    Last7Days,
    Older,
}

impl ChatGroup {
    pub const ALL: [ChatGroup; 4] = [
        ChatGroup::Today,
        ChatGroup::Yesterday,
        ChatGroup::Last7Days,
        ChatGroup::Older,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ChatGroup::Today => "Today",
            ChatGroup::Yesterday => "Yesterday",
            ChatGroup::Last7Days => "Last 7 days",
            ChatGroup::Older => "Older chats",
        }
    }

    /// Bucket for a whole-day difference. Negative differences (clock skew)
    /// count as today.
    pub fn for_days(days: i64) -> Self {
        match days {
            i64::MIN..=0 => ChatGroup::Today,
            1 => ChatGroup::Yesterday,
            2..=7 => ChatGroup::Last7Days,
            _ => ChatGroup::Older,
        }
    }
}

impl std::fmt::Display for ChatGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// `floor((now - created_at) / 1 day)`.
pub fn days_between(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (now - created_at).num_seconds();
    secs.div_euclid(SECONDS_PER_DAY)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatGroups {
    pub today: Vec<Chat>,
    pub yesterday: Vec<Chat>,
    pub last_7_days: Vec<Chat>,
    pub older: Vec<Chat>,
}

impl ChatGroups {
    pub fn get(&self, group: ChatGroup) -> &[Chat] {
        match group {
            ChatGroup::Today => &self.today,
            ChatGroup::Yesterday => &self.yesterday,
            ChatGroup::Last7Days => &self.last_7_days,
            ChatGroup::Older => &self.older,
        }
    }

    fn get_mut(&mut self, group: ChatGroup) -> &mut Vec<Chat> {
        match group {
            ChatGroup::Today => &mut self.today,
            ChatGroup::Yesterday => &mut self.yesterday,
            ChatGroup::Last7Days => &mut self.last_7_days,
            ChatGroup::Older => &mut self.older,
        }
    }

    /// Groups in display order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (ChatGroup, &[Chat])> {
        ChatGroup::ALL.into_iter().map(move |g| (g, self.get(g)))
    }

    /// Non-empty groups in display order.
    pub fn non_empty(&self) -> impl Iterator<Item = (ChatGroup, &[Chat])> {
        self.iter().filter(|(_, chats)| !chats.is_empty())
    }

    pub fn len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.last_7_days.len() + self.older.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chats flattened in display order.
    pub fn flatten(&self) -> Vec<&Chat> {
        self.iter().flat_map(|(_, chats)| chats.iter()).collect()
    }
}

/// Partition `chats` into date buckets, keeping input order inside each bucket.
pub fn group_chats_by_date(chats: &[Chat], now: DateTime<Utc>) -> ChatGroups {
    let mut groups = ChatGroups::default();
    for chat in chats {
        let group = ChatGroup::for_days(days_between(chat.created_at, now));
        groups.get_mut(group).push(chat.clone());
    }
    groups
}
