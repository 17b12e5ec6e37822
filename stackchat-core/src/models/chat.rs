use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named conversation thread owned by a user.
///
/// The list endpoint sends `{id, chat_name, user_id, created_at}` while the
/// create endpoint answers `{chat_id, name, created_at}`; both decode here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(alias = "chat_id")]
    pub id: i64,

    #[serde(alias = "name")]
    pub chat_name: String,

    #[serde(alias = "user_id", default)]
    pub user: Option<i64>,

    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: i64, chat_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            chat_name: chat_name.into(),
            user: None,
            created_at,
        }
    }
}

/// Newest first. Stable, so equal timestamps keep server order.
pub fn sort_newest_first(chats: &mut [Chat]) {
    chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
