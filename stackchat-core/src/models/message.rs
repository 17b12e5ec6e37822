use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A source snippet backing a bot answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(alias = "page_content")]
    pub content: String,

    /// Similarity in `0.0..=1.0`. The backend sends either a float or a
    /// percentage string such as `"93.12%"`.
    #[serde(alias = "similarity", deserialize_with = "deserialize_score", default)]
    pub score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Reference {
    pub fn score_percent(&self) -> String {
        format!("{:.2}%", self.score * 100.0)
    }
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
    }

    match RawScore::deserialize(deserializer)? {
        RawScore::Number(n) => Ok(n),
        RawScore::Text(s) => parse_score(&s).map_err(serde::de::Error::custom),
    }
}

fn parse_score(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    match trimmed.strip_suffix('%') {
        Some(pct) => pct
            .trim()
            .parse::<f64>()
            .map(|v| v / 100.0)
            .map_err(|e| format!("invalid percentage '{}': {}", raw, e)),
        None => trimmed
            .parse::<f64>()
            .map_err(|e| format!("invalid score '{}': {}", raw, e)),
    }
}

/// How a message's text should be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Plain(String),
    Answer {
        response: String,
        references: Vec<Reference>,
    },
}

impl MessageBody {
    /// Parse stored text. JSON envelopes (an object or a one-element array of
    /// objects with a `response` field) become [`MessageBody::Answer`];
    /// anything else is plain text.
    pub fn parse(text: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            response: String,
            #[serde(default)]
            references: Vec<Reference>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Single(Envelope),
            Many(Vec<Envelope>),
        }

        let trimmed = text.trim_start();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            return MessageBody::Plain(text.to_string());
        }

        let envelope = match serde_json::from_str::<Shape>(text) {
            Ok(Shape::Single(e)) => Some(e),
            Ok(Shape::Many(list)) => list.into_iter().next(),
            Err(_) => None,
        };

        match envelope {
            Some(e) => MessageBody::Answer {
                response: e.response,
                references: e.references,
            },
            None => MessageBody::Plain(text.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            MessageBody::Plain(t) => t,
            MessageBody::Answer { response, .. } => response,
        }
    }
}

/// One persisted turn of a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,

    #[serde(deserialize_with = "deserialize_text")]
    pub text: String,

    pub is_user: bool,

    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,

    #[serde(alias = "chat_id", default)]
    pub chat: Option<i64>,
}

/// Listings return envelope text already decoded; keep it as JSON text.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        other => serde_json::to_string(&other).map_err(serde::de::Error::custom),
    }
}

impl Message {
    pub fn body(&self) -> MessageBody {
        MessageBody::parse(&self.text)
    }

    /// Text to display: the envelope's `response` or the raw text.
    pub fn display_text(&self) -> String {
        self.body().text().to_string()
    }

    /// References are only ever shown for bot messages.
    pub fn references(&self) -> Vec<Reference> {
        if self.is_user {
            return Vec::new();
        }
        match self.body() {
            MessageBody::Answer { references, .. } => references,
            MessageBody::Plain(_) => Vec::new(),
        }
    }

    pub fn is_bot(&self) -> bool {
        !self.is_user
    }
}

/// Body of the create-message request.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub is_user: bool,
}
