//! Transcript state and the message send flow.
//!
//! A transcript holds persisted messages plus at most one client-only
//! placeholder shown while the answer is being generated. Sending a message
//! always re-reads the canonical list from the backend after each write, so
//! the transcript never diverges from what the server stored.

use tracing::{debug, info};

use crate::api::ChatBackend;
use crate::error::{StackchatError, StackchatResult};
use crate::models::Message;

/// Placeholder shown while waiting for an answer. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub prompt: String,
}

impl PendingReply {
    pub const LABEL: &'static str = "thinking ...";
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Persisted(Message),
    Pending(PendingReply),
}

impl TranscriptEntry {
    pub fn message(&self) -> Option<&Message> {
        match self {
            TranscriptEntry::Persisted(m) => Some(m),
            TranscriptEntry::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TranscriptEntry::Pending(_))
    }

    /// User turns render on the right, everything else on the left.
    pub fn is_user(&self) -> bool {
        match self {
            TranscriptEntry::Persisted(m) => m.is_user,
            TranscriptEntry::Pending(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    chat_id: i64,
    entries: Vec<TranscriptEntry>,
    reveal: Option<i64>,
}

impl Transcript {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            entries: Vec::new(),
            reveal: None,
        }
    }

    pub fn with_messages(chat_id: i64, messages: Vec<Message>) -> Self {
        let mut transcript = Self::new(chat_id);
        transcript.replace_persisted(messages);
        transcript
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Swap in the canonical list. Any placeholder is dropped.
    pub fn replace_persisted(&mut self, messages: Vec<Message>) {
        self.entries = messages.into_iter().map(TranscriptEntry::Persisted).collect();
    }

    pub fn push_pending(&mut self, prompt: impl Into<String>) {
        self.entries.push(TranscriptEntry::Pending(PendingReply {
            prompt: prompt.into(),
        }));
    }

    pub fn has_pending(&self) -> bool {
        self.entries.iter().any(TranscriptEntry::is_pending)
    }

    pub fn persisted(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(TranscriptEntry::message)
    }

    /// Last bot message scanning from the end; placeholders are skipped.
    pub fn last_bot_message(&self) -> Option<&Message> {
        self.entries
            .iter()
            .rev()
            .filter_map(TranscriptEntry::message)
            .find(|m| m.is_bot())
    }

    /// Mark the last bot message for the typing reveal.
    pub fn mark_reveal(&mut self) -> Option<i64> {
        self.reveal = self.last_bot_message().map(|m| m.id);
        self.reveal
    }

    pub fn reveal_target(&self) -> Option<i64> {
        self.reveal
    }

    pub fn clear_reveal(&mut self) {
        self.reveal = None;
    }
}

/// Visible steps of [`send_message`], reported through its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    PromptSaved,
    Thinking,
    AnswerSaved,
    RevealMarked,
}

/// Resolve the selected chat or fail before any request.
pub fn require_chat(selected: Option<i64>) -> StackchatResult<i64> {
    selected.ok_or(StackchatError::NoChatSelected)
}

/// Send `prompt` in the transcript's chat and fetch the answer.
///
/// Order: persist the user message, reload, show the placeholder, ask for an
/// answer, persist it as a bot message, reload, mark the newest bot message
/// for reveal. Errors propagate unchanged; when one happens after the
/// placeholder was added it stays in the transcript.
pub async fn send_message<B, F>(
    backend: &B,
    transcript: &mut Transcript,
    prompt: &str,
    mut on_update: F,
) -> StackchatResult<Option<i64>>
where
    B: ChatBackend + ?Sized,
    F: FnMut(SendStage, &Transcript) + Send,
{
    if prompt.trim().is_empty() {
        return Err(StackchatError::EmptyPrompt);
    }
    let chat_id = transcript.chat_id();
    debug!(chat_id = chat_id, "Sending message");

    backend.create_message(chat_id, prompt, true).await?;
    let messages = backend.list_messages(chat_id).await?;
    transcript.replace_persisted(messages);
    on_update(SendStage::PromptSaved, transcript);

    transcript.push_pending(prompt);
    on_update(SendStage::Thinking, transcript);

    let answer = backend.get_answer(prompt).await?;
    backend.create_message(chat_id, &answer, false).await?;
    let messages = backend.list_messages(chat_id).await?;
    transcript.replace_persisted(messages);
    on_update(SendStage::AnswerSaved, transcript);

    let revealed = transcript.mark_reveal();
    on_update(SendStage::RevealMarked, transcript);
    info!(chat_id = chat_id, "Answer received");
    Ok(revealed)
}
