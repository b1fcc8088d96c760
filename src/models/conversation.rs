use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::models::BookingRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    CollectingInfo,
    AwaitingConfirmation,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::CollectingInfo => "collecting_info",
            SessionState::AwaitingConfirmation => "awaiting_confirmation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// What kind of message the assistant last sent. Used to avoid stacking a
/// cheery acknowledgment on top of an error, and to avoid asking the same
/// question twice in a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyKind {
    Question,
    Error,
    Other,
}

/// One user's conversation. Owned exclusively by the dialogue engine; the
/// caller serializes turns per session.
pub struct ChatSession {
    pub history: Vec<ChatMessage>,
    pub state: SessionState,
    pub record: BookingRecord,
    /// Fixed at construction; anchors relative-date resolution and past-date
    /// rejection for the whole session.
    pub reference_date: NaiveDate,
    pub last_reply_kind: ReplyKind,
    pub rng: StdRng,
}

impl ChatSession {
    pub fn new(reference_date: NaiveDate, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            history: Vec::new(),
            state: SessionState::CollectingInfo,
            record: BookingRecord::default(),
            reference_date,
            last_reply_kind: ReplyKind::Other,
            rng,
        }
    }

    pub fn push_user(&mut self, content: &str) {
        self.history.push(ChatMessage {
            role: "user".to_string(),
            content: content.to_string(),
        });
    }

    pub fn push_assistant(&mut self, content: &str, kind: ReplyKind) {
        self.history.push(ChatMessage {
            role: "assistant".to_string(),
            content: content.to_string(),
        });
        self.last_reply_kind = kind;
    }

    /// Clears everything back to a fresh collecting state. The RNG keeps its
    /// stream so seeded phrasing stays reproducible across resets.
    pub fn clear(&mut self) {
        self.history.clear();
        self.record.clear();
        self.state = SessionState::CollectingInfo;
        self.last_reply_kind = ReplyKind::Other;
    }
}
