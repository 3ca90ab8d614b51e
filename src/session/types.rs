use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use strum::{AsRefStr, Display};

/// Caller identity as supplied by the message channel (Telegram `from.id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry of a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-user conversation state. `history` is sent verbatim as prompt context,
/// oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: UserId,
    pub history: Vec<Message>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: UserId, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            history: Vec::new(),
            last_active_at: now,
        }
    }

    /// Strictly greater than the timeout: a session idle for exactly
    /// `idle_timeout` is still live.
    pub fn is_expired(&self, idle_timeout: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_active_at) > idle_timeout
    }
}

/// Point-in-time view of a live session, used by `/listusers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub identity: UserId,
    pub message_count: usize,
    pub idle_secs: i64,
}
