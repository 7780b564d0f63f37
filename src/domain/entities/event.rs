use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message posted in a guild channel. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub guild_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub from_bot: bool,
    #[serde(default)]
    pub mentions_everyone: bool,
    #[serde(default)]
    pub mentions_here: bool,
    #[serde(default)]
    pub role_mentions: Vec<String>,
}

impl MessageEvent {
    pub fn new(
        guild_id: impl Into<String>,
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            timestamp: Utc::now(),
            from_bot: false,
            mentions_everyone: false,
            mentions_here: false,
            role_mentions: Vec::new(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn from_bot(mut self, from_bot: bool) -> Self {
        self.from_bot = from_bot;
        self
    }

    pub fn with_everyone_mention(mut self) -> Self {
        self.mentions_everyone = true;
        self
    }

    pub fn with_here_mention(mut self) -> Self {
        self.mentions_here = true;
        self
    }

    pub fn with_role_mention(mut self, role_id: impl Into<String>) -> Self {
        self.role_mentions.push(role_id.into());
        self
    }
}

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberChange {
    Join,
    Leave,
}

/// A member joining or leaving a guild. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEvent {
    pub guild_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub change: MemberChange,
}

impl MemberEvent {
    pub fn new(
        guild_id: impl Into<String>,
        user_id: impl Into<String>,
        change: MemberChange,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: user_id.into(),
            timestamp: Utc::now(),
            change,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Anything an event source can deliver to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    Message(MessageEvent),
    Member(MemberEvent),
}
