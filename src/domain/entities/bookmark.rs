use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message saved by a user for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(
        user_id: impl Into<String>,
        guild_id: impl Into<String>,
        channel_id: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
            message_id: message_id.into(),
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
