//! Activity tracker - per-guild event ingestion and persistence

use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::application::errors::StorageError;
use crate::domain::entities::{
    ActivityEvent, GuildActivityLog, MemberEvent, MessageEvent, MEMBER_LOG_CAP, MESSAGE_LOG_CAP,
};
use crate::domain::traits::KeyValueStore;

/// Fixed key under which the whole per-guild map is persisted.
pub const STORAGE_KEY: &str = "guildpulse:activity";

/// Ingestion-time settings for the tracker.
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub enabled: bool,
    /// Count bot-authored messages (off by default).
    pub count_bots: bool,
    /// Maintain mention counters at ingestion time.
    pub track_mentions: bool,
    /// Retention horizon in days; events older than this are pruned at save time.
    pub retention_days: u32,
    pub message_log_cap: usize,
    pub member_log_cap: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            count_bots: false,
            track_mentions: true,
            retention_days: 30,
            message_log_cap: MESSAGE_LOG_CAP,
            member_log_cap: MEMBER_LOG_CAP,
        }
    }
}

/// Owns the per-guild activity logs and applies ingestion filters.
///
/// Explicitly constructed and passed by reference; there is no ambient
/// global instance. Ingestion never fails visibly: filtered or malformed
/// events are dropped with a debug log.
pub struct ActivityTracker {
    settings: TrackerSettings,
    guilds: HashMap<String, GuildActivityLog>,
}

impl ActivityTracker {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            settings,
            guilds: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Dispatch any activity event to the right recorder.
    pub fn record(&mut self, event: ActivityEvent) {
        match event {
            ActivityEvent::Message(e) => self.record_message(e),
            ActivityEvent::Member(e) => self.record_member(e),
        }
    }

    pub fn record_message(&mut self, event: MessageEvent) {
        if !self.settings.enabled {
            return;
        }
        if event.guild_id.is_empty() {
            tracing::debug!("Dropping message event without guild id");
            return;
        }
        if event.from_bot && !self.settings.count_bots {
            tracing::debug!(guild = %event.guild_id, "Dropping bot-authored message");
            return;
        }

        let track_mentions = self.settings.track_mentions;
        let cap = self.settings.message_log_cap;
        self.guilds
            .entry(event.guild_id.clone())
            .or_insert_with(GuildActivityLog::new)
            .record_message(event, track_mentions, cap);
    }

    pub fn record_member(&mut self, event: MemberEvent) {
        if !self.settings.enabled {
            return;
        }
        if event.guild_id.is_empty() {
            tracing::debug!("Dropping member event without guild id");
            return;
        }

        let cap = self.settings.member_log_cap;
        self.guilds
            .entry(event.guild_id.clone())
            .or_insert_with(GuildActivityLog::new)
            .record_member(event, cap);
    }

    /// Look up a guild's log; `None` if the guild has never produced an event.
    pub fn guild(&self, guild_id: &str) -> Option<&GuildActivityLog> {
        self.guilds.get(guild_id)
    }

    pub fn guild_ids(&self) -> Vec<String> {
        self.guilds.keys().cloned().collect()
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Drop data older than the retention horizon across all guilds.
    pub fn prune(&mut self) {
        let cutoff = Utc::now() - Duration::days(self.settings.retention_days as i64);
        for log in self.guilds.values_mut() {
            log.prune(cutoff);
        }
        self.guilds.retain(|_, log| !log.is_empty());
    }

    /// Load previously saved state, starting empty on any failure.
    pub async fn load(settings: TrackerSettings, store: &dyn KeyValueStore) -> Self {
        let guilds = match store.get(STORAGE_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(guilds) => guilds,
                Err(e) => {
                    tracing::warn!("Failed to parse saved activity data, starting fresh: {}", e);
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read saved activity data, starting fresh: {}", e);
                HashMap::new()
            }
        };

        tracing::info!(guilds = guilds.len(), "Activity tracker loaded");
        Self { settings, guilds }
    }

    /// Prune to the retention horizon and persist the whole map as one blob.
    pub async fn save(&mut self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        self.prune();
        let blob = serde_json::to_string(&self.guilds)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        store.set(STORAGE_KEY, &blob).await?;
        tracing::debug!(guilds = self.guilds.len(), bytes = blob.len(), "Activity state saved");
        Ok(())
    }
}
