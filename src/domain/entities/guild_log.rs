use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{MemberChange, MemberEvent, MessageEvent};

/// Maximum retained message events per guild (FIFO eviction past this).
pub const MESSAGE_LOG_CAP: usize = 1000;
/// Maximum retained membership events per guild.
pub const MEMBER_LOG_CAP: usize = 500;

/// Running mention counters for a guild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionCounters {
    pub everyone: u64,
    pub here: u64,
    pub roles: HashMap<String, u64>,
}

/// Per-guild activity state: bounded event logs plus derived counters.
///
/// Counters are updated incrementally on insert and never recomputed;
/// FIFO eviction does not decrement them, so they cover the full horizon
/// of everything ever ingested. Windowed queries re-tally from the raw
/// logs instead (see `analytics`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildActivityLog {
    pub messages: VecDeque<MessageEvent>,
    pub members: VecDeque<MemberEvent>,
    /// Hour-of-day histogram, bucket 0 = 00:00-00:59 UTC.
    pub hourly: [u64; 24],
    /// Calendar-day histogram, pruned by the retention horizon at save time.
    pub daily: BTreeMap<chrono::NaiveDate, u64>,
    pub channels: HashMap<String, u64>,
    pub users: HashMap<String, u64>,
    pub mentions: MentionCounters,
    pub total_joins: u64,
    pub total_leaves: u64,
}

impl GuildActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message event and bump the incremental counters in O(1).
    pub fn record_message(&mut self, event: MessageEvent, track_mentions: bool, cap: usize) {
        self.hourly[event.timestamp.hour() as usize] += 1;
        *self.daily.entry(event.timestamp.date_naive()).or_insert(0) += 1;
        *self.channels.entry(event.channel_id.clone()).or_insert(0) += 1;
        *self.users.entry(event.user_id.clone()).or_insert(0) += 1;

        if track_mentions {
            if event.mentions_everyone {
                self.mentions.everyone += 1;
            }
            if event.mentions_here {
                self.mentions.here += 1;
            }
            for role in &event.role_mentions {
                *self.mentions.roles.entry(role.clone()).or_insert(0) += 1;
            }
        }

        self.messages.push_back(event);
        while self.messages.len() > cap {
            self.messages.pop_front();
        }
    }

    /// Append a membership event.
    pub fn record_member(&mut self, event: MemberEvent, cap: usize) {
        match event.change {
            MemberChange::Join => self.total_joins += 1,
            MemberChange::Leave => self.total_leaves += 1,
        }

        self.members.push_back(event);
        while self.members.len() > cap {
            self.members.pop_front();
        }
    }

    /// Drop events and day buckets older than `cutoff`. Runs at save time.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) {
        self.messages.retain(|m| m.timestamp > cutoff);
        self.members.retain(|m| m.timestamp > cutoff);
        let cutoff_date = cutoff.date_naive();
        self.daily.retain(|date, _| *date >= cutoff_date);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.members.is_empty()
    }
}
