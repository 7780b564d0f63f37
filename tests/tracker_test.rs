//! Activity tracker integration tests
//! Run with: cargo test --test tracker_test

use std::sync::{Arc, Once};

use chrono::{Duration, TimeZone, Utc};
use tokio::sync::RwLock;

use guildpulse::application::services::{
    ActivityTracker, AutosaveTask, TrackerSettings, STORAGE_KEY,
};
use guildpulse::domain::traits::KeyValueStore;
use guildpulse::domain::entities::{
    GuildActivityLog, MemberChange, MemberEvent, MessageEvent,
};
use guildpulse::infrastructure::storage::MemoryStore;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::init();
    });
}

fn message(guild: &str, channel: &str, user: &str) -> MessageEvent {
    MessageEvent::new(guild, channel, user)
}

/// sum(hourly) == sum(daily) == N for all accepted events.
#[test]
fn histogram_sums_match_event_count() {
    ensure_init();

    let mut tracker = ActivityTracker::new(TrackerSettings::default());
    let base = Utc.with_ymd_and_hms(2026, 8, 3, 0, 30, 0).unwrap();

    let n = 50;
    for i in 0..n {
        // Spread over hours and days
        let ts = base + Duration::hours(i * 5);
        tracker.record_message(message("g1", "general", &format!("u{}", i % 7)).at(ts));
    }

    let log = tracker.guild("g1").expect("guild should exist");
    assert_eq!(log.hourly.iter().sum::<u64>(), n as u64);
    assert_eq!(log.daily.values().sum::<u64>(), n as u64);
    assert_eq!(log.messages.len(), n as usize);
}

/// Filtered events never reach the counters.
#[test]
fn ingestion_filters_drop_silently() {
    ensure_init();

    let mut tracker = ActivityTracker::new(TrackerSettings::default());

    tracker.record_message(message("", "general", "alice"));
    tracker.record_message(message("g1", "general", "beep").from_bot(true));
    tracker.record_member(MemberEvent::new("", "alice", MemberChange::Join));
    assert_eq!(tracker.guild_count(), 0);

    let mut disabled = ActivityTracker::new(TrackerSettings {
        enabled: false,
        ..TrackerSettings::default()
    });
    disabled.record_message(message("g1", "general", "alice"));
    assert_eq!(disabled.guild_count(), 0);

    // Bots count once explicitly enabled
    let mut with_bots = ActivityTracker::new(TrackerSettings {
        count_bots: true,
        ..TrackerSettings::default()
    });
    with_bots.record_message(message("g1", "general", "beep").from_bot(true));
    assert_eq!(with_bots.guild("g1").unwrap().messages.len(), 1);
}

/// After cap+K inserts the log holds exactly the most recent cap events
/// in arrival order.
#[test]
fn fifo_eviction_at_cap() {
    ensure_init();

    let cap = 20;
    let mut tracker = ActivityTracker::new(TrackerSettings {
        message_log_cap: cap,
        member_log_cap: 10,
        ..TrackerSettings::default()
    });

    for i in 0..(cap + 13) {
        tracker.record_message(message("g1", &format!("c{}", i), "alice"));
    }

    let log = tracker.guild("g1").unwrap();
    assert_eq!(log.messages.len(), cap);
    let first = log.messages.front().unwrap();
    let last = log.messages.back().unwrap();
    assert_eq!(first.channel_id, "c13");
    assert_eq!(last.channel_id, format!("c{}", cap + 12));

    for _ in 0..25 {
        tracker.record_member(MemberEvent::new("g1", "bob", MemberChange::Join));
    }
    assert_eq!(tracker.guild("g1").unwrap().members.len(), 10);
}

/// Serialize then deserialize reproduces the log exactly.
#[test]
fn guild_log_round_trips_through_serde() {
    ensure_init();

    let mut tracker = ActivityTracker::new(TrackerSettings::default());
    let base = Utc.with_ymd_and_hms(2026, 8, 3, 9, 15, 0).unwrap();
    for i in 0..40 {
        tracker.record_message(
            message("g1", "general", &format!("u{}", i % 4))
                .at(base + Duration::minutes(i * 90))
                .with_role_mention("mods"),
        );
    }
    tracker.record_member(MemberEvent::new("g1", "newbie", MemberChange::Join).at(base));
    tracker.record_member(MemberEvent::new("g1", "gone", MemberChange::Leave).at(base));

    let log = tracker.guild("g1").unwrap();
    let blob = serde_json::to_string(log).expect("serialize");
    let restored: GuildActivityLog = serde_json::from_str(&blob).expect("deserialize");
    assert_eq!(&restored, log);
}

/// Save/load through the key-value store preserves state.
#[tokio::test]
async fn save_and_load_through_store() {
    ensure_init();

    let store = MemoryStore::new();
    let mut tracker = ActivityTracker::new(TrackerSettings::default());
    for i in 0..10 {
        tracker.record_message(message("g1", "general", &format!("u{}", i)));
    }
    tracker.record_message(message("g2", "random", "alice"));
    tracker.save(&store).await.expect("save");

    let reloaded = ActivityTracker::load(TrackerSettings::default(), &store).await;
    assert_eq!(reloaded.guild_count(), 2);
    assert_eq!(reloaded.guild("g1").unwrap().messages.len(), 10);
    assert_eq!(reloaded.guild("g2").unwrap().messages.len(), 1);
}

/// Corrupt saved state is discarded, not an error.
#[tokio::test]
async fn load_survives_corrupt_blob() {
    ensure_init();

    let store = MemoryStore::new();
    store.set(STORAGE_KEY, "{not json").await.unwrap();

    let tracker = ActivityTracker::load(TrackerSettings::default(), &store).await;
    assert_eq!(tracker.guild_count(), 0);
}

/// Save-time pruning drops data past the horizon and nothing else.
#[tokio::test]
async fn retention_prunes_only_old_data() {
    ensure_init();

    let store = MemoryStore::new();
    let mut tracker = ActivityTracker::new(TrackerSettings {
        retention_days: 30,
        ..TrackerSettings::default()
    });

    let now = Utc::now();
    let old = now - Duration::days(40);
    let recent = now - Duration::days(1);

    for i in 0..5 {
        tracker.record_message(message("g1", "general", "old-user").at(old + Duration::hours(i)));
    }
    for i in 0..3 {
        tracker
            .record_message(message("g1", "general", "recent-user").at(recent + Duration::hours(i)));
    }
    tracker.record_member(MemberEvent::new("g1", "ghost", MemberChange::Leave).at(old));
    tracker.record_member(MemberEvent::new("g1", "newbie", MemberChange::Join).at(recent));

    tracker.save(&store).await.expect("save");

    let log = tracker.guild("g1").expect("guild survives prune");
    assert_eq!(log.messages.len(), 3);
    assert!(log.messages.iter().all(|m| m.user_id == "recent-user"));
    assert_eq!(log.members.len(), 1);
    assert!(!log.daily.contains_key(&old.date_naive()));
    assert!(log.daily.contains_key(&recent.date_naive()));

    // Guild with only stale data disappears entirely
    let mut stale_only = ActivityTracker::new(TrackerSettings {
        retention_days: 30,
        ..TrackerSettings::default()
    });
    stale_only.record_message(message("g9", "general", "old").at(old));
    stale_only.save(&store).await.expect("save");
    assert!(stale_only.guild("g9").is_none());
}

/// Shutting the auto-save task down performs one final save before exit.
#[tokio::test]
async fn autosave_shutdown_runs_final_save() {
    ensure_init();

    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let tracker = Arc::new(RwLock::new(ActivityTracker::new(TrackerSettings::default())));

    // Interval far in the future: only the shutdown path can save
    let task = AutosaveTask::spawn(
        tracker.clone(),
        store.clone(),
        std::time::Duration::from_secs(3600),
    );

    tracker
        .write()
        .await
        .record_message(message("g1", "general", "alice"));
    assert!(store.get(STORAGE_KEY).await.unwrap().is_none());

    task.shutdown().await;
    let blob = store.get(STORAGE_KEY).await.unwrap().expect("final save ran");
    assert!(blob.contains("g1"));
}
