//! Windowed query and trend analysis tests
//! Run with: cargo test --test analytics_test

use std::sync::Once;

use chrono::{DateTime, Duration, TimeZone, Utc};

use guildpulse::application::services::analytics::{self, TrendDirection};
use guildpulse::application::services::{ActivityTracker, TrackerSettings};
use guildpulse::domain::entities::{MemberChange, MemberEvent, MessageEvent};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::init();
    });
}

fn now() -> DateTime<Utc> {
    // A Monday, midday, so hour/weekday buckets are predictable
    Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()
}

fn tracker_with(messages: &[(&str, &str, DateTime<Utc>)]) -> ActivityTracker {
    let mut tracker = ActivityTracker::new(TrackerSettings::default());
    for (channel, user, ts) in messages {
        tracker.record_message(MessageEvent::new("g1", *channel, *user).at(*ts));
    }
    tracker
}

#[test]
fn window_zero_returns_all_zero_aggregates() {
    ensure_init();

    let now = now();
    let tracker = tracker_with(&[
        ("general", "alice", now - Duration::hours(1)),
        ("general", "bob", now - Duration::hours(2)),
    ]);

    let summary = analytics::summarize(tracker.guild("g1"), 0, now);
    assert_eq!(summary.total_messages, 0);
    assert_eq!(summary.unique_users, 0);
    assert_eq!(summary.hourly.iter().sum::<u64>(), 0);
    assert!(summary.daily.is_empty());
    assert!(summary.top_users.is_empty());
    assert_eq!(summary.member_delta, 0);
}

#[test]
fn absent_guild_returns_default_shape() {
    ensure_init();

    let summary = analytics::summarize(None, 7, now());
    assert_eq!(summary.window_days, 7);
    assert_eq!(summary.total_messages, 0);

    let trend = analytics::trend(None, 7, now());
    assert_eq!(trend.direction, TrendDirection::Stable);
    assert_eq!(trend.message_change_pct, 0.0);

    let patterns = analytics::patterns(None, 30, now());
    assert_eq!(patterns.peak_hour, None);
    assert_eq!(patterns.quiet_hour, None);
}

#[test]
fn window_filters_out_older_events() {
    ensure_init();

    let now = now();
    let tracker = tracker_with(&[
        ("general", "alice", now - Duration::days(1)),
        ("general", "alice", now - Duration::days(2)),
        ("general", "bob", now - Duration::days(20)),
    ]);

    let summary = analytics::summarize(tracker.guild("g1"), 7, now);
    assert_eq!(summary.total_messages, 2);
    assert_eq!(summary.unique_users, 1);

    // Window larger than retained data is a partial result, not an error
    let wide = analytics::summarize(tracker.guild("g1"), 3650, now);
    assert_eq!(wide.total_messages, 3);
}

#[test]
fn top_users_sorted_descending_with_first_seen_tie_break() {
    ensure_init();

    let now = now();
    let ts = |m: i64| now - Duration::minutes(m);
    // carol: 3, alice: 2, bob: 2, with alice seen before bob
    let tracker = tracker_with(&[
        ("general", "alice", ts(60)),
        ("general", "bob", ts(55)),
        ("general", "carol", ts(50)),
        ("general", "carol", ts(45)),
        ("general", "bob", ts(40)),
        ("general", "alice", ts(35)),
        ("general", "carol", ts(30)),
    ]);

    let summary = analytics::summarize(tracker.guild("g1"), 1, now);
    let ranked: Vec<(&str, u64)> = summary
        .top_users
        .iter()
        .map(|(u, c)| (u.as_str(), *c))
        .collect();
    assert_eq!(ranked, vec![("carol", 3), ("alice", 2), ("bob", 2)]);
}

/// Mention totals and hour/day/channel distributions are re-tallied from
/// the raw log per window, independent of the incremental counters.
#[test]
fn mention_and_distribution_tallies_respect_the_window() {
    ensure_init();

    let now = now();
    let saturday_9 = Utc.with_ymd_and_hms(2026, 8, 22, 9, 30, 0).unwrap();
    let sunday_9 = Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap();
    let sunday_14 = Utc.with_ymd_and_hms(2026, 8, 23, 14, 0, 0).unwrap();
    let stale = now - Duration::days(14);

    let mut tracker = ActivityTracker::new(TrackerSettings::default());
    tracker.record_message(
        MessageEvent::new("g1", "general", "alice")
            .at(sunday_9)
            .with_everyone_mention(),
    );
    tracker.record_message(
        MessageEvent::new("g1", "general", "alice")
            .at(sunday_9 + Duration::minutes(5))
            .with_role_mention("mods"),
    );
    tracker.record_message(
        MessageEvent::new("g1", "random", "bob")
            .at(sunday_14)
            .with_here_mention(),
    );
    tracker.record_message(MessageEvent::new("g1", "general", "alice").at(saturday_9));
    // Outside the window: must not appear in any tally
    tracker.record_message(
        MessageEvent::new("g1", "general", "ghost")
            .at(stale)
            .with_everyone_mention()
            .with_role_mention("mods"),
    );

    let summary = analytics::summarize(tracker.guild("g1"), 7, now);
    assert_eq!(summary.total_messages, 4);

    assert_eq!(summary.mentions.everyone, 1);
    assert_eq!(summary.mentions.here, 1);
    assert_eq!(summary.mentions.roles.get("mods"), Some(&1));

    assert_eq!(summary.channels.get("general"), Some(&3));
    assert_eq!(summary.channels.get("random"), Some(&1));

    assert_eq!(summary.hourly[9], 3);
    assert_eq!(summary.hourly[14], 1);
    assert_eq!(summary.hourly.iter().sum::<u64>(), 4);

    assert_eq!(summary.daily.get(&sunday_9.date_naive()), Some(&3));
    assert_eq!(summary.daily.get(&saturday_9.date_naive()), Some(&1));
    assert!(!summary.daily.contains_key(&stale.date_naive()));

    // The incremental counters still see the stale mention
    assert_eq!(tracker.guild("g1").unwrap().mentions.everyone, 2);
}

#[test]
fn membership_net_delta_within_window() {
    ensure_init();

    let now = now();
    let mut tracker = ActivityTracker::new(TrackerSettings::default());
    for i in 0..5 {
        tracker.record_member(
            MemberEvent::new("g1", format!("u{}", i), MemberChange::Join)
                .at(now - Duration::hours(i)),
        );
    }
    tracker.record_member(
        MemberEvent::new("g1", "quitter", MemberChange::Leave).at(now - Duration::hours(1)),
    );
    // Outside the window
    tracker.record_member(
        MemberEvent::new("g1", "ancient", MemberChange::Leave).at(now - Duration::days(30)),
    );

    let summary = analytics::summarize(tracker.guild("g1"), 7, now);
    assert_eq!(summary.joins, 5);
    assert_eq!(summary.leaves, 1);
    assert_eq!(summary.member_delta, 4);
}

/// Exactly +5.0% classifies as stable (inclusive boundary).
#[test]
fn trend_boundary_at_five_percent_is_stable() {
    ensure_init();

    let now = now();
    let mut messages = Vec::new();
    // Previous window (now-14d, now-7d]: 20 messages
    for i in 0..20 {
        messages.push(("general", "alice", now - Duration::days(10) + Duration::minutes(i)));
    }
    // Current window (now-7d, now]: 21 messages -> +5.0%
    for i in 0..21 {
        messages.push(("general", "alice", now - Duration::days(1) + Duration::minutes(i)));
    }
    let tracker = tracker_with(&messages);

    let report = analytics::trend(tracker.guild("g1"), 7, now);
    assert_eq!(report.previous_messages, 20);
    assert_eq!(report.current_messages, 21);
    assert!((report.message_change_pct - 5.0).abs() < 1e-9);
    assert_eq!(report.direction, TrendDirection::Stable);
}

#[test]
fn trend_classifies_growth_and_decline() {
    ensure_init();

    let now = now();
    let mut messages = Vec::new();
    for i in 0..20 {
        messages.push(("general", "alice", now - Duration::days(10) + Duration::minutes(i)));
    }
    for i in 0..30 {
        messages.push(("general", "bob", now - Duration::days(1) + Duration::minutes(i)));
    }
    let tracker = tracker_with(&messages);

    let report = analytics::trend(tracker.guild("g1"), 7, now);
    assert_eq!(report.message_delta, 10);
    assert_eq!(report.direction, TrendDirection::Increasing);

    // Flip the windows: 30 before, 20 now
    let mut messages = Vec::new();
    for i in 0..30 {
        messages.push(("general", "alice", now - Duration::days(10) + Duration::minutes(i)));
    }
    for i in 0..20 {
        messages.push(("general", "bob", now - Duration::days(1) + Duration::minutes(i)));
    }
    let tracker = tracker_with(&messages);
    let report = analytics::trend(tracker.guild("g1"), 7, now);
    assert_eq!(report.direction, TrendDirection::Decreasing);
}

/// Quiet hour is the minimum non-zero bucket, never an inactive hour.
#[test]
fn quiet_hour_excludes_zero_buckets() {
    ensure_init();

    let now = now();
    let at_hour = |h: u32, i: i64| {
        Utc.with_ymd_and_hms(2026, 8, 20, h, 0, 0).unwrap() + Duration::seconds(i)
    };

    let mut messages = Vec::new();
    for i in 0..5 {
        messages.push(("general", "alice", at_hour(2, i)));
    }
    for i in 0..3 {
        messages.push(("general", "bob", at_hour(4, i)));
    }
    for i in 0..9 {
        messages.push(("general", "carol", at_hour(20, i)));
    }
    let tracker = tracker_with(&messages);

    let report = analytics::patterns(tracker.guild("g1"), 30, now);
    assert_eq!(report.hourly[2], 5);
    assert_eq!(report.hourly[4], 3);
    assert_eq!(report.peak_hour, Some(20));
    assert_eq!(report.quiet_hour, Some(4));
}

#[test]
fn weekday_patterns_and_variance() {
    ensure_init();

    let now = now();
    // 2026-08-19 is a Wednesday, 2026-08-22 a Saturday
    let wed = Utc.with_ymd_and_hms(2026, 8, 19, 10, 0, 0).unwrap();
    let sat = Utc.with_ymd_and_hms(2026, 8, 22, 10, 0, 0).unwrap();

    let mut messages = Vec::new();
    for i in 0..6 {
        messages.push(("general", "alice", wed + Duration::minutes(i)));
    }
    for i in 0..2 {
        messages.push(("general", "bob", sat + Duration::minutes(i)));
    }
    let tracker = tracker_with(&messages);

    let report = analytics::patterns(tracker.guild("g1"), 30, now);
    assert_eq!(report.weekday[2], 6); // Wednesday
    assert_eq!(report.weekday[5], 2); // Saturday
    assert_eq!(report.peak_weekday, Some(2));
    assert_eq!(report.quiet_weekday, Some(5));
    assert!(report.weekday_variance > 0.0);

    // Perfectly even histogram has zero variance
    let even = analytics::patterns(None, 30, now);
    assert_eq!(even.hourly_variance, 0.0);
}

#[test]
fn growth_projection_is_linear_extrapolation() {
    ensure_init();

    let now = now();
    let mut messages = Vec::new();
    // 10 previous, 20 current over a 5-day window -> +100% growth, 4/day
    for i in 0..10 {
        messages.push(("general", "alice", now - Duration::days(7) + Duration::minutes(i)));
    }
    for i in 0..20 {
        messages.push(("general", "alice", now - Duration::days(2) + Duration::minutes(i)));
    }
    let tracker = tracker_with(&messages);

    let projection = analytics::project_growth(tracker.guild("g1"), 5, now);
    assert!((projection.daily_average - 4.0).abs() < 1e-9);
    assert!((projection.growth_rate_pct - 100.0).abs() < 1e-9);
    // 4/day * 5 days * 2.0
    assert!((projection.projected_messages - 40.0).abs() < 1e-9);
}

#[test]
fn heatmap_is_zero_without_data() {
    ensure_init();

    let grid = analytics::heatmap(None, 30, now());
    assert!(grid.iter().flatten().all(|&cell| cell == 0.0));
}
