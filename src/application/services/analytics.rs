//! Windowed query engine and trend/pattern analysis
//!
//! All queries re-tally from the raw bounded logs filtered by a cutoff
//! time; they never read the tracker's incremental counters, which cover
//! the full ingestion horizon rather than a window. A window larger than
//! the retained data yields a partial result, never an error, and an
//! absent guild yields a zeroed default shape.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

use crate::domain::entities::{GuildActivityLog, MemberChange, MentionCounters, MessageEvent};

/// How many users a summary ranks.
pub const TOP_USERS: usize = 10;

/// Percentage-delta band (inclusive) inside which a trend counts as stable.
pub const STABLE_THRESHOLD_PCT: f64 = 5.0;

/// Windowed aggregates for one guild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySummary {
    pub window_days: u32,
    pub total_messages: u64,
    pub unique_users: u64,
    pub hourly: [u64; 24],
    pub daily: BTreeMap<NaiveDate, u64>,
    pub channels: HashMap<String, u64>,
    /// Top users by message count, descending, ties in first-seen order.
    pub top_users: Vec<(String, u64)>,
    pub mentions: MentionCounters,
    pub joins: u64,
    pub leaves: u64,
    /// joins - leaves within the window.
    pub member_delta: i64,
}

/// Trend classification over the ±5% band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Current window vs the equal-length immediately preceding window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub window_days: u32,
    pub current_messages: u64,
    pub previous_messages: u64,
    pub message_delta: i64,
    pub message_change_pct: f64,
    pub current_users: u64,
    pub previous_users: u64,
    pub user_delta: i64,
    pub user_change_pct: f64,
    pub direction: TrendDirection,
}

/// Peak/quiet buckets and consistency signals over a window.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternReport {
    pub window_days: u32,
    pub hourly: [u64; 24],
    /// Day-of-week histogram, Monday = 0.
    pub weekday: [u64; 7],
    pub peak_hour: Option<usize>,
    /// Hour with the smallest non-zero count; zero buckets are excluded
    /// so an inactive hour is never reported as the quiet extremum.
    pub quiet_hour: Option<usize>,
    pub peak_weekday: Option<usize>,
    pub quiet_weekday: Option<usize>,
    /// Population variance, no Bessel correction.
    pub hourly_variance: f64,
    pub weekday_variance: f64,
}

/// Naive linear extrapolation of next-window volume.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthProjection {
    pub window_days: u32,
    pub daily_average: f64,
    pub growth_rate_pct: f64,
    /// `daily_average * window_days * (1 + growth_rate/100)`. No
    /// confidence bound; a known simplification, not a forecast.
    pub projected_messages: f64,
}

fn window_messages<'a>(
    log: &'a GuildActivityLog,
    cutoff: DateTime<Utc>,
) -> impl Iterator<Item = &'a MessageEvent> {
    log.messages.iter().filter(move |m| m.timestamp > cutoff)
}

/// Compute windowed aggregates for a guild.
pub fn summarize(
    log: Option<&GuildActivityLog>,
    window_days: u32,
    now: DateTime<Utc>,
) -> ActivitySummary {
    let mut summary = ActivitySummary {
        window_days,
        ..Default::default()
    };
    let Some(log) = log else {
        return summary;
    };
    let cutoff = now - Duration::days(window_days as i64);

    // First-seen order matters for tie-breaking, so user counts go into a
    // Vec with an index map rather than straight into a HashMap.
    let mut user_order: Vec<(String, u64)> = Vec::new();
    let mut user_index: HashMap<&str, usize> = HashMap::new();

    for msg in window_messages(log, cutoff) {
        summary.total_messages += 1;
        summary.hourly[msg.timestamp.hour() as usize] += 1;
        *summary.daily.entry(msg.timestamp.date_naive()).or_insert(0) += 1;
        *summary.channels.entry(msg.channel_id.clone()).or_insert(0) += 1;

        match user_index.get(msg.user_id.as_str()).copied() {
            Some(i) => user_order[i].1 += 1,
            None => {
                user_index.insert(msg.user_id.as_str(), user_order.len());
                user_order.push((msg.user_id.clone(), 1));
            }
        }

        if msg.mentions_everyone {
            summary.mentions.everyone += 1;
        }
        if msg.mentions_here {
            summary.mentions.here += 1;
        }
        for role in &msg.role_mentions {
            *summary.mentions.roles.entry(role.clone()).or_insert(0) += 1;
        }
    }

    summary.unique_users = user_order.len() as u64;

    // Stable sort keeps first-seen order for equal counts.
    let mut ranked = user_order;
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_USERS);
    summary.top_users = ranked;

    for member in log.members.iter().filter(|m| m.timestamp > cutoff) {
        match member.change {
            MemberChange::Join => summary.joins += 1,
            MemberChange::Leave => summary.leaves += 1,
        }
    }
    summary.member_delta = summary.joins as i64 - summary.leaves as i64;

    summary
}

fn change_pct(previous: u64, current: u64) -> f64 {
    if previous == 0 {
        if current == 0 {
            0.0
        } else {
            100.0
        }
    } else {
        (current as f64 - previous as f64) / previous as f64 * 100.0
    }
}

fn classify(pct: f64) -> TrendDirection {
    // Inclusive band: exactly ±5.0% still counts as stable.
    if pct.abs() <= STABLE_THRESHOLD_PCT {
        TrendDirection::Stable
    } else if pct > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

fn window_stats(log: &GuildActivityLog, from: DateTime<Utc>, to: DateTime<Utc>) -> (u64, u64) {
    let mut count = 0u64;
    let mut users: HashSet<&str> = HashSet::new();
    for msg in log.messages.iter() {
        if msg.timestamp > from && msg.timestamp <= to {
            count += 1;
            users.insert(msg.user_id.as_str());
        }
    }
    (count, users.len() as u64)
}

/// Compare `[now-D, now]` against `[now-2D, now-D]`.
pub fn trend(log: Option<&GuildActivityLog>, window_days: u32, now: DateTime<Utc>) -> TrendReport {
    let mid = now - Duration::days(window_days as i64);
    let start = now - Duration::days(window_days as i64 * 2);

    let (current_messages, current_users, previous_messages, previous_users) = match log {
        Some(log) => {
            let (cm, cu) = window_stats(log, mid, now);
            let (pm, pu) = window_stats(log, start, mid);
            (cm, cu, pm, pu)
        }
        None => (0, 0, 0, 0),
    };

    let message_change_pct = change_pct(previous_messages, current_messages);
    let user_change_pct = change_pct(previous_users, current_users);

    TrendReport {
        window_days,
        current_messages,
        previous_messages,
        message_delta: current_messages as i64 - previous_messages as i64,
        message_change_pct,
        current_users,
        previous_users,
        user_delta: current_users as i64 - previous_users as i64,
        user_change_pct,
        direction: classify(message_change_pct),
    }
}

fn peak_bucket(buckets: &[u64]) -> Option<usize> {
    let (idx, &max) = buckets
        .iter()
        .enumerate()
        .max_by_key(|(_, &count)| count)?;
    if max == 0 {
        None
    } else {
        Some(idx)
    }
}

fn quiet_bucket(buckets: &[u64]) -> Option<usize> {
    buckets
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .min_by_key(|(_, &count)| count)
        .map(|(idx, _)| idx)
}

fn population_variance(buckets: &[u64]) -> f64 {
    if buckets.is_empty() {
        return 0.0;
    }
    let n = buckets.len() as f64;
    let mean = buckets.iter().sum::<u64>() as f64 / n;
    buckets
        .iter()
        .map(|&b| {
            let d = b as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

/// Hour-of-day and day-of-week patterns over a (typically longer) window.
pub fn patterns(
    log: Option<&GuildActivityLog>,
    window_days: u32,
    now: DateTime<Utc>,
) -> PatternReport {
    let mut hourly = [0u64; 24];
    let mut weekday = [0u64; 7];

    if let Some(log) = log {
        let cutoff = now - Duration::days(window_days as i64);
        for msg in window_messages(log, cutoff) {
            hourly[msg.timestamp.hour() as usize] += 1;
            weekday[msg.timestamp.weekday().num_days_from_monday() as usize] += 1;
        }
    }

    PatternReport {
        window_days,
        peak_hour: peak_bucket(&hourly),
        quiet_hour: quiet_bucket(&hourly),
        peak_weekday: peak_bucket(&weekday),
        quiet_weekday: quiet_bucket(&weekday),
        hourly_variance: population_variance(&hourly),
        weekday_variance: population_variance(&weekday),
        hourly,
        weekday,
    }
}

/// Extrapolate next-window message volume from the current trend.
pub fn project_growth(
    log: Option<&GuildActivityLog>,
    window_days: u32,
    now: DateTime<Utc>,
) -> GrowthProjection {
    let report = trend(log, window_days, now);
    let daily_average = if window_days == 0 {
        0.0
    } else {
        report.current_messages as f64 / window_days as f64
    };
    let growth_rate_pct = report.message_change_pct;

    GrowthProjection {
        window_days,
        daily_average,
        growth_rate_pct,
        projected_messages: daily_average * window_days as f64 * (1.0 + growth_rate_pct / 100.0),
    }
}

/// Weekday x hour heatmap estimate.
///
/// Combines the two marginal histograms multiplicatively
/// (`weekday_count * hour_count / total`). A placeholder heuristic carried
/// over from the original dashboard, not a measured joint distribution.
pub fn heatmap(
    log: Option<&GuildActivityLog>,
    window_days: u32,
    now: DateTime<Utc>,
) -> [[f64; 24]; 7] {
    let report = patterns(log, window_days, now);
    let total = report.hourly.iter().sum::<u64>() as f64;
    let mut grid = [[0.0f64; 24]; 7];
    if total == 0.0 {
        return grid;
    }
    for (d, row) in grid.iter_mut().enumerate() {
        for (h, cell) in row.iter_mut().enumerate() {
            *cell = report.weekday[d] as f64 * report.hourly[h] as f64 / total;
        }
    }
    grid
}
