//! Plain-text rendering of analytics results for chat/console output

use crate::application::services::analytics::{
    ActivitySummary, GrowthProjection, PatternReport, TrendDirection, TrendReport,
};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn render_summary(guild_id: &str, summary: &ActivitySummary) -> String {
    let mut out = format!(
        "Activity for {} (last {} days)\n\
         Messages: {}  Unique users: {}\n\
         Members: +{} / -{} (net {:+})\n",
        guild_id,
        summary.window_days,
        summary.total_messages,
        summary.unique_users,
        summary.joins,
        summary.leaves,
        summary.member_delta,
    );

    if !summary.top_users.is_empty() {
        out.push_str("Top users:\n");
        for (rank, (user, count)) in summary.top_users.iter().enumerate() {
            out.push_str(&format!("  {}. {} ({} messages)\n", rank + 1, user, count));
        }
    }

    if !summary.channels.is_empty() {
        let mut channels: Vec<_> = summary.channels.iter().collect();
        channels.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        out.push_str("Busiest channels:\n");
        for (channel, count) in channels.iter().take(5) {
            out.push_str(&format!("  #{} ({} messages)\n", channel, count));
        }
    }

    let mention_total = summary.mentions.everyone + summary.mentions.here;
    if mention_total > 0 {
        out.push_str(&format!(
            "Mentions: @everyone x{}, @here x{}\n",
            summary.mentions.everyone, summary.mentions.here
        ));
    }

    out
}

pub fn render_trend(report: &TrendReport) -> String {
    let direction = match report.direction {
        TrendDirection::Increasing => "increasing",
        TrendDirection::Decreasing => "decreasing",
        TrendDirection::Stable => "stable",
    };
    format!(
        "Trend over {}d vs previous {}d: {}\n\
         Messages: {} -> {} ({:+}, {:+.1}%)\n\
         Users: {} -> {} ({:+}, {:+.1}%)\n",
        report.window_days,
        report.window_days,
        direction,
        report.previous_messages,
        report.current_messages,
        report.message_delta,
        report.message_change_pct,
        report.previous_users,
        report.current_users,
        report.user_delta,
        report.user_change_pct,
    )
}

pub fn render_patterns(report: &PatternReport) -> String {
    let mut out = format!("Patterns over {} days:\n", report.window_days);

    match (report.peak_hour, report.quiet_hour) {
        (Some(peak), Some(quiet)) => {
            out.push_str(&format!(
                "  Peak hour: {:02}:00 UTC, quiet hour: {:02}:00 UTC\n",
                peak, quiet
            ));
        }
        _ => out.push_str("  Not enough data for hourly patterns\n"),
    }

    match (report.peak_weekday, report.quiet_weekday) {
        (Some(peak), Some(quiet)) => {
            out.push_str(&format!(
                "  Peak day: {}, quiet day: {}\n",
                WEEKDAYS[peak], WEEKDAYS[quiet]
            ));
        }
        _ => out.push_str("  Not enough data for weekday patterns\n"),
    }

    out.push_str(&format!(
        "  Consistency (variance): hourly {:.1}, weekday {:.1}\n",
        report.hourly_variance, report.weekday_variance
    ));
    out
}

pub fn render_projection(projection: &GrowthProjection) -> String {
    format!(
        "Projection for next {} days: ~{:.0} messages ({:.1}/day, growth {:+.1}%)\n",
        projection.window_days,
        projection.projected_messages,
        projection.daily_average,
        projection.growth_rate_pct,
    )
}
