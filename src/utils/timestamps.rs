use chrono::{DateTime, Datelike, Utc};

/// Short timestamp for lists:
/// - Relative under a week: "just now", "5m ago", "2h ago", "3d ago"
/// - Otherwise absolute: "Jan 15", or "Dec 3, 2024" in another year
pub fn format_timestamp(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);

    if elapsed.num_days() >= 7 {
        return if timestamp.year() == now.year() {
            timestamp.format("%b %-d").to_string()
        } else {
            timestamp.format("%b %-d, %Y").to_string()
        };
    }

    // Entries stamped slightly in the future (clock skew) read as "just now"
    let minutes = elapsed.num_minutes().max(0);
    match (minutes / (60 * 24), minutes / 60, minutes) {
        (days, _, _) if days > 0 => format!("{}d ago", days),
        (_, hours, _) if hours > 0 => format!("{}h ago", hours),
        (_, _, minutes) if minutes > 0 => format!("{}m ago", minutes),
        _ => "just now".to_string(),
    }
}

/// Full UTC timestamp for detail views
pub fn format_full(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
