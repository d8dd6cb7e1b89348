use chrono::{DateTime, Duration, Utc};

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn to_datetime(ts_millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts_millis).unwrap_or_default()
}

/// Clock label for message bubbles, e.g. `11:30 AM`.
pub fn clock_label(ts_millis: i64) -> String {
    to_datetime(ts_millis).format("%I:%M %p").to_string()
}

/// Label for the conversation list: clock time today, `Yesterday`, or a date.
pub fn activity_label(ts_millis: i64, now_millis: i64) -> String {
    let at = to_datetime(ts_millis);
    let now = to_datetime(now_millis);
    let day = at.date_naive();
    let today = now.date_naive();
    if day == today {
        clock_label(ts_millis)
    } else if day == (now - Duration::days(1)).date_naive() {
        "Yesterday".to_string()
    } else {
        at.format("%d/%m/%Y").to_string()
    }
}

/// `m:ss` used by call and recording counters.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
