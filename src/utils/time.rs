use chrono::{Duration, SecondsFormat, Utc};

/// UTC timestamp with fixed microsecond precision and a `Z` suffix, so that
/// lexicographic comparison of stored values equals chronological order.
pub fn time_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn time_days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Micros, true)
}
