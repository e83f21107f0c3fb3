use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn from_rfc3339(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Whole days until `deadline`, rounded up; `None` once it has passed.
pub fn days_left(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    if deadline <= now {
        return None;
    }
    let seconds = (deadline - now).num_seconds();
    Some((seconds + 86_399) / 86_400)
}

pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}
