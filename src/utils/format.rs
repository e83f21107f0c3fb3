use chrono::{DateTime, Utc};

use crate::models::job::{JobPosting, Salary};
use crate::utils::time;

/// A zero bound counts as unset, like a missing one.
pub fn format_salary(salary: Option<&Salary>) -> String {
    let Some(salary) = salary else {
        return "Not specified".to_string();
    };
    let Some(min) = salary.min.filter(|min| !min.is_zero()) else {
        return "Not specified".to_string();
    };
    let currency = salary.currency.as_deref().unwrap_or("USD");
    match salary.max.filter(|max| !max.is_zero()) {
        Some(max) => format!("{} {} - {}", currency, min, max),
        None => format!("{} {}", currency, min),
    }
}

/// `full-time` becomes `Full Time`.
pub fn format_job_type(job_type: Option<&str>) -> String {
    job_type
        .unwrap_or_default()
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn deadline_label(job: &JobPosting, now: DateTime<Utc>) -> String {
    match job.deadline {
        None => "No deadline".to_string(),
        Some(deadline) => match time::days_left(deadline, now) {
            Some(days) => format!("{} ({} days left)", time::format_date(deadline), days),
            None => format!("{} - Expired", time::format_date(deadline)),
        },
    }
}

/// First `limit` entries plus a "+N more" marker for the rest.
pub fn preview(items: &[String], limit: usize) -> String {
    let shown = items
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > limit {
        format!("{} +{} more", shown, items.len() - limit)
    } else {
        shown
    }
}
