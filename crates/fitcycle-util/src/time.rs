//! Calendar-date helpers for fitcycle
//!
//! Cycle accounting is done in whole local calendar days. Timestamps
//! (created/updated) use wall-clock time; all window math uses `NaiveDate`.
//!
//! # Mock Date for Development
//!
//! In debug builds, the `FITCYCLE_MOCK_TODAY` environment variable can be set
//! to override "today" for every date-sensitive operation. This is useful for
//! exercising cycle expiry without waiting a week.
//!
//! Format: `YYYY-MM-DD` (e.g., `2026-03-01`)

use chrono::{DateTime, Local, NaiveDate};
use std::sync::OnceLock;

/// Environment variable name for the mock date (debug builds only)
pub const MOCK_TODAY_ENV_VAR: &str = "FITCYCLE_MOCK_TODAY";

static MOCK_TODAY: OnceLock<Option<NaiveDate>> = OnceLock::new();

fn get_mock_today() -> Option<NaiveDate> {
    *MOCK_TODAY.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(raw) = std::env::var(MOCK_TODAY_ENV_VAR) {
                match parse_iso_date(&raw) {
                    Some(date) => {
                        tracing::info!(mock_today = %raw, "Mock date enabled");
                        return Some(date);
                    }
                    None => {
                        tracing::warn!(
                            mock_today = %raw,
                            expected_format = "%Y-%m-%d",
                            "Invalid mock date, ignoring"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Current local calendar date, respecting the mock override in debug builds.
pub fn today() -> NaiveDate {
    match get_mock_today() {
        Some(date) => date,
        None => Local::now().date_naive(),
    }
}

/// Current wall-clock timestamp for created/updated fields.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Whole days from `a` to `b` (negative if `b` is earlier).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse an RFC3339 timestamp into local time.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .ok()
}
