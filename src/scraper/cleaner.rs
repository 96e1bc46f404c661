//! Cleaning and filtering of scraped release rows.
//!
//! Turns raw table rows into dated releases: platform and sentinel filtering,
//! date assembly from the month/day columns, footnote removal and the
//! upcoming-window cut. Rows that cannot be dated are reported, not fatal.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

use super::parsers::RawReleaseRow;
use crate::config::PLATFORMS;
use crate::storage::NewRelease;

/// Day value used by the source for releases without a known day
pub const UNKNOWN_DAY: &str = "TBA";

static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[a-z]\]").unwrap());

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Why a row could not be turned into a dated release
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("unknown month: {0:?}")]
    UnknownMonth(String),
    #[error("invalid day: {0:?}")]
    InvalidDay(String),
    #[error("no such date: {year}-{month:02}-{day}")]
    InvalidDate { year: i32, month: u32, day: u32 },
}

/// A row dropped because its date could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub title: String,
    pub error: String,
}

/// Output of [`clean_and_filter`]
#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub releases: Vec<NewRelease>,
    pub failures: Vec<RowFailure>,
}

/// Parse a full English month name, ignoring case
pub fn parse_month(month: &str) -> Result<u32, RowError> {
    let lower = month.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| RowError::UnknownMonth(month.to_string()))
}

/// Build the release date for `year` from the raw month and day cells
pub fn release_date(year: i32, month: &str, day: &str) -> Result<NaiveDate, RowError> {
    let month = parse_month(month)?;
    let day: u32 = day
        .trim()
        .parse()
        .map_err(|_| RowError::InvalidDay(day.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(RowError::InvalidDate { year, month, day })
}

/// Remove `[a]`-style footnote markers from a title
pub fn strip_footnotes(title: &str) -> String {
    FOOTNOTE_RE.replace_all(title, "").into_owned()
}

/// Whether the platform cell mentions at least one tracked platform tag
pub fn has_tracked_platform(platforms: &str) -> bool {
    PLATFORMS.iter().any(|(tag, _)| platforms.contains(tag))
}

/// Clean scraped rows and keep releases dated within
/// `[today, today + window_weeks]`. The year of every row is `today`'s year.
pub fn clean_and_filter(rows: &[RawReleaseRow], today: NaiveDate, window_weeks: u32) -> CleanOutcome {
    let year = today.year();
    let end = today + Duration::weeks(i64::from(window_weeks));
    let mut outcome = CleanOutcome::default();

    for row in rows {
        let month: String = row.month.chars().filter(|c| !c.is_whitespace()).collect();

        if !has_tracked_platform(&row.platforms) || row.day == UNKNOWN_DAY {
            continue;
        }

        let title = strip_footnotes(&row.title);
        let date = match release_date(year, &month, &row.day) {
            Ok(date) => date,
            Err(e) => {
                outcome.failures.push(RowFailure {
                    title,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if date < today || date > end {
            continue;
        }

        outcome.releases.push(NewRelease {
            date,
            title,
            platforms: row.platforms.clone(),
        });
    }

    outcome
}
