// src/date_key.rs
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar date in `YYYY-MM-DD` form. Natural key of a destination record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse an ISO date (`2024-06-09`).
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok().map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `self - days`, `None` only when it would leave chrono's date range.
    pub fn days_before(&self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

/// Dates `today - W ..= today - 1`, oldest first. Today itself is excluded.
pub fn trailing_window(today: NaiveDate, window_days: u32) -> Vec<DateKey> {
    let today = DateKey(today);
    (1..=u64::from(window_days))
        .rev()
        .filter_map(|offset| today.days_before(offset))
        .collect()
}
