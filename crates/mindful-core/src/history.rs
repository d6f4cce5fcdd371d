//! Per-day meditation history.
//!
//! Only naturally completed sessions are recorded; a reset or an abandoned
//! session never touches the store. Entries live for the lifetime of the
//! process.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Accumulated completed-session seconds keyed by local calendar date.
///
/// Serializes as a map of `YYYY-MM-DD` to seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryStore {
    days: BTreeMap<NaiveDate, u64>,
}

/// One calendar cell of a month view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: u32,
    pub seconds: u64,
    /// Seconds rounded half-up to whole minutes.
    pub minutes: u64,
    pub is_today: bool,
}

/// Data behind the history calendar for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1 in a Sunday-first week.
    pub leading_blanks: u32,
    pub days: Vec<DaySummary>,
    pub total_secs: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `secs` to `date` and return the new total for that day.
    pub fn record(&mut self, date: NaiveDate, secs: u64) -> u64 {
        let total = self.days.entry(date).or_insert(0);
        *total = total.saturating_add(secs);
        *total
    }

    pub fn seconds_on(&self, date: NaiveDate) -> u64 {
        self.days.get(&date).copied().unwrap_or(0)
    }

    pub fn total_secs(&self) -> u64 {
        self.days().map(|(_, secs)| secs).sum()
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.days.iter().map(|(date, secs)| (*date, *secs))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Summarize one month. Returns `None` for an invalid year/month.
    pub fn month(&self, year: i32, month: u32, today: NaiveDate) -> Option<MonthSummary> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(self.summarize(first, today))
    }

    /// Summarize the month `today` falls in.
    pub fn month_containing(&self, today: NaiveDate) -> MonthSummary {
        let first = today.with_day(1).unwrap_or(today);
        self.summarize(first, today)
    }

    fn summarize(&self, first: NaiveDate, today: NaiveDate) -> MonthSummary {
        let days: Vec<DaySummary> = first
            .iter_days()
            .take_while(|date| date.month() == first.month())
            .map(|date| {
                let seconds = self.seconds_on(date);
                DaySummary {
                    day: date.day(),
                    seconds,
                    minutes: (seconds + 30) / 60,
                    is_today: date == today,
                }
            })
            .collect();
        let total_secs = days.iter().map(|d| d.seconds).sum();

        MonthSummary {
            year: first.year(),
            month: first.month(),
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
            total_secs,
        }
    }
}
