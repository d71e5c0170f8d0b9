//! Period assignment: maps a transaction date onto a reporting bucket.
//!
//! Weeks are anchored on a configurable start weekday. The anchor is the
//! latest date on or before the transaction that falls on that weekday, and
//! the week's key (and label) comes from the anchor's ISO calendar, never
//! from the raw transaction date.

use crate::error::{ReportError, ReportResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Day     => "day",
            Self::Week    => "week",
            Self::Month   => "month",
            Self::Quarter => "quarter",
            Self::Year    => "year",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "d"     => Ok(Self::Day),
            "week" | "w"    => Ok(Self::Week),
            "month" | "m"   => Ok(Self::Month),
            "quarter" | "q" => Ok(Self::Quarter),
            "year" | "y"    => Ok(Self::Year),
            _ => Err(ReportError::UnknownGranularity { value: s.to_string() }),
        }
    }
}

/// A reporting bucket. Keys of one granularity are totally ordered
/// chronologically; a report never mixes granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "granularity", rename_all = "snake_case")]
pub enum PeriodKey {
    Day { date: NaiveDate },
    /// `year` is the ISO week-year of the anchor, which can differ from the
    /// calendar year of the transactions in it.
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
    Year { year: i32 },
}

impl PeriodKey {
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Day { .. }     => Granularity::Day,
            Self::Week { .. }    => Granularity::Week,
            Self::Month { .. }   => Granularity::Month,
            Self::Quarter { .. } => Granularity::Quarter,
            Self::Year { .. }    => Granularity::Year,
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            Self::Day { date }          => date.year(),
            Self::Week { year, .. }
            | Self::Month { year, .. }
            | Self::Quarter { year, .. }
            | Self::Year { year }       => year,
        }
    }

    /// Display label handed to the presentation layer.
    pub fn label(&self) -> String {
        match *self {
            Self::Day { date }             => date.format("%Y-%m-%d").to_string(),
            Self::Week { year, week }      => format!("Week {week:02}/{year}"),
            Self::Month { year, month }    => format!("{year}-{month:02}"),
            Self::Quarter { year, quarter } => format!("{year}Q{quarter}"),
            Self::Year { year }            => format!("{year}"),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Convert a 0-based weekday index (0 = Monday .. 6 = Sunday).
pub fn weekday_from_index(index: u8) -> ReportResult<Weekday> {
    match index {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        _ => Err(ReportError::invalid(
            "week_start",
            format!("must be 0 (Monday) .. 6 (Sunday), got {index}"),
        )),
    }
}

/// Roll `date` back to the closest `week_start` on or before it.
pub fn week_anchor(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = (date.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    date - Duration::days(i64::from(back))
}

/// Assign a date to its period key.
pub fn assign(date: NaiveDate, granularity: Granularity, week_start: Weekday) -> PeriodKey {
    match granularity {
        Granularity::Day => PeriodKey::Day { date },
        Granularity::Week => {
            let iso = week_anchor(date, week_start).iso_week();
            PeriodKey::Week {
                year: iso.year(),
                week: iso.week(),
            }
        }
        Granularity::Month => PeriodKey::Month {
            year:  date.year(),
            month: date.month(),
        },
        Granularity::Quarter => PeriodKey::Quarter {
            year:    date.year(),
            quarter: (date.month() - 1) / 3 + 1,
        },
        Granularity::Year => PeriodKey::Year { year: date.year() },
    }
}

/// Whole months from `from` to `to` (12 * year diff + month diff).
/// Day of month is ignored.
pub fn month_diff(to: NaiveDate, from: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// First day of the date's calendar month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
