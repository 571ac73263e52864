//! Analytics event types, date ranges, and trend bucketing.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, INVALID_VALUE};

pub const EVENT_RESERVATION_SUBMITTED: &str = "reservation_submitted";
pub const EVENT_RESERVATION_CONFIRMED: &str = "reservation_confirmed";
pub const EVENT_RESERVATION_CANCELLED: &str = "reservation_cancelled";
pub const EVENT_RESERVATION_COMPLETED: &str = "reservation_completed";
pub const EVENT_FORM_VIEWED: &str = "form_viewed";
pub const EVENT_SERVICE_VIEWED: &str = "service_viewed";

/// Event types a client may record through the public endpoint.
pub const CLIENT_EVENT_TYPES: &[&str] = &[EVENT_FORM_VIEWED, EVENT_SERVICE_VIEWED];

/// Default trend/analytics window when no range is given, in days.
pub const DEFAULT_RANGE_DAYS: u64 = 30;

/// Longest accepted analytics window, in days.
pub const MAX_RANGE_DAYS: i64 = 366;

pub const DEFAULT_TOP_SERVICES: i64 = 5;
pub const MAX_TOP_SERVICES: i64 = 50;

/// Number of rows in the realtime "latest reservations" panel.
pub const REALTIME_LATEST_LIMIT: i64 = 10;

/// Reject event types that only the server may emit.
pub fn validate_client_event_type(event_type: &str) -> Result<(), CoreError> {
    if CLIENT_EVENT_TYPES.contains(&event_type) {
        Ok(())
    } else {
        Err(CoreError::invalid_field(
            INVALID_VALUE,
            "event_type",
            format!(
                "Invalid event type '{event_type}'. Must be one of: {}",
                CLIENT_EVENT_TYPES.join(", ")
            ),
        ))
    }
}

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Resolve optional bounds into a concrete range ending no later than asked.
///
/// Missing `end` defaults to `today`; missing `start` to the 30 days ending
/// at `end`. Reversed and overlong ranges are rejected.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange, CoreError> {
    let end = end.unwrap_or(today);
    let start = match start {
        Some(start) => start,
        None => end
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
            .unwrap_or(NaiveDate::MIN),
    };

    if start > end {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    let range = DateRange { start, end };
    if range.days() > MAX_RANGE_DAYS {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "start_date",
            format!("Date range cannot exceed {MAX_RANGE_DAYS} days"),
        ));
    }
    Ok(range)
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendInterval {
    #[default]
    Day,
    Week,
    Month,
}

impl TrendInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendInterval::Day => "day",
            TrendInterval::Week => "week",
            TrendInterval::Month => "month",
        }
    }

    /// First day of the bucket containing `date`.
    ///
    /// Weeks start on Monday, matching PostgreSQL's `date_trunc('week', ..)`.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            TrendInterval::Day => date,
            TrendInterval::Week => date
                .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
                .unwrap_or(NaiveDate::MIN),
            TrendInterval::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn next_bucket(self, bucket: NaiveDate) -> Option<NaiveDate> {
        match self {
            TrendInterval::Day => bucket.checked_add_days(Days::new(1)),
            TrendInterval::Week => bucket.checked_add_days(Days::new(7)),
            TrendInterval::Month => bucket.checked_add_months(Months::new(1)),
        }
    }
}

impl fmt::Display for TrendInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendInterval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(TrendInterval::Day),
            "week" => Ok(TrendInterval::Week),
            "month" => Ok(TrendInterval::Month),
            other => Err(CoreError::invalid_field(
                INVALID_VALUE,
                "interval",
                format!("Invalid interval '{other}'. Must be one of: day, week, month"),
            )),
        }
    }
}

/// One bucket of a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub period: NaiveDate,
    pub count: i64,
}

/// Expand sparse `(bucket, count)` rows into a contiguous series covering
/// `range`, with zero for buckets that had no rows.
pub fn fill_trend(
    range: DateRange,
    interval: TrendInterval,
    rows: &[(NaiveDate, i64)],
) -> Vec<TrendPoint> {
    let mut counts: HashMap<NaiveDate, i64> = HashMap::with_capacity(rows.len());
    for (date, count) in rows {
        *counts.entry(interval.bucket_start(*date)).or_default() += count;
    }

    let mut series = Vec::new();
    let mut bucket = interval.bucket_start(range.start);
    while bucket <= range.end {
        series.push(TrendPoint {
            period: bucket,
            count: counts.get(&bucket).copied().unwrap_or(0),
        });
        match interval.next_bucket(bucket) {
            Some(next) => bucket = next,
            None => break,
        }
    }
    series
}

/// Percentage of `converted` over `total`, rounded to two decimals.
pub fn conversion_rate(converted: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = converted as f64 * 100.0 / total as f64;
    (rate * 100.0).round() / 100.0
}
