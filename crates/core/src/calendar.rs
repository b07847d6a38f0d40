//! Calendar events: time slots, capacity, recurrence and localized fields.

use std::sync::LazyLock;

use chrono::{Datelike, Days, Months, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// Most occurrences a single recurring request may create.
pub const MAX_OCCURRENCES: usize = 366;

/// Default look-ahead for the upcoming-events view.
pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// Longest look-ahead for the upcoming-events view.
pub const MAX_UPCOMING_DAYS: i64 = 365;

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Event,
    Class,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "EVENT",
            Self::Class => "CLASS",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "EVENT" => Ok(Self::Event),
            "CLASS" => Ok(Self::Class),
            other => Err(CoreError::Validation(format!(
                "Invalid event type '{other}'. Must be one of: EVENT, CLASS"
            ))),
        }
    }
}

/// Parse an `HH:MM` wall-clock time.
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, CoreError> {
    if !TIME_RE.is_match(value) {
        return Err(CoreError::Validation(format!(
            "{field} '{value}' must be a 24-hour HH:MM time"
        )));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| CoreError::Validation(format!("{field} '{value}' is not a valid time")))
}

/// Both times must be `HH:MM` and the slot must end after it starts.
pub fn validate_time_range(start_time: &str, end_time: &str) -> Result<(), CoreError> {
    let start = parse_time("start_time", start_time)?;
    let end = parse_time("end_time", end_time)?;
    if end <= start {
        return Err(CoreError::Validation(format!(
            "end_time {end_time} must be after start_time {start_time}"
        )));
    }
    Ok(())
}

pub fn validate_attendees(max: Option<i32>, current: Option<i32>) -> Result<(), CoreError> {
    if let Some(max) = max {
        if max <= 0 {
            return Err(CoreError::Validation(
                "max_attendees must be greater than 0".into(),
            ));
        }
    }
    if let Some(current) = current {
        if current < 0 {
            return Err(CoreError::Validation(
                "current_attendees must not be negative".into(),
            ));
        }
        if let Some(max) = max {
            if current > max {
                return Err(CoreError::Validation(format!(
                    "current_attendees ({current}) exceeds max_attendees ({max})"
                )));
            }
        }
    }
    Ok(())
}

/// Date window `[today, today + days]` for the upcoming view.
pub fn upcoming_range(today: Date, days: Option<i64>) -> (Date, Date) {
    let days = days
        .unwrap_or(DEFAULT_UPCOMING_DAYS)
        .clamp(1, MAX_UPCOMING_DAYS);
    let end = today
        .checked_add_days(Days::new(days as u64))
        .unwrap_or(today);
    (today, end)
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

/// Dates a recurring event falls on between `start` and `end` inclusive.
///
/// `days_of_week` uses 0 = Sunday. When empty, weekly patterns repeat on the
/// weekday of `start`; daily patterns take every day. Monthly patterns repeat
/// on the day-of-month of `start`, skipping months that lack it, and ignore
/// `days_of_week`.
pub fn expand_recurrence(
    start: Date,
    end: Date,
    pattern: RecurrencePattern,
    days_of_week: &[u32],
) -> Result<Vec<Date>, CoreError> {
    if end < start {
        return Err(CoreError::Validation(format!(
            "end_date {end} is before start_date {start}"
        )));
    }
    if let Some(bad) = days_of_week.iter().find(|d| **d > 6) {
        return Err(CoreError::Validation(format!(
            "days_of_week value {bad} must be between 0 (Sunday) and 6"
        )));
    }

    // One past the cap is enough to report the overflow.
    let limit = MAX_OCCURRENCES + 1;
    let in_range = start.iter_days().take_while(|d| *d <= end);
    let dates: Vec<Date> = match pattern {
        RecurrencePattern::Monthly => monthly_dates(start, end).take(limit).collect(),
        RecurrencePattern::Daily => in_range
            .filter(|d| days_of_week.is_empty() || days_of_week.contains(&weekday(*d)))
            .take(limit)
            .collect(),
        RecurrencePattern::Weekly | RecurrencePattern::Biweekly => {
            let every = if pattern == RecurrencePattern::Weekly { 1 } else { 2 };
            let anchor = week_start(start)?;
            let wanted: Vec<u32> = if days_of_week.is_empty() {
                vec![weekday(start)]
            } else {
                days_of_week.to_vec()
            };
            in_range
                .filter(|d| {
                    let week = (*d - anchor).num_days() / 7;
                    week % every == 0 && wanted.contains(&weekday(*d))
                })
                .take(limit)
                .collect()
        }
    };

    if dates.is_empty() {
        return Err(CoreError::Validation(
            "Recurrence produces no dates in the given range".into(),
        ));
    }
    if dates.len() > MAX_OCCURRENCES {
        return Err(CoreError::Validation(format!(
            "Recurrence produces more than {MAX_OCCURRENCES} dates"
        )));
    }
    Ok(dates)
}

fn weekday(date: Date) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Sunday on or before `date`.
fn week_start(date: Date) -> Result<Date, CoreError> {
    date.checked_sub_days(Days::new(u64::from(weekday(date))))
        .ok_or_else(|| {
            CoreError::Validation(format!("start_date {date} is out of the supported range"))
        })
}

fn monthly_dates(start: Date, end: Date) -> impl Iterator<Item = Date> {
    let day = start.day();
    let first_of_month = start.with_day(1).unwrap_or(start);
    (0u32..)
        .map_while(move |offset| first_of_month.checked_add_months(Months::new(offset)))
        .take_while(move |month| *month <= end)
        .filter_map(move |month| month.with_day(day))
        .filter(move |date| *date >= start && *date <= end)
}

// ---------------------------------------------------------------------------
// Localization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ko,
    En,
}

impl Locale {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ko" => Ok(Self::Ko),
            "en" => Ok(Self::En),
            other => Err(CoreError::Validation(format!(
                "Unsupported locale '{other}'. Must be one of: ko, en"
            ))),
        }
    }
}

/// Resolve a field to its localized variant, falling back to the base value
/// when no locale is requested or the variant is blank.
pub fn localize(
    base: Option<String>,
    ko: Option<&str>,
    en: Option<&str>,
    locale: Option<Locale>,
) -> Option<String> {
    let variant = match locale {
        Some(Locale::Ko) => ko,
        Some(Locale::En) => en,
        None => None,
    };
    match variant.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => base,
    }
}
