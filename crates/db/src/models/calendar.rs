//! Calendar events and event registrations.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tnc_core::calendar::{localize, Locale, RecurrencePattern};
use tnc_core::types::{Date, DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarEvent {
    pub id: DbId,
    pub date: Date,
    pub title: String,
    pub title_ko: Option<String>,
    pub title_en: Option<String>,
    /// `HH:MM`.
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub location_ko: Option<String>,
    pub location_en: Option<String>,
    pub description: Option<String>,
    pub description_ko: Option<String>,
    pub description_en: Option<String>,
    pub instructor_name: Option<String>,
    pub instructor_id: Option<DbId>,
    pub max_attendees: Option<i32>,
    pub current_attendees: i32,
    pub event_type: String,
    pub tags: Vec<String>,
    pub is_registration_open: bool,
    pub course_id: Option<DbId>,
    /// Shared by events created together by one recurring request.
    pub recurrence_group: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CalendarEvent {
    /// Replace title, location and description with the requested locale's
    /// variants where they exist.
    pub fn localized(mut self, locale: Option<Locale>) -> Self {
        if locale.is_none() {
            return self;
        }
        self.title = localize(
            Some(std::mem::take(&mut self.title)),
            self.title_ko.as_deref(),
            self.title_en.as_deref(),
            locale,
        )
        .unwrap_or_default();
        self.location = localize(
            self.location.take(),
            self.location_ko.as_deref(),
            self.location_en.as_deref(),
            locale,
        );
        self.description = localize(
            self.description.take(),
            self.description_ko.as_deref(),
            self.description_en.as_deref(),
            locale,
        );
        self
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCalendarEvent {
    pub date: Date,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub title_ko: Option<String>,
    pub title_en: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub location_ko: Option<String>,
    pub location_en: Option<String>,
    pub description: Option<String>,
    pub description_ko: Option<String>,
    pub description_en: Option<String>,
    pub instructor_name: Option<String>,
    pub instructor_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub max_attendees: Option<i32>,
    #[validate(range(min = 0))]
    pub current_attendees: Option<i32>,
    pub event_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_registration_open: Option<bool>,
    pub course_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCalendarEvent {
    pub date: Option<Date>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub title_ko: Option<String>,
    pub title_en: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub location_ko: Option<String>,
    pub location_en: Option<String>,
    pub description: Option<String>,
    pub description_ko: Option<String>,
    pub description_en: Option<String>,
    pub instructor_name: Option<String>,
    pub instructor_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub max_attendees: Option<i32>,
    pub event_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_registration_open: Option<bool>,
    pub course_id: Option<DbId>,
}

/// Body of `POST /calendar/recurring`: a base event repeated over a range.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecurringEvents {
    #[validate(nested)]
    pub event: CreateCalendarEvent,
    pub start_date: Date,
    pub end_date: Date,
    pub pattern: RecurrencePattern,
    /// 0 = Sunday.
    #[serde(default)]
    pub days_of_week: Vec<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarFilter {
    pub date: Option<Date>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub event_type: Option<String>,
    pub instructor_id: Option<DbId>,
    pub location: Option<String>,
    pub course_id: Option<DbId>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventRegistration {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetRegistrationStatus {
    pub is_registration_open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn event() -> CalendarEvent {
        CalendarEvent {
            id: 1,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            title: "AWS Basics".into(),
            title_ko: Some("AWS 기초".into()),
            title_en: None,
            start_time: "09:00".into(),
            end_time: "12:00".into(),
            location: Some("Room A".into()),
            location_ko: Some("A 강의실".into()),
            location_en: Some("Room A (east wing)".into()),
            description: None,
            description_ko: None,
            description_en: None,
            instructor_name: None,
            instructor_id: None,
            max_attendees: None,
            current_attendees: 0,
            event_type: "EVENT".into(),
            tags: vec![],
            is_registration_open: true,
            course_id: None,
            recurrence_group: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn korean_locale_uses_korean_variants() {
        let e = event().localized(Some(Locale::Ko));
        assert_eq!(e.title, "AWS 기초");
        assert_eq!(e.location.as_deref(), Some("A 강의실"));
    }

    #[test]
    fn missing_variant_falls_back_to_base() {
        let e = event().localized(Some(Locale::En));
        assert_eq!(e.title, "AWS Basics");
        assert_eq!(e.location.as_deref(), Some("Room A (east wing)"));
        assert!(e.description.is_none());
    }
}
