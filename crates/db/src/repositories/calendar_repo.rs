//! Repository for `calendar_events` and `event_registrations`.

use sqlx::{PgPool, Postgres, Transaction};
use tnc_core::types::{Date, DbId};

use crate::filter::Filter;
use crate::models::calendar::{
    CalendarEvent, CalendarFilter, CreateCalendarEvent, EventRegistration, UpdateCalendarEvent,
};

const COLUMNS: &str = "id, date, title, title_ko, title_en, start_time, end_time, location, \
                       location_ko, location_en, description, description_ko, description_en, \
                       instructor_name, instructor_id, max_attendees, current_attendees, \
                       event_type, tags, is_registration_open, course_id, recurrence_group, \
                       created_at, updated_at";

const REGISTRATION_COLUMNS: &str = "id, event_id, user_id, created_at, updated_at";

const INSERT: &str = "INSERT INTO calendar_events (
        date, title, title_ko, title_en, start_time, end_time, location, location_ko,
        location_en, description, description_ko, description_en, instructor_name,
        instructor_id, max_attendees, current_attendees, event_type, tags,
        is_registration_open, course_id, recurrence_group)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
             COALESCE($16, 0), COALESCE($17, 'EVENT'), $18, COALESCE($19, true), $20, $21)";

pub struct CalendarRepo;

impl CalendarRepo {
    async fn insert<'e, E>(
        executor: E,
        date: Date,
        input: &CreateCalendarEvent,
        recurrence_group: Option<&str>,
    ) -> Result<CalendarEvent, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("{INSERT} RETURNING {COLUMNS}");
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(date)
            .bind(input.title.trim())
            .bind(&input.title_ko)
            .bind(&input.title_en)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(&input.location)
            .bind(&input.location_ko)
            .bind(&input.location_en)
            .bind(&input.description)
            .bind(&input.description_ko)
            .bind(&input.description_en)
            .bind(&input.instructor_name)
            .bind(input.instructor_id)
            .bind(input.max_attendees)
            .bind(input.current_attendees)
            .bind(&input.event_type)
            .bind(&input.tags)
            .bind(input.is_registration_open)
            .bind(input.course_id)
            .bind(recurrence_group)
            .fetch_one(executor)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        input: &CreateCalendarEvent,
    ) -> Result<CalendarEvent, sqlx::Error> {
        Self::insert(pool, input.date, input, None).await
    }

    /// Create a class event for a course and flag the course as added, atomically.
    pub async fn create_for_course(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateCalendarEvent,
    ) -> Result<CalendarEvent, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
        let event = Self::insert(&mut *tx, input.date, input, None).await?;
        crate::repositories::CourseRepo::mark_added_to_calendar(&mut *tx, course_id).await?;
        tx.commit().await?;
        Ok(event)
    }

    /// Insert one event per date, all sharing `recurrence_group`.
    pub async fn create_series(
        pool: &PgPool,
        dates: &[Date],
        input: &CreateCalendarEvent,
        recurrence_group: &str,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
        let mut events = Vec::with_capacity(dates.len());
        for date in dates {
            events.push(Self::insert(&mut *tx, *date, input, Some(recurrence_group)).await?);
        }
        tx.commit().await?;
        Ok(events)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CalendarEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM calendar_events WHERE id = $1");
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &CalendarFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("date", params.date)
            .gte("date", params.from)
            .lte("date", params.to)
            .eq("event_type", params.event_type.as_deref())
            .eq("instructor_id", params.instructor_id)
            .eq("course_id", params.course_id)
            .text_search(
                &["location", "location_ko", "location_en"],
                params.location.as_deref(),
            )
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_events {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, CalendarEvent>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    /// Events between `from` and `to` inclusive in chronological order.
    pub async fn list_between(
        pool: &PgPool,
        from: Date,
        to: Date,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_events
             WHERE date BETWEEN $1 AND $2
             ORDER BY date ASC, start_time ASC, id ASC"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    pub async fn count_between(pool: &PgPool, from: Date, to: Date) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM calendar_events WHERE date BETWEEN $1 AND $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCalendarEvent,
    ) -> Result<Option<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_events SET
                date = COALESCE($2, date),
                title = COALESCE($3, title),
                title_ko = COALESCE($4, title_ko),
                title_en = COALESCE($5, title_en),
                start_time = COALESCE($6, start_time),
                end_time = COALESCE($7, end_time),
                location = COALESCE($8, location),
                location_ko = COALESCE($9, location_ko),
                location_en = COALESCE($10, location_en),
                description = COALESCE($11, description),
                description_ko = COALESCE($12, description_ko),
                description_en = COALESCE($13, description_en),
                instructor_name = COALESCE($14, instructor_name),
                instructor_id = COALESCE($15, instructor_id),
                max_attendees = COALESCE($16, max_attendees),
                event_type = COALESCE($17, event_type),
                tags = COALESCE($18, tags),
                is_registration_open = COALESCE($19, is_registration_open),
                course_id = COALESCE($20, course_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .bind(input.date)
            .bind(&input.title)
            .bind(&input.title_ko)
            .bind(&input.title_en)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(&input.location)
            .bind(&input.location_ko)
            .bind(&input.location_en)
            .bind(&input.description)
            .bind(&input.description_ko)
            .bind(&input.description_en)
            .bind(&input.instructor_name)
            .bind(input.instructor_id)
            .bind(input.max_attendees)
            .bind(&input.event_type)
            .bind(&input.tags)
            .bind(input.is_registration_open)
            .bind(input.course_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_registration_open(
        pool: &PgPool,
        id: DbId,
        open: bool,
    ) -> Result<Option<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_events SET is_registration_open = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .bind(open)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Registrations
    // -----------------------------------------------------------------------

    /// Register a user for an event.
    ///
    /// The seat is claimed by a single conditional `UPDATE`; `None` means the
    /// event is closed or full. A repeated registration fails with a unique
    /// violation on `uq_event_registrations_event_user`.
    pub async fn register(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<Option<EventRegistration>, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
        let query = format!(
            "INSERT INTO event_registrations (event_id, user_id) VALUES ($1, $2)
             RETURNING {REGISTRATION_COLUMNS}"
        );
        let registration = sqlx::query_as::<_, EventRegistration>(&query)
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let claimed = sqlx::query(
            "UPDATE calendar_events SET current_attendees = current_attendees + 1
             WHERE id = $1
               AND is_registration_open = true
               AND (max_attendees IS NULL OR current_attendees < max_attendees)",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }
        tx.commit().await?;
        Ok(Some(registration))
    }

    /// Cancel a registration and release the seat. `false` when none existed.
    pub async fn unregister(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
        let removed = sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            return Ok(false);
        }
        sqlx::query(
            "UPDATE calendar_events SET current_attendees = GREATEST(0, current_attendees - 1)
             WHERE id = $1",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    pub async fn is_registered(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Events the user is registered for, soonest first.
    pub async fn list_registered_events(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_events
             WHERE id IN (SELECT event_id FROM event_registrations WHERE user_id = $1)
             ORDER BY date ASC, start_time ASC"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
