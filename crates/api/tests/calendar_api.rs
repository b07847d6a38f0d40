//! Calendar events, recurring series and registrations.

mod common;

use axum::http::StatusCode;
use common::{
    delete_auth, expect_data, get_auth, instructor_token, post_json_auth, put_json_auth,
    seed_user, ROLE_VIEWER,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_event(pool: &PgPool, token: &str, body: Value) -> Value {
    expect_data(
        post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/calendar",
            body,
            token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_event_times_are_validated(pool: PgPool) {
    let token = instructor_token(&pool).await;

    for (start, end) in [("10:00", "09:00"), ("9am", "10:00"), ("25:00", "26:00")] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/calendar",
            json!({
                "date": "2026-07-01",
                "title": "Workshop",
                "start_time": start,
                "end_time": end
            }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{start}-{end}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_locale_picks_translated_fields(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let event = create_event(
        &pool,
        &token,
        json!({
            "date": "2026-07-01",
            "title": "Workshop",
            "title_ko": "워크숍",
            "title_en": "Hands-on Workshop",
            "start_time": "13:00",
            "end_time": "17:00"
        }),
    )
    .await;
    let uri = format!("/api/v1/calendar/{}", event["id"]);

    let ko = expect_data(
        get_auth(common::build_test_app(pool.clone()), &format!("{uri}?locale=ko"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ko["title"], "워크숍");

    let plain = expect_data(
        get_auth(common::build_test_app(pool.clone()), &uri, &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(plain["title"], "Workshop");

    let response = get_auth(
        common::build_test_app(pool),
        &format!("{uri}?locale=fr"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_registration_respects_capacity_and_status(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let (_, first) = seed_user(&pool, "first", ROLE_VIEWER).await;
    let (_, second) = seed_user(&pool, "second", ROLE_VIEWER).await;
    let event = create_event(
        &pool,
        &token,
        json!({
            "date": "2026-07-02",
            "title": "Small group lab",
            "start_time": "10:00",
            "end_time": "12:00",
            "max_attendees": 1,
            "is_registration_open": true
        }),
    )
    .await;
    let registrations = format!("/api/v1/calendar/{}/registrations", event["id"]);
    let status_uri = format!("/api/v1/calendar/{}/registration-status", event["id"]);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &registrations,
        json!({}),
        &first,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let status = expect_data(
        get_auth(common::build_test_app(pool.clone()), &status_uri, &first).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(status["is_registered"], true);
    assert_eq!(status["current_attendees"], 1);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &registrations,
        json!({}),
        &second,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let mine = expect_data(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/calendar/my-registrations",
            &first,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // Cancelling frees the seat, then closing registration blocks everyone.
    let response = delete_auth(common::build_test_app(pool.clone()), &registrations, &first).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(common::build_test_app(pool.clone()), &registrations, &first).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let closed = expect_data(
        put_json_auth(
            common::build_test_app(pool.clone()),
            &status_uri,
            json!({ "is_registration_open": false }),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(closed["is_registration_open"], false);

    let response = post_json_auth(
        common::build_test_app(pool),
        &registrations,
        json!({}),
        &second,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_weekly_series_on_chosen_days(pool: PgPool) {
    let token = instructor_token(&pool).await;

    let events = expect_data(
        post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/calendar/recurring",
            json!({
                "event": {
                    "date": "2026-06-01",
                    "title": "Office hours",
                    "start_time": "16:00",
                    "end_time": "17:00"
                },
                "start_date": "2026-06-01",
                "end_date": "2026-06-29",
                "pattern": "weekly",
                "days_of_week": [1, 3]
            }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let events = events.as_array().unwrap();
    // Mondays 1, 8, 15, 22, 29 and Wednesdays 3, 10, 17, 24.
    assert_eq!(events.len(), 9);
    assert_eq!(events[0]["date"], "2026-06-01");
    let group = &events[0]["recurrence_group"];
    assert!(group.is_string());
    assert!(events.iter().all(|e| &e["recurrence_group"] == group));

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/calendar/recurring",
        json!({
            "event": {
                "date": "2026-06-01",
                "title": "Bad days",
                "start_time": "16:00",
                "end_time": "17:00"
            },
            "start_date": "2026-06-01",
            "end_date": "2026-06-29",
            "pattern": "weekly",
            "days_of_week": [7]
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_viewer_cannot_create_events(pool: PgPool) {
    let (_, viewer) = seed_user(&pool, "viewer", ROLE_VIEWER).await;
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/calendar",
        json!({
            "date": "2026-07-01",
            "title": "Nope",
            "start_time": "10:00",
            "end_time": "11:00"
        }),
        &viewer,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
