//! Customers, catalog entries and scheduled courses.

mod common;

use axum::http::StatusCode;
use common::{
    create_course, delete_auth, expect_data, get, get_auth, instructor_token, post_json_auth,
    put_json_auth, seed_user, ROLE_VIEWER,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_course_gets_share_code_and_defaults(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let course = create_course(&pool, &token).await;

    assert_eq!(course["status"], "scheduled");
    assert_eq!(course["current_seats"], 0);
    assert_eq!(course["is_added_to_calendar"], false);
    assert_eq!(course["share_code"].as_str().unwrap().len(), 6);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_share_code_lookup_is_public_and_case_insensitive(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let course = create_course(&pool, &token).await;
    let code = course["share_code"].as_str().unwrap().to_lowercase();

    let found = expect_data(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/courses/by-share-code/{code}"),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(found["id"], course["id"]);

    let response = get(
        common::build_test_app(pool),
        "/api/v1/courses/by-share-code/ZZZZZZ",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_course_rejects_inverted_dates(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let course = create_course(&pool, &token).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/courses",
        json!({
            "catalog_id": course["catalog_id"],
            "customer_id": course["customer_id"],
            "title": "Backwards",
            "start_date": "2026-06-10",
            "end_date": "2026-06-01"
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_status_transitions(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let course = create_course(&pool, &token).await;
    let uri = format!("/api/v1/courses/{}/status", course["id"]);

    let updated = expect_data(
        put_json_auth(
            common::build_test_app(pool.clone()),
            &uri,
            json!({ "status": "inProgress" }),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["status"], "inProgress");

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "status": "scheduled" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        common::build_test_app(pool),
        &uri,
        json!({ "status": "postponed" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_add_to_calendar_once(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let course = create_course(&pool, &token).await;
    let uri = format!("/api/v1/courses/{}/calendar", course["id"]);

    let event = expect_data(
        post_json_auth(common::build_test_app(pool.clone()), &uri, json!({}), &token).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(event["event_type"], "CLASS");
    assert_eq!(event["date"], "2026-06-01");
    assert_eq!(event["course_id"], course["id"]);

    let refreshed = expect_data(
        get_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/courses/{}", course["id"]),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(refreshed["is_added_to_calendar"], true);

    let response = post_json_auth(common::build_test_app(pool), &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_viewer_cannot_create_customers(pool: PgPool) {
    let (_, viewer) = seed_user(&pool, "viewer", ROLE_VIEWER).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/customers",
        json!({ "customer_name": "Nope Inc" }),
        &viewer,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Reads are open to every signed-in role.
    let response = get_auth(common::build_test_app(pool), "/api/v1/customers", &viewer).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_customer_list_pages_with_next_token(pool: PgPool) {
    let token = instructor_token(&pool).await;
    for i in 0..3 {
        post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/customers",
            json!({ "customer_name": format!("Customer {i}") }),
            &token,
        )
        .await;
    }

    let first = expect_data(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/customers?limit=2",
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(first["items"].as_array().unwrap().len(), 2);
    let next = first["next_token"].as_str().unwrap();

    let second = expect_data(
        get_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/customers?limit=2&next_token={next}"),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
    assert!(second["next_token"].is_null());

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/customers?next_token=bogus",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_catalog_modules_are_nested(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let catalog = expect_data(
        post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/catalogs",
            json!({ "title": "Serverless Patterns" }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let base = format!("/api/v1/catalogs/{}/modules", catalog["id"]);

    let module = expect_data(
        post_json_auth(
            common::build_test_app(pool.clone()),
            &base,
            json!({ "module_number": 1, "title": "Functions" }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    let modules = expect_data(
        get_auth(common::build_test_app(pool.clone()), &base, &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(modules.as_array().unwrap().len(), 1);

    // A module is only reachable under its own catalog.
    let other = format!("/api/v1/catalogs/{}/modules/{}", catalog["id"].as_i64().unwrap() + 1, module["id"]);
    let response = get_auth(common::build_test_app(pool.clone()), &other, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(
        common::build_test_app(pool),
        &format!("{base}/{}", module["id"]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
