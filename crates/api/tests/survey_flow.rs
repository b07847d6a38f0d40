//! Survey questions, templates, deployed surveys and learner responses.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    create_course, delete_auth, expect_data, get, get_auth, instructor_token, post_json,
    post_json_auth, put_json_auth,
};
use serde_json::{json, Value};
use sqlx::PgPool;

struct SurveyFixture {
    share_code: String,
    course_id: i64,
    template_id: i64,
    rating_id: i64,
    choice_id: i64,
}

async fn create(pool: &PgPool, token: &str, uri: &str, body: Value) -> Value {
    expect_data(
        post_json_auth(common::build_test_app(pool.clone()), uri, body, token).await,
        StatusCode::CREATED,
    )
    .await
}

async fn setup(pool: &PgPool, token: &str) -> SurveyFixture {
    let course = create_course(pool, token).await;
    let rating = create(
        pool,
        token,
        "/api/v1/survey-questions",
        json!({ "content": "Rate the course", "question_type": "RATING", "required": true }),
    )
    .await;
    let choice = create(
        pool,
        token,
        "/api/v1/survey-questions",
        json!({
            "content": "Favourite part",
            "question_type": "SINGLE_CHOICE",
            "options": [
                { "value": "labs", "label": "Labs" },
                { "value": "lectures", "label": "Lectures" }
            ]
        }),
    )
    .await;
    let template = create(
        pool,
        token,
        "/api/v1/survey-catalogs",
        json!({
            "title": "Course feedback",
            "question_items": [
                { "question_id": rating["id"], "order": 1 },
                { "question_id": choice["id"], "order": 2 }
            ]
        }),
    )
    .await;

    SurveyFixture {
        share_code: course["share_code"].as_str().unwrap().to_string(),
        course_id: course["id"].as_i64().unwrap(),
        template_id: template["id"].as_i64().unwrap(),
        rating_id: rating["id"].as_i64().unwrap(),
        choice_id: choice["id"].as_i64().unwrap(),
    }
}

async fn deploy(pool: &PgPool, token: &str, fx: &SurveyFixture, deploy_option: &str) -> Value {
    let now = Utc::now();
    create(
        pool,
        token,
        "/api/v1/surveys",
        json!({
            "survey_catalog_id": fx.template_id,
            "course_id": fx.course_id,
            "deploy_option": deploy_option,
            "start_date": now - Duration::hours(1),
            "end_date": now + Duration::days(7),
            "total_participants": 4
        }),
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_choice_question_needs_options(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/survey-questions",
        json!({
            "content": "Pick",
            "question_type": "DROPDOWN",
            "options": [{ "value": "only", "label": "Only" }]
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_survey_snapshots_template_and_defaults_title(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let fx = setup(&pool, &token).await;
    let survey = deploy(&pool, &token, &fx, "MANUAL").await;

    assert_eq!(survey["title"], "Course feedback");
    assert_eq!(survey["status"], "SCHEDULED");
    let questions = survey["question_items"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["question_id"], fx.rating_id);
    assert_eq!(questions[0]["required"], true);

    // Not yet active, so learners are turned away.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!(
            "/api/v1/take/{}/surveys/{}/responses",
            fx.share_code, survey["id"]
        ),
        json!({ "respondent_id": "r1", "answers": [{ "question_id": fx.rating_id, "value": 5 }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let activated = expect_data(
        put_json_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/surveys/{}/status", survey["id"]),
            json!({ "status": "ACTIVE" }),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(activated["status"], "ACTIVE");

    // Templates in use by a survey stay put.
    let response = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/survey-catalogs/{}", fx.template_id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_responses_update_totals_and_analytics(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let fx = setup(&pool, &token).await;
    let survey = deploy(&pool, &token, &fx, "IMMEDIATE").await;
    assert_eq!(survey["status"], "ACTIVE");
    let survey_id = survey["id"].as_i64().unwrap();
    let submit = format!(
        "/api/v1/take/{}/surveys/{survey_id}/responses",
        fx.share_code
    );

    let learner_view = expect_data(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/take/{}/surveys/{survey_id}", fx.share_code),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(learner_view["questions"].as_array().unwrap().len(), 2);

    // The rating is required.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &submit,
        json!({ "respondent_id": "r1", "answers": [{ "question_id": fx.choice_id, "value": "labs" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Choices must come from the option list.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &submit,
        json!({
            "respondent_id": "r1",
            "answers": [
                { "question_id": fx.rating_id, "value": 4 },
                { "question_id": fx.choice_id, "value": "breaks" }
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({
        "respondent_id": "r1",
        "answers": [
            { "question_id": fx.rating_id, "value": 4 },
            { "question_id": fx.choice_id, "value": "labs" }
        ],
        "feedback_text": "More labs please"
    });
    let response = post_json(common::build_test_app(pool.clone()), &submit, body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // One response per respondent.
    let response = post_json(common::build_test_app(pool.clone()), &submit, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let refreshed = expect_data(
        get_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/surveys/{survey_id}"),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(refreshed["total_responses"], 1);
    assert_eq!(refreshed["completion_rate"], 25.0);

    let analytics = expect_data(
        get_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/surveys/{survey_id}/analytics"),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(analytics["total_responses"], 1);
    assert_eq!(analytics["average_rating"], 4.0);

    let responses = expect_data(
        get_auth(
            common::build_test_app(pool),
            &format!("/api/v1/surveys/{survey_id}/responses"),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(responses["items"][0]["respondent_id"], "r1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_survey_of_other_course_is_hidden(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let fx = setup(&pool, &token).await;
    let survey = deploy(&pool, &token, &fx, "IMMEDIATE").await;
    let other = create_course(&pool, &token).await;

    let response = get(
        common::build_test_app(pool),
        &format!(
            "/api/v1/take/{}/surveys/{}",
            other["share_code"].as_str().unwrap(),
            survey["id"]
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_inverted_window_is_rejected(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let fx = setup(&pool, &token).await;
    let now = Utc::now();

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/surveys",
        json!({
            "survey_catalog_id": fx.template_id,
            "start_date": now + Duration::days(2),
            "end_date": now + Duration::days(1)
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_repeated_or_off_scale_answers_are_rejected(pool: PgPool) {
    let token = instructor_token(&pool).await;
    let fx = setup(&pool, &token).await;
    let survey = deploy(&pool, &token, &fx, "IMMEDIATE").await;
    let survey_id = survey["id"].as_i64().unwrap();
    let submit = format!(
        "/api/v1/take/{}/surveys/{survey_id}/responses",
        fx.share_code
    );

    let repeated = json!({
        "respondent_id": "r1",
        "answers": [
            { "question_id": fx.rating_id, "value": 5 },
            { "question_id": fx.rating_id, "value": 5 },
            { "question_id": fx.rating_id, "value": 5 }
        ]
    });
    let off_scale = json!({
        "respondent_id": "r2",
        "answers": [{ "question_id": fx.rating_id, "value": 1000000 }]
    });
    let below_scale = json!({
        "respondent_id": "r3",
        "answers": [{ "question_id": fx.rating_id, "value": 0 }]
    });
    for body in [repeated, off_scale, below_scale] {
        let response = post_json(common::build_test_app(pool.clone()), &submit, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let analytics = expect_data(
        get_auth(
            common::build_test_app(pool),
            &format!("/api/v1/surveys/{survey_id}/analytics"),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(analytics["total_responses"], 0);
}
