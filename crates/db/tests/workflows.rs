//! Multi-row repository operations: quiz attempts, survey counters, event
//! registration capacity, metric upserts and refresh-token rotation.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use tnc_core::question_bank::{AnswerValue, QuestionOption};
use tnc_core::quiz::{QuizQuestionItem, ResponseOutcome};
use tnc_core::survey::{SnapshotQuestion, SurveyAnswer, SurveyQuestionType, SurveyValue};
use tnc_db::models::calendar::CreateCalendarEvent;
use tnc_db::models::catalog::CreateCourseCatalog;
use tnc_db::models::course::CreateCourse;
use tnc_db::models::course_quiz::CreateCourseQuiz;
use tnc_db::models::customer::CreateCustomer;
use tnc_db::models::dashboard::{MetricWithTrend, UpsertMetric};
use tnc_db::models::question_bank::CreateQuestionBankItem;
use tnc_db::models::quiz_attempt::{CreateQuizAttempt, CreateQuizResponse};
use tnc_db::models::quiz_catalog::CreateQuizCatalog;
use tnc_db::models::session::CreateSession;
use tnc_db::models::survey::{NewSurvey, UpdateSurvey};
use tnc_db::models::survey_catalog::CreateSurveyCatalog;
use tnc_db::models::survey_response::CreateSurveyResponse;
use tnc_db::models::user::CreateUser;
use tnc_db::repositories::{
    CalendarRepo, CatalogRepo, CourseQuizRepo, CourseRepo, CustomerRepo, DashboardRepo,
    QuestionBankRepo, QuizAttemptRepo, QuizCatalogRepo, SurveyCatalogRepo, SurveyRepo,
    SessionRepo, SurveyResponseRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_course(pool: &PgPool) -> i64 {
    let customer = CustomerRepo::create(
        pool,
        &CreateCustomer {
            customer_name: "Acme".into(),
            email: None,
            phone: None,
            address: None,
            organization_name: None,
            organization_size: None,
            industry: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let catalog = CatalogRepo::create(
        pool,
        &CreateCourseCatalog {
            title: "Cloud Essentials".into(),
            aws_code: None,
            version: None,
            durations: None,
            level: None,
            description: None,
            category: None,
            tags: vec![],
            prerequisites: vec![],
            objectives: vec![],
            status: Some("active".into()),
        },
        &[],
        None,
    )
    .await
    .unwrap();
    let course = CourseRepo::create(
        pool,
        &CreateCourse {
            catalog_id: catalog.id,
            customer_id: customer.id,
            instructor_id: None,
            title: "Cloud Essentials for Acme".into(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end_date: None,
            location: None,
            status: None,
            max_seats: None,
            current_seats: None,
        },
        "QWE234",
    )
    .await
    .unwrap();
    course.id
}

async fn seed_user(pool: &PgPool, name: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: name.into(),
            email: format!("{name}@example.com"),
            password_hash: "not-a-real-hash".into(),
            role_id: 3,
        },
    )
    .await
    .unwrap()
    .id
}

fn event(max_attendees: Option<i32>) -> CreateCalendarEvent {
    CreateCalendarEvent {
        date: NaiveDate::from_ymd_opt(2026, 6, 2).unwrap(),
        title: "Office hours".into(),
        title_ko: None,
        title_en: None,
        start_time: "10:00".into(),
        end_time: "11:00".into(),
        location: None,
        location_ko: None,
        location_en: None,
        description: None,
        description_ko: None,
        description_en: None,
        instructor_name: None,
        instructor_id: None,
        max_attendees,
        current_attendees: None,
        event_type: None,
        tags: vec![],
        is_registration_open: None,
        course_id: None,
    }
}

fn is_constraint(err: &sqlx::Error, name: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(name))
}

// ---------------------------------------------------------------------------
// Quiz attempts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_attempt_is_stored_with_responses(pool: PgPool) {
    let course_id = seed_course(&pool).await;
    let question = QuestionBankRepo::create(
        &pool,
        &CreateQuestionBankItem {
            content: "Which service stores objects?".into(),
            question_type: "multipleChoice".into(),
            options: vec![
                QuestionOption {
                    option_id: "a".into(),
                    content: "S3".into(),
                    is_correct: true,
                },
                QuestionOption {
                    option_id: "b".into(),
                    content: "EC2".into(),
                    is_correct: false,
                },
            ],
            correct_answer: AnswerValue::Single("a".into()),
            explanation: None,
            difficulty: Some("easy".into()),
            tags: vec![],
            points: None,
            catalog_id: None,
            metadata: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(question.points, 1);

    let template = QuizCatalogRepo::create(
        &pool,
        &CreateQuizCatalog {
            title: "Pre-test".into(),
            description: None,
            question_items: vec![QuizQuestionItem {
                question_id: question.id,
                order: 1,
                points: None,
            }],
            default_time_limit: None,
            category: None,
            difficulty: None,
            tags: vec![],
            is_active: None,
            metadata: None,
            catalog_id: None,
        },
        1,
        None,
    )
    .await
    .unwrap();
    assert!(QuestionBankRepo::is_referenced(&pool, question.id).await.unwrap());

    let quiz = CourseQuizRepo::create(
        &pool,
        &CreateCourseQuiz {
            course_id,
            quiz_catalog_id: template.id,
            quiz_type: "pre".into(),
            title: None,
            time_limit: None,
            passing_score: None,
            max_attempts: Some(2),
            show_answers: None,
            randomize_questions: None,
            start_at: None,
            end_at: None,
            is_active: None,
        },
    )
    .await
    .unwrap();

    let attempt = CreateQuizAttempt {
        course_quiz_id: quiz.id,
        course_id,
        user_id: "learner-1".into(),
        attempt_key: format!("learner-1#{course_id}#{}", quiz.id),
        course_quiz_key: format!("{course_id}#pre#{}", quiz.id),
        attempt_number: 1,
        score: 100,
        earned_points: 1,
        total_points: 1,
        status: "passed",
        time_spent: Some(30),
        started_at: None,
    };
    let responses = vec![CreateQuizResponse {
        response_key: "1#1".into(),
        question_id: question.id,
        question_number: "1".into(),
        selected_answer: Some(AnswerValue::Single("a".into())),
        is_correct: true,
        needs_review: false,
        points_awarded: 1,
        time_spent: None,
    }];
    let (row, stored) = QuizAttemptRepo::record(&pool, &attempt, &responses).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].attempt_id, row.id);
    assert_eq!(
        QuizAttemptRepo::count_attempts(&pool, &attempt.attempt_key).await.unwrap(),
        1
    );

    // Same attempt number again collides and leaves nothing behind.
    let err = QuizAttemptRepo::record(&pool, &attempt, &responses).await.unwrap_err();
    assert!(is_constraint(&err, "uq_quiz_attempts_key_number"));
    assert_eq!(
        QuizAttemptRepo::count_attempts(&pool, &attempt.attempt_key).await.unwrap(),
        1
    );

    assert_eq!(QuizAttemptRepo::scores_for_quiz(&pool, quiz.id).await.unwrap(), vec![(100, true)]);
    assert_eq!(
        QuizAttemptRepo::correctness_for_quiz(&pool, quiz.id).await.unwrap(),
        vec![ResponseOutcome {
            question_id: Some(question.id),
            question_number: "1".into(),
            is_correct: true,
        }]
    );

    // Course-wide views: outcomes only count once the template is also a post-test.
    assert_eq!(
        QuizAttemptRepo::scores_for_course(&pool, course_id, "pre").await.unwrap(),
        vec![(100, true)]
    );
    assert!(QuizAttemptRepo::scores_for_course(&pool, course_id, "post").await.unwrap().is_empty());
    assert!(QuizAttemptRepo::paired_outcomes_for_course(&pool, course_id, "pre")
        .await
        .unwrap()
        .is_empty());
    CourseQuizRepo::create(
        &pool,
        &CreateCourseQuiz {
            course_id,
            quiz_catalog_id: template.id,
            quiz_type: "post".into(),
            title: None,
            time_limit: None,
            passing_score: None,
            max_attempts: None,
            show_answers: None,
            randomize_questions: None,
            start_at: None,
            end_at: None,
            is_active: None,
        },
    )
    .await
    .unwrap();
    let paired = QuizAttemptRepo::paired_outcomes_for_course(&pool, course_id, "pre")
        .await
        .unwrap();
    assert_eq!(paired.len(), 1);
    assert_eq!(paired[0].question_id, Some(question.id));
}

// ---------------------------------------------------------------------------
// Survey responses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_survey_counters_follow_responses(pool: PgPool) {
    let course_id = seed_course(&pool).await;
    let template = SurveyCatalogRepo::create(
        &pool,
        &CreateSurveyCatalog {
            title: "Course feedback".into(),
            description: None,
            question_items: vec![],
            category: None,
            tags: vec![],
            is_active: None,
            metadata: None,
        },
        None,
    )
    .await
    .unwrap();
    let now = Utc::now();
    let survey = SurveyRepo::create(
        &pool,
        &NewSurvey {
            survey_catalog_id: template.id,
            course_id: Some(course_id),
            title: "Course feedback".into(),
            description: None,
            status: "ACTIVE",
            deploy_option: "IMMEDIATE",
            deploy_when: None,
            start_date: now - Duration::hours(1),
            end_date: now + Duration::days(7),
            send_reminders: false,
            send_notifications: false,
            total_participants: 4,
            question_items: vec![SnapshotQuestion {
                question_id: 1,
                content: "Rate the course".into(),
                question_type: SurveyQuestionType::Rating,
                options: vec![],
                required: true,
                order: 1,
            }],
        },
    )
    .await
    .unwrap();
    assert_eq!(survey.question_items.0.len(), 1);

    let response = |respondent: &str| CreateSurveyResponse {
        survey_id: survey.id,
        course_id: Some(course_id),
        respondent_id: respondent.into(),
        response_key: format!("{respondent}#{course_id}#{}", survey.id),
        answers: vec![SurveyAnswer {
            question_id: 1,
            value: Some(SurveyValue::Number(5.0)),
            text: None,
        }],
        feedback_text: None,
    };

    let first = SurveyResponseRepo::create(&pool, &response("r1")).await.unwrap();
    SurveyResponseRepo::create(&pool, &response("r2")).await.unwrap();
    let err = SurveyResponseRepo::create(&pool, &response("r1")).await.unwrap_err();
    assert!(is_constraint(&err, "uq_survey_responses_response_key"));

    let reloaded = SurveyRepo::find_by_id(&pool, survey.id).await.unwrap().unwrap();
    assert_eq!(reloaded.total_responses, 2);
    assert_eq!(reloaded.completion_rate, 50.0);
    let course_surveys = SurveyRepo::list_for_course(&pool, course_id).await.unwrap();
    assert_eq!(course_surveys.len(), 1);
    assert_eq!(course_surveys[0].id, survey.id);

    assert!(SurveyResponseRepo::delete(&pool, survey.id, first.id).await.unwrap());
    let reloaded = SurveyRepo::find_by_id(&pool, survey.id).await.unwrap().unwrap();
    assert_eq!(reloaded.total_responses, 1);
    assert_eq!(reloaded.completion_rate, 25.0);

    let widened = UpdateSurvey {
        total_participants: Some(8),
        ..Default::default()
    };
    let updated = SurveyRepo::update(&pool, survey.id, &widened).await.unwrap().unwrap();
    assert_eq!(updated.completion_rate, 12.5);

    let answers = SurveyResponseRepo::all_answers(&pool, survey.id).await.unwrap();
    assert_eq!(answers.len(), 1);
}

// ---------------------------------------------------------------------------
// Calendar registrations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_registration_respects_capacity(pool: PgPool) {
    let created = CalendarRepo::create(&pool, &event(Some(1))).await.unwrap();
    assert_eq!(created.event_type, "EVENT");
    let kim = seed_user(&pool, "kim").await;
    let lee = seed_user(&pool, "lee").await;

    assert!(CalendarRepo::register(&pool, created.id, kim).await.unwrap().is_some());
    let err = CalendarRepo::register(&pool, created.id, kim).await.unwrap_err();
    assert!(is_constraint(&err, "uq_event_registrations_event_user"));

    // Full: the seat claim fails and the registration row is rolled back.
    assert!(CalendarRepo::register(&pool, created.id, lee).await.unwrap().is_none());
    assert!(!CalendarRepo::is_registered(&pool, created.id, lee).await.unwrap());

    assert!(CalendarRepo::unregister(&pool, created.id, kim).await.unwrap());
    assert!(!CalendarRepo::unregister(&pool, created.id, kim).await.unwrap());
    assert!(CalendarRepo::register(&pool, created.id, lee).await.unwrap().is_some());

    let reloaded = CalendarRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.current_attendees, 1);

    let mine = CalendarRepo::list_registered_events(&pool, lee).await.unwrap();
    assert_eq!(mine.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_closed_event_rejects_registration(pool: PgPool) {
    let created = CalendarRepo::create(&pool, &event(None)).await.unwrap();
    CalendarRepo::set_registration_open(&pool, created.id, false)
        .await
        .unwrap()
        .unwrap();
    let kim = seed_user(&pool, "kim").await;
    assert!(CalendarRepo::register(&pool, created.id, kim).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_series_shares_recurrence_group(pool: PgPool) {
    let dates = vec![
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 6, 8).unwrap(),
    ];
    let events = CalendarRepo::create_series(&pool, &dates, &event(None), "series-1")
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.recurrence_group.as_deref() == Some("series-1")));
    assert_eq!(events[1].date, dates[1]);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_metric_upsert_keeps_previous_value(pool: PgPool) {
    let input = |value: f64| UpsertMetric {
        metric_type: "enrollments".into(),
        time_frame: "2026-05".into(),
        entity_id: "global".into(),
        metric_value: value,
        additional_data: None,
    };
    let first = DashboardRepo::upsert(&pool, &input(100.0), "2026-05#global").await.unwrap();
    assert!(first.previous_value.is_none());

    let second = DashboardRepo::upsert(&pool, &input(120.0), "2026-05#global").await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.previous_value, Some(100.0));

    let with_trend = MetricWithTrend::from(second);
    assert_eq!(with_trend.change, Some(20.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_token_is_single_use(pool: PgPool) {
    let user_id = seed_user(&pool, "rotator").await;
    let session = |hash: &str, expires_in: Duration| CreateSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        expires_at: Utc::now() + expires_in,
        user_agent: Some("tests".into()),
        ip_address: Some("10.0.0.7".into()),
    };
    SessionRepo::create(&pool, &session("live", Duration::days(1)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session("stale", Duration::days(-1)))
        .await
        .unwrap();

    let consumed = SessionRepo::consume(&pool, "live").await.unwrap().unwrap();
    assert_eq!(consumed.user_id, user_id);
    assert!(consumed.is_revoked);
    assert_eq!(consumed.ip_address.as_deref(), Some("10.0.0.7"));
    assert!(SessionRepo::consume(&pool, "live").await.unwrap().is_none());
    assert!(SessionRepo::consume(&pool, "stale").await.unwrap().is_none());

    SessionRepo::create(&pool, &session("second", Duration::days(1)))
        .await
        .unwrap();
    let active = SessionRepo::list_active_for_user(&pool, user_id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].refresh_token_hash, "second");

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 1);
    assert!(SessionRepo::list_active_for_user(&pool, user_id)
        .await
        .unwrap()
        .is_empty());
}
