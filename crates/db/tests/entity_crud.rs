//! Repository round trips against a migrated database: inserts, filtered
//! lists, cursor pages, constraint violations and cascades.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;
use tnc_core::pagination::Page;
use tnc_db::models::catalog::{CatalogFilter, CreateCatalogModule, CreateCourseCatalog};
use tnc_db::models::course::{CourseFilter, CreateCourse, UpdateCourse};
use tnc_db::models::customer::{CreateCustomer, CustomerFilter, UpdateCustomer};
use tnc_db::models::instructor::{CreateInstructor, InstructorFilter};
use tnc_db::repositories::{
    CatalogModuleRepo, CatalogRepo, CourseRepo, CustomerRepo, InstructorRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_customer(name: &str) -> CreateCustomer {
    CreateCustomer {
        customer_name: name.to_string(),
        email: None,
        phone: None,
        address: None,
        organization_name: None,
        organization_size: None,
        industry: None,
        notes: None,
    }
}

fn new_catalog(title: &str, aws_code: Option<&str>) -> CreateCourseCatalog {
    CreateCourseCatalog {
        title: title.to_string(),
        aws_code: aws_code.map(str::to_string),
        version: None,
        durations: Some(8),
        level: Some("Fundamental".into()),
        description: None,
        category: Some("Cloud".into()),
        tags: vec![],
        prerequisites: vec![],
        objectives: vec![],
        status: None,
    }
}

fn new_course(catalog_id: i64, customer_id: i64) -> CreateCourse {
    CreateCourse {
        catalog_id,
        customer_id,
        instructor_id: None,
        title: "Cloud Practitioner Essentials".into(),
        description: None,
        start_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
        end_date: Some(NaiveDate::from_ymd_opt(2026, 5, 5).unwrap()),
        location: Some("Seoul".into()),
        status: None,
        max_seats: Some(20),
        current_seats: None,
    }
}

fn is_constraint(err: &sqlx::Error, name: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(name))
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_customer_crud(pool: PgPool) {
    let created = CustomerRepo::create(&pool, &new_customer("  Acme Corp "))
        .await
        .unwrap();
    assert_eq!(created.customer_name, "Acme Corp");

    let update = UpdateCustomer {
        industry: Some("Retail".into()),
        ..Default::default()
    };
    let updated = CustomerRepo::update(&pool, created.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.industry.as_deref(), Some("Retail"));
    assert_eq!(updated.customer_name, "Acme Corp");

    assert!(CustomerRepo::delete(&pool, created.id).await.unwrap());
    assert!(CustomerRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
    assert!(!CustomerRepo::delete(&pool, created.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_customer_text_filter_is_case_insensitive(pool: PgPool) {
    let mut acme = new_customer("Acme");
    acme.organization_name = Some("ACME Holdings".into());
    CustomerRepo::create(&pool, &acme).await.unwrap();
    CustomerRepo::create(&pool, &new_customer("Globex")).await.unwrap();

    let filter = CustomerFilter {
        text: Some("holdings".into()),
    };
    let rows = CustomerRepo::list(&pool, &filter, None, 50).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_name, "Acme");

    // LIKE wildcards in user text are matched literally.
    let filter = CustomerFilter {
        text: Some("%".into()),
    };
    assert!(CustomerRepo::list(&pool, &filter, None, 50).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cursor_pages_cover_every_row_once(pool: PgPool) {
    for i in 0..5 {
        CustomerRepo::create(&pool, &new_customer(&format!("Customer {i}")))
            .await
            .unwrap();
    }
    let filter = CustomerFilter::default();

    let rows = CustomerRepo::list(&pool, &filter, None, 2).await.unwrap();
    let first = Page::from_rows(rows, 2, |c| c.id);
    assert_eq!(first.items.len(), 2);
    let token = first.next_token.clone().unwrap();

    let cursor = tnc_core::pagination::decode_cursor(Some(&token)).unwrap();
    let rows = CustomerRepo::list(&pool, &filter, cursor, 2).await.unwrap();
    let second = Page::from_rows(rows, 2, |c| c.id);
    assert_eq!(second.items.len(), 2);
    assert!(second.items[0].id < first.items[1].id);

    let cursor = tnc_core::pagination::decode_cursor(second.next_token.as_deref()).unwrap();
    let rows = CustomerRepo::list(&pool, &filter, cursor, 2).await.unwrap();
    let third = Page::from_rows(rows, 2, |c| c.id);
    assert_eq!(third.items.len(), 1);
    assert!(third.next_token.is_none());
}

// ---------------------------------------------------------------------------
// Instructors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_instructor_defaults_and_specialty_filter(pool: PgPool) {
    let input = CreateInstructor {
        name: "Park".into(),
        email: "park@example.com".into(),
        phone: None,
        profile: None,
        specialties: vec!["Security".into(), "Networking".into()],
        status: None,
        user_id: None,
    };
    let created = InstructorRepo::create(&pool, &input).await.unwrap();
    assert_eq!(created.status, "ACTIVE");

    let err = InstructorRepo::create(&pool, &input).await.unwrap_err();
    assert!(is_constraint(&err, "uq_instructors_email"));

    let filter = InstructorFilter {
        specialty: Some("Security".into()),
        ..Default::default()
    };
    assert_eq!(InstructorRepo::list(&pool, &filter, None, 10).await.unwrap().len(), 1);

    let inactive = InstructorRepo::set_status(&pool, created.id, "INACTIVE")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(inactive.status, "INACTIVE");
}

// ---------------------------------------------------------------------------
// Catalogs and courses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_catalog_version_defaults_and_code_version_is_unique(pool: PgPool) {
    let input = new_catalog("Architecting on AWS", Some("AWS-ARC"));
    let created = CatalogRepo::create(&pool, &input, &["aws".to_string()], None)
        .await
        .unwrap();
    assert_eq!(created.version, "1.0");
    assert_eq!(created.status, "draft");

    let err = CatalogRepo::create(&pool, &input, &[], None).await.unwrap_err();
    assert!(is_constraint(&err, "uq_course_catalogs_aws_code_version"));

    let mut next = new_catalog("Architecting on AWS", Some("AWS-ARC"));
    next.version = Some("2.0".into());
    CatalogRepo::create(&pool, &next, &[], None).await.unwrap();

    let filter = CatalogFilter {
        tag: Some("aws".into()),
        ..Default::default()
    };
    let rows = CatalogRepo::list(&pool, &filter, None, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, created.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_modules_are_unique_per_catalog_and_cascade(pool: PgPool) {
    let catalog = CatalogRepo::create(&pool, &new_catalog("Developing on AWS", None), &[], None)
        .await
        .unwrap();
    let module = CreateCatalogModule {
        module_number: 1,
        title: "Intro".into(),
        description: None,
        duration: Some(60),
        sort_order: None,
        is_published: None,
    };
    let created = CatalogModuleRepo::create(&pool, catalog.id, &module).await.unwrap();
    assert_eq!(created.sort_order, 1);

    let err = CatalogModuleRepo::create(&pool, catalog.id, &module).await.unwrap_err();
    assert!(is_constraint(&err, "uq_catalog_modules_catalog_number"));

    assert!(CatalogRepo::delete(&pool, catalog.id).await.unwrap());
    assert!(CatalogModuleRepo::list_for_catalog(&pool, catalog.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_references_and_checks(pool: PgPool) {
    let customer = CustomerRepo::create(&pool, &new_customer("Initech")).await.unwrap();
    let catalog = CatalogRepo::create(&pool, &new_catalog("Security Essentials", None), &[], None)
        .await
        .unwrap();

    let course = CourseRepo::create(&pool, &new_course(catalog.id, customer.id), "ABC234")
        .await
        .unwrap();
    assert_eq!(course.status, "scheduled");
    assert_eq!(course.current_seats, 0);
    assert!(!course.is_added_to_calendar);

    let found = CourseRepo::find_by_share_code(&pool, "ABC234").await.unwrap().unwrap();
    assert_eq!(found.id, course.id);

    let err = CourseRepo::create(&pool, &new_course(catalog.id, customer.id), "ABC234")
        .await
        .unwrap_err();
    assert!(is_constraint(&err, "uq_courses_share_code"));

    let err = CourseRepo::create(&pool, &new_course(catalog.id, 999_999), "XYZ789")
        .await
        .unwrap_err();
    assert!(is_constraint(&err, "fk_courses_customer_id"));

    let overbooked = UpdateCourse {
        current_seats: Some(21),
        ..Default::default()
    };
    let err = CourseRepo::update(&pool, course.id, &overbooked).await.unwrap_err();
    assert!(is_constraint(&err, "ck_courses_seats"));

    assert_eq!(CustomerRepo::count_courses(&pool, customer.id).await.unwrap(), 1);
    assert_matches!(
        CustomerRepo::delete(&pool, customer.id).await,
        Err(sqlx::Error::Database(_))
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_date_range_filter(pool: PgPool) {
    let customer = CustomerRepo::create(&pool, &new_customer("Umbrella")).await.unwrap();
    let catalog = CatalogRepo::create(&pool, &new_catalog("Data Analytics", None), &[], None)
        .await
        .unwrap();
    let mut early = new_course(catalog.id, customer.id);
    early.start_date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
    early.end_date = None;
    CourseRepo::create(&pool, &early, "EARLY2").await.unwrap();
    CourseRepo::create(&pool, &new_course(catalog.id, customer.id), "LATER3")
        .await
        .unwrap();

    let filter = CourseFilter {
        from: NaiveDate::from_ymd_opt(2026, 3, 1),
        ..Default::default()
    };
    let rows = CourseRepo::list(&pool, &filter, None, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].share_code, "LATER3");
}
