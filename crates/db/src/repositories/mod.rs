//! Repository layer.
//!
//! Each repository is a zero-sized struct whose async methods take `&PgPool`
//! (or any executor, where a call must join a caller's transaction) as the
//! first argument. List methods fetch `limit + 1` rows newest first so the
//! caller can tell whether another page exists.

pub mod calendar_repo;
pub mod catalog_content_repo;
pub mod catalog_repo;
pub mod course_quiz_repo;
pub mod course_repo;
pub mod customer_repo;
pub mod dashboard_repo;
pub mod instructor_repo;
pub mod question_bank_repo;
pub mod quiz_attempt_repo;
pub mod quiz_catalog_repo;
pub mod role_repo;
pub mod session_repo;
pub mod survey_catalog_repo;
pub mod survey_question_repo;
pub mod survey_repo;
pub mod survey_response_repo;
pub mod user_repo;

pub use calendar_repo::CalendarRepo;
pub use catalog_content_repo::{CatalogLabRepo, CatalogMaterialRepo, CatalogModuleRepo};
pub use catalog_repo::CatalogRepo;
pub use course_quiz_repo::CourseQuizRepo;
pub use course_repo::CourseRepo;
pub use customer_repo::CustomerRepo;
pub use dashboard_repo::DashboardRepo;
pub use instructor_repo::InstructorRepo;
pub use question_bank_repo::QuestionBankRepo;
pub use quiz_attempt_repo::QuizAttemptRepo;
pub use quiz_catalog_repo::QuizCatalogRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use survey_catalog_repo::SurveyCatalogRepo;
pub use survey_question_repo::SurveyQuestionRepo;
pub use survey_repo::SurveyRepo;
pub use survey_response_repo::SurveyResponseRepo;
pub use user_repo::UserRepo;
