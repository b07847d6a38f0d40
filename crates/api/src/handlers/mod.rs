//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers validate input, delegate to the repositories in `tnc_db`, and
//! map errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod auth;
pub mod calendar;
pub mod catalog_content;
pub mod catalogs;
pub mod course_quizzes;
pub mod courses;
pub mod customers;
pub mod dashboard;
pub mod instructors;
pub mod question_bank;
pub mod quiz_catalogs;
pub mod survey_catalogs;
pub mod survey_questions;
pub mod surveys;
pub mod take;
