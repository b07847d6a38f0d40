//! Row models and request DTOs.
//!
//! Each submodule holds a `FromRow` + `Serialize` row struct, a validated
//! `Deserialize` create DTO, an all-`Option` update DTO and, for listable
//! entities, a `Deserialize` filter struct read from the query string.

pub mod calendar;
pub mod catalog;
pub mod course;
pub mod course_quiz;
pub mod customer;
pub mod dashboard;
pub mod instructor;
pub mod question_bank;
pub mod quiz_attempt;
pub mod quiz_catalog;
pub mod role;
pub mod session;
pub mod survey;
pub mod survey_catalog;
pub mod survey_question;
pub mod survey_response;
pub mod user;
