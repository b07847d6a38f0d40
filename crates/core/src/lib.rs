//! Domain logic for the training-management backend.
//!
//! This crate has no I/O: it holds the shared error type, identifier
//! aliases, pagination and composite-key helpers, and the pure rules behind
//! courses, catalogs, quizzes, surveys, the calendar and dashboard metrics.

pub mod calendar;
pub mod catalog;
pub mod course;
pub mod dashboard;
pub mod error;
pub mod keys;
pub mod pagination;
pub mod question_bank;
pub mod quiz;
pub mod quiz_generation;
pub mod roles;
pub mod search;
pub mod storage;
pub mod survey;
pub mod types;
pub mod validation;
