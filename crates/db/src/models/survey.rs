//! Survey instances deployed from a survey template.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tnc_core::survey::{DeployOption, DeployWhen, SnapshotQuestion};
use tnc_core::types::{DbId, Timestamp};
use validator::Validate;

/// A deployed survey.
///
/// `question_items` is a snapshot of the template's questions taken at
/// creation, so later edits to the bank do not change what respondents see.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Survey {
    pub id: DbId,
    pub survey_catalog_id: DbId,
    pub course_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub deploy_option: String,
    pub deploy_when: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub send_reminders: bool,
    pub send_notifications: bool,
    pub total_participants: i32,
    pub total_responses: i32,
    pub completion_rate: f64,
    pub question_items: Json<Vec<SnapshotQuestion>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSurvey {
    pub survey_catalog_id: DbId,
    pub course_id: Option<DbId>,
    /// Defaults to the template title.
    pub title: Option<String>,
    pub description: Option<String>,
    pub deploy_option: Option<DeployOption>,
    pub deploy_when: Option<DeployWhen>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub send_reminders: Option<bool>,
    pub send_notifications: Option<bool>,
    #[validate(range(min = 0))]
    pub total_participants: Option<i32>,
}

/// Insert values after the handler resolved defaults and the snapshot.
pub struct NewSurvey {
    pub survey_catalog_id: DbId,
    pub course_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: &'static str,
    pub deploy_option: &'static str,
    pub deploy_when: Option<&'static str>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub send_reminders: bool,
    pub send_notifications: bool,
    pub total_participants: i32,
    pub question_items: Vec<SnapshotQuestion>,
}

/// Status is changed only through `PUT /surveys/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSurvey {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub deploy_when: Option<DeployWhen>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub send_reminders: Option<bool>,
    pub send_notifications: Option<bool>,
    #[validate(range(min = 0))]
    pub total_participants: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetSurveyStatus {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyFilter {
    pub survey_catalog_id: Option<DbId>,
    pub course_id: Option<DbId>,
    pub status: Option<String>,
    /// Surveys starting at or after this instant.
    pub from: Option<Timestamp>,
    /// Surveys ending at or before this instant.
    pub to: Option<Timestamp>,
}
