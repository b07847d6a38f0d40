//! Stored dashboard metrics and the live summary.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tnc_core::dashboard::{percent_change, trend, Trend};
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardMetric {
    pub id: DbId,
    pub metric_type: String,
    /// `timeFrame#entityId`.
    pub metric_key: String,
    pub time_frame: String,
    pub entity_id: String,
    pub metric_value: f64,
    pub previous_value: Option<f64>,
    pub additional_data: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A metric with its change against the previous value.
#[derive(Debug, Clone, Serialize)]
pub struct MetricWithTrend {
    #[serde(flatten)]
    pub metric: DashboardMetric,
    pub change: Option<f64>,
    pub trend: Trend,
}

impl From<DashboardMetric> for MetricWithTrend {
    fn from(metric: DashboardMetric) -> Self {
        let change = percent_change(metric.metric_value, metric.previous_value);
        Self {
            metric,
            change,
            trend: trend(change),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertMetric {
    #[validate(custom(function = "not_blank"))]
    pub metric_type: String,
    #[validate(custom(function = "not_blank"))]
    pub time_frame: String,
    #[validate(custom(function = "not_blank"))]
    pub entity_id: String,
    pub metric_value: f64,
    pub additional_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricFilter {
    pub entity_id: Option<String>,
    pub metric_type: Option<String>,
    pub time_frame: Option<String>,
}

/// Course count for one status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Live figures computed on request for `GET /dashboard/summary`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub courses_by_status: Vec<StatusCount>,
    pub active_catalogs: i64,
    pub customers: i64,
    pub instructors: i64,
    pub upcoming_events: i64,
    pub quiz_attempts_30d: i64,
    pub quiz_pass_rate_30d: f64,
    pub survey_responses: i64,
}
