//! Repository for `dashboard_metrics` and the live summary counts.

use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::dashboard::{DashboardMetric, MetricFilter, StatusCount, UpsertMetric};

const COLUMNS: &str = "id, metric_type, metric_key, time_frame, entity_id, metric_value, \
                       previous_value, additional_data, created_at, updated_at";

pub struct DashboardRepo;

impl DashboardRepo {
    /// Insert or replace a metric. On replace the stored value moves to
    /// `previous_value`.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertMetric,
        metric_key: &str,
    ) -> Result<DashboardMetric, sqlx::Error> {
        let query = format!(
            "INSERT INTO dashboard_metrics (metric_type, metric_key, time_frame, entity_id,
                                            metric_value, additional_data)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_dashboard_metrics_type_key DO UPDATE SET
                previous_value = dashboard_metrics.metric_value,
                metric_value = EXCLUDED.metric_value,
                additional_data = COALESCE(EXCLUDED.additional_data, dashboard_metrics.additional_data)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DashboardMetric>(&query)
            .bind(input.metric_type.trim())
            .bind(metric_key)
            .bind(input.time_frame.trim())
            .bind(input.entity_id.trim())
            .bind(input.metric_value)
            .bind(&input.additional_data)
            .fetch_one(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &MetricFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<DashboardMetric>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("entity_id", params.entity_id.as_deref())
            .eq("metric_type", params.metric_type.as_deref())
            .eq("time_frame", params.time_frame.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM dashboard_metrics {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, DashboardMetric>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn courses_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM courses GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    /// `(active catalogs, customers, active instructors)`.
    pub async fn entity_counts(pool: &PgPool) -> Result<(i64, i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT
                (SELECT COUNT(*) FROM course_catalogs WHERE status = 'active'),
                (SELECT COUNT(*) FROM customers),
                (SELECT COUNT(*) FROM instructors WHERE status = 'ACTIVE')",
        )
        .fetch_one(pool)
        .await
    }
}
