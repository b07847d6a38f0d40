//! Repository for the `instructors` table.

use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::instructor::{
    CreateInstructor, Instructor, InstructorFilter, UpdateInstructor, INSTRUCTOR_ACTIVE,
};

const COLUMNS: &str =
    "id, name, email, phone, profile, specialties, status, user_id, created_at, updated_at";

pub struct InstructorRepo;

impl InstructorRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateInstructor,
    ) -> Result<Instructor, sqlx::Error> {
        let query = format!(
            "INSERT INTO instructors (name, email, phone, profile, specialties, status, user_id)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, '{INSTRUCTOR_ACTIVE}'), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Instructor>(&query)
            .bind(input.name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.profile)
            .bind(&input.specialties)
            .bind(&input.status)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Instructor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instructors WHERE id = $1");
        sqlx::query_as::<_, Instructor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &InstructorFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Instructor>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("status", params.status.as_deref())
            .array_contains("specialties", params.specialty.as_deref())
            .text_search(&["name", "email", "profile"], params.text.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM instructors {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, Instructor>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInstructor,
    ) -> Result<Option<Instructor>, sqlx::Error> {
        let query = format!(
            "UPDATE instructors SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                profile = COALESCE($5, profile),
                specialties = COALESCE($6, specialties),
                status = COALESCE($7, status),
                user_id = COALESCE($8, user_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Instructor>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.profile)
            .bind(&input.specialties)
            .bind(&input.status)
            .bind(input.user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Instructor>, sqlx::Error> {
        let query = format!("UPDATE instructors SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Instructor>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM instructors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
