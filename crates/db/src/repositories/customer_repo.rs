//! Repository for the `customers` table.

use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::customer::{CreateCustomer, Customer, CustomerFilter, UpdateCustomer};

const COLUMNS: &str = "id, customer_name, email, phone, address, organization_name, \
                       organization_size, industry, notes, created_at, updated_at";

pub struct CustomerRepo;

impl CustomerRepo {
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (customer_name, email, phone, address, organization_name,
                                    organization_size, industry, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(input.customer_name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.organization_name)
            .bind(input.organization_size)
            .bind(&input.industry)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of customers, newest first. Fetches `limit + 1` rows.
    pub async fn list(
        pool: &PgPool,
        params: &CustomerFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .text_search(
                &["customer_name", "organization_name", "email"],
                params.text.as_deref(),
            )
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM customers {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, Customer>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                customer_name = COALESCE($2, customer_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                organization_name = COALESCE($6, organization_name),
                organization_size = COALESCE($7, organization_size),
                industry = COALESCE($8, industry),
                notes = COALESCE($9, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(&input.customer_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.organization_name)
            .bind(input.organization_size)
            .bind(&input.industry)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Number of courses booked by the customer.
    pub async fn count_courses(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE customer_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
