//! Customer organizations that book courses.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: DbId,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub organization_name: Option<String>,
    pub organization_size: Option<i32>,
    pub industry: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(custom(function = "not_blank"))]
    pub customer_name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub organization_name: Option<String>,
    #[validate(range(min = 0))]
    pub organization_size: Option<i32>,
    pub industry: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(length(min = 1))]
    pub customer_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub organization_name: Option<String>,
    #[validate(range(min = 0))]
    pub organization_size: Option<i32>,
    pub industry: Option<String>,
    pub notes: Option<String>,
}

/// `?text=` matches name, organization or email.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub text: Option<String>,
}
