//! Request extractors for authentication and role checks.
//!
//! - [`auth::AuthUser`] reads the Bearer access token.
//! - [`rbac::RequireAuth`] accepts any signed-in user.
//! - [`rbac::RequireInstructor`] accepts instructors and admins.
//! - [`rbac::RequireAdmin`] accepts admins only.

pub mod auth;
pub mod rbac;
