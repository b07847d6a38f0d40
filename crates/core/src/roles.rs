//! Staff roles.
//!
//! Names and ids must match the seed rows in
//! `20260301000001_create_auth_tables.sql`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Instructor, Role::Viewer];

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Viewer => "viewer",
        }
    }

    /// Id of the seeded `roles` row.
    pub const fn seeded_id(self) -> DbId {
        match self {
            Role::Admin => 1,
            Role::Instructor => 2,
            Role::Viewer => 3,
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }

    pub fn from_seeded_id(id: DbId) -> Option<Role> {
        Self::ALL.into_iter().find(|r| r.seeded_id() == id)
    }

    /// Instructors and admins create and modify training content.
    pub fn can_manage_content(self) -> bool {
        matches!(self, Role::Admin | Role::Instructor)
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructors_and_admins_manage_content() {
        assert!(Role::Admin.can_manage_content());
        assert!(Role::Instructor.can_manage_content());
        assert!(!Role::Viewer.can_manage_content());
    }

    #[test]
    fn names_and_ids_resolve_both_ways() {
        for role in Role::ALL {
            assert_eq!(Role::from_name(role.as_str()), Some(role));
            assert_eq!(Role::from_seeded_id(role.seeded_id()), Some(role));
        }
        assert_eq!(Role::from_name("owner"), None);
        assert_eq!(Role::from_seeded_id(99), None);
        assert_eq!(Role::Instructor.to_string(), "instructor");
    }
}
