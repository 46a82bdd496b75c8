//! Role, resource and action vocabulary shared by the access engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role
///
/// Variants are declared in ascending privilege so the derived `Ord`
/// is the role hierarchy: `Viewer < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Viewer,
    Admin,
    Owner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Admin, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Viewer => "VIEWER",
        }
    }

    /// Whether this role carries at least the privileges of `other`.
    pub fn includes(self, other: Role) -> bool {
        self >= other
    }

    /// This role and every role beneath it, most privileged first.
    pub fn implied_roles(self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.includes(*r)).collect()
    }
}

/// Resource kind guarded by the permission matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Task,
    User,
    Organization,
    AuditLog,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Task,
        ResourceKind::User,
        ResourceKind::Organization,
        ResourceKind::AuditLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Task => "TASK",
            ResourceKind::User => "USER",
            ResourceKind::Organization => "ORGANIZATION",
            ResourceKind::AuditLog => "AUDIT_LOG",
        }
    }
}

/// Action on a resource
///
/// `Manage` is its own matrix entry; holding it does not grant the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Manage => "MANAGE",
        }
    }
}

macro_rules! impl_text_enum {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("unknown {}: {}", stringify!($ty), s))
            }
        }

        // Used by `#[sqlx(try_from = "String")]` on row structs
        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

impl_text_enum!(Role);
impl_text_enum!(ResourceKind);
impl_text_enum!(Action);
