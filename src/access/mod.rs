//! Access control engine
//!
//! Role permission matrix, organization hierarchy scoping, per-record
//! ownership refinement, audit recording and the request gate built on them.

pub mod audit;
pub mod gate;
pub mod hierarchy;
pub mod matrix;
pub mod scope;

pub use audit::{AuditEntry, AuditRecorder, RecordingFailed};
pub use gate::{Gate, Operation};
pub use hierarchy::OrgHierarchyResolver;
pub use matrix::{MatrixError, PermissionMatrix, PermissionRule};
pub use scope::{AccessScope, ScopedRecord, VisibilityFilter};

use thiserror::Error;

/// Why a request or record was refused.
///
/// Callers only ever see a generic "forbidden"; the variant is for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// The role has no matrix entry for the requested action
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// The record lives outside the actor's visible organizations
    #[error("forbidden: organization")]
    Organization,

    /// A viewer touched a record it does not own
    #[error("forbidden: ownership")]
    Ownership,
}

impl AccessDenied {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AccessDenied::InsufficientPermissions => "permission",
            AccessDenied::Organization => "organization",
            AccessDenied::Ownership => "ownership",
        }
    }
}
