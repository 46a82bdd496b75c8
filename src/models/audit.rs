//! Audit domain models

use super::role::{Action, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor_id: Uuid,
    /// Organization of the actor at the time of the action
    pub organization_id: Uuid,
    #[sqlx(try_from = "String")]
    pub action: Action,
    #[sqlx(try_from = "String")]
    pub resource_kind: ResourceKind,
    pub resource_id: Uuid,
    pub detail: String,
    pub origin: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Audit log query parameters
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

fn default_limit() -> i64 {
    100
}
