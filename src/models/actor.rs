//! Authenticated caller identity

use super::role::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated identity the access engine decides for.
///
/// Produced by the identity provider from a validated token and trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub organization_id: Uuid,
    pub parent_organization_id: Option<Uuid>,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role, organization_id: Uuid) -> Self {
        Self {
            user_id,
            role,
            organization_id,
            parent_organization_id: None,
        }
    }

    pub fn with_parent(mut self, parent_organization_id: Uuid) -> Self {
        self.parent_organization_id = Some(parent_organization_id);
        self
    }
}
