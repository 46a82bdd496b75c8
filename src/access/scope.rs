//! Combined access decisions: request authorization, visibility filtering
//! and record-level checks

use super::{hierarchy::OrgHierarchyResolver, matrix::PermissionMatrix, AccessDenied};
use crate::{
    error::AppError,
    models::{
        actor::Actor,
        audit::AuditEvent,
        role::{Action, ResourceKind, Role},
        task::Task,
        user::User,
    },
    repository::OrganizationStore,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// A record that belongs to an organization and has an owning user.
pub trait ScopedRecord {
    fn organization_id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
}

impl ScopedRecord for Task {
    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// A user owns its own record.
impl ScopedRecord for User {
    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn owner_id(&self) -> Uuid {
        self.id
    }
}

/// An audit event is owned by the actor that produced it.
impl ScopedRecord for AuditEvent {
    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn owner_id(&self) -> Uuid {
        self.actor_id
    }
}

/// Which records an actor may see.
///
/// Both conjuncts apply: the record's organization is in `organization_ids`,
/// and when `owner_id` is set the record is owned by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub organization_ids: BTreeSet<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl VisibilityFilter {
    /// Organization check first, then ownership.
    pub fn check<R: ScopedRecord + ?Sized>(&self, record: &R) -> Result<(), AccessDenied> {
        if !self.organization_ids.contains(&record.organization_id()) {
            return Err(AccessDenied::Organization);
        }

        match self.owner_id {
            Some(owner) if record.owner_id() != owner => Err(AccessDenied::Ownership),
            _ => Ok(()),
        }
    }

    pub fn matches<R: ScopedRecord + ?Sized>(&self, record: &R) -> bool {
        self.check(record).is_ok()
    }

    /// Organization ids as a bindable list (`= ANY($1)`).
    pub fn organization_id_list(&self) -> Vec<Uuid> {
        self.organization_ids.iter().copied().collect()
    }
}

/// Decision surface shared by every request.
///
/// Cheap to clone: holds the shared matrix and the hierarchy resolver.
#[derive(Clone)]
pub struct AccessScope {
    matrix: Arc<PermissionMatrix>,
    resolver: OrgHierarchyResolver,
}

impl AccessScope {
    pub fn new(matrix: Arc<PermissionMatrix>, organizations: Arc<dyn OrganizationStore>) -> Self {
        Self {
            matrix,
            resolver: OrgHierarchyResolver::new(organizations),
        }
    }

    /// Role-only gate. Hierarchy and ownership are not consulted here.
    pub fn authorize(
        &self,
        actor: &Actor,
        resource: ResourceKind,
        action: Action,
    ) -> Result<(), AccessDenied> {
        authorize_with(&self.matrix, actor, resource, action)
    }

    /// Organizations whose records the actor may see.
    pub async fn visible_organizations(&self, actor: &Actor) -> Result<BTreeSet<Uuid>, AppError> {
        self.resolver.visible_organizations(actor.organization_id).await
    }

    /// Query predicate for list reads.
    pub async fn visibility_filter(&self, actor: &Actor) -> Result<VisibilityFilter, AppError> {
        let organization_ids = self.visible_organizations(actor).await?;
        let owner_id = ownership_required(actor.role).then_some(actor.user_id);

        Ok(VisibilityFilter {
            organization_ids,
            owner_id,
        })
    }

    /// The actor may place new records of `resource` inside `organization_id`.
    pub async fn check_organization(
        &self,
        actor: &Actor,
        resource: ResourceKind,
        organization_id: Uuid,
    ) -> Result<(), AppError> {
        if self.visible_organizations(actor).await?.contains(&organization_id) {
            return Ok(());
        }

        let denied = AccessDenied::Organization;
        record_denial(actor, resource, Some(Action::Create), denied);
        Err(AppError::Forbidden(denied))
    }

    /// The actor may provision members inside `organization_id`: its own
    /// organization or one of its direct children, never its parent.
    pub async fn check_managed_organization(
        &self,
        actor: &Actor,
        resource: ResourceKind,
        organization_id: Uuid,
    ) -> Result<(), AppError> {
        let managed = Some(organization_id) != actor.parent_organization_id
            && self
                .resolver
                .managed_organizations(actor.organization_id)
                .await?
                .contains(&organization_id);
        if managed {
            return Ok(());
        }

        let denied = AccessDenied::Organization;
        record_denial(actor, resource, Some(Action::Create), denied);
        Err(AppError::Forbidden(denied))
    }

    /// The actor may only hand out roles it holds itself.
    pub fn check_role_grant(
        &self,
        actor: &Actor,
        resource: ResourceKind,
        granted: Role,
    ) -> Result<(), AccessDenied> {
        if actor.role.includes(granted) {
            return Ok(());
        }

        let denied = AccessDenied::InsufficientPermissions;
        record_denial(actor, resource, Some(Action::Create), denied);
        Err(denied)
    }

    /// Check a loaded record against both visibility conjuncts.
    pub async fn check_record<R: ScopedRecord + ?Sized>(
        &self,
        actor: &Actor,
        resource: ResourceKind,
        record: &R,
    ) -> Result<(), AppError> {
        let filter = self.visibility_filter(actor).await?;

        filter.check(record).map_err(|denied| {
            record_denial(actor, resource, None, denied);
            AppError::Forbidden(denied)
        })
    }
}

/// Matrix check shared by [`AccessScope`] and the request gate.
pub(crate) fn authorize_with(
    matrix: &PermissionMatrix,
    actor: &Actor,
    resource: ResourceKind,
    action: Action,
) -> Result<(), AccessDenied> {
    if matrix.allows(actor.role, resource, action) {
        return Ok(());
    }

    let denied = AccessDenied::InsufficientPermissions;
    record_denial(actor, resource, Some(action), denied);
    Err(denied)
}

/// Roles below ADMIN only see records they own.
fn ownership_required(role: Role) -> bool {
    !role.includes(Role::Admin)
}

fn record_denial(actor: &Actor, resource: ResourceKind, action: Option<Action>, denied: AccessDenied) {
    tracing::warn!(
        user_id = %actor.user_id,
        role = %actor.role,
        organization_id = %actor.organization_id,
        resource = %resource,
        action = action.map(|a| a.as_str()).unwrap_or("-"),
        reason = %denied,
        "Access denied"
    );
    metrics::counter!("access_denied_total", "reason" => denied.reason()).increment(1);
}
