//! 组织管理服务

use crate::{
    access::{AccessScope, AuditEntry, AuditRecorder},
    error::{AppError, Result},
    models::{
        actor::Actor,
        organization::{CreateOrganizationRequest, Organization},
        role::{Action, ResourceKind},
    },
    repository::OrganizationStore,
};
use std::sync::Arc;
use validator::Validate;

pub struct OrganizationService {
    organizations: Arc<dyn OrganizationStore>,
    scope: AccessScope,
    recorder: AuditRecorder,
}

impl OrganizationService {
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        scope: AccessScope,
        recorder: AuditRecorder,
    ) -> Self {
        Self {
            organizations,
            scope,
            recorder,
        }
    }

    /// 列出调用者可见的组织
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Organization>> {
        self.scope.authorize(actor, ResourceKind::Organization, Action::Read)?;

        let visible: Vec<_> = self.scope.visible_organizations(actor).await?.into_iter().collect();
        self.organizations.list_by_ids(&visible).await
    }

    /// 在可见组织下创建子组织（默认父组织为调用者所在组织）
    pub async fn create(
        &self,
        actor: &Actor,
        req: CreateOrganizationRequest,
        origin: Option<String>,
    ) -> Result<Organization> {
        self.scope.authorize(actor, ResourceKind::Organization, Action::Create)?;
        req.validate()?;

        let parent_id = req.parent_id.unwrap_or(actor.organization_id);
        self.scope
            .check_organization(actor, ResourceKind::Organization, parent_id)
            .await?;

        if self.organizations.get_by_id(parent_id).await?.is_none() {
            return Err(AppError::not_found("Organization"));
        }

        let organization = Organization::new(req.name.trim(), Some(parent_id));
        self.organizations.insert(&organization).await?;

        tracing::info!(
            organization_id = %organization.id,
            parent_id = %parent_id,
            "Organization created"
        );

        let _ = self
            .recorder
            .record(
                AuditEntry::new(
                    actor,
                    Action::Create,
                    ResourceKind::Organization,
                    organization.id,
                    format!("Created organization \"{}\"", organization.name),
                )
                .with_origin(origin),
            )
            .await;

        Ok(organization)
    }
}
