//! 用户管理服务

use crate::{
    access::{AccessScope, AuditEntry, AuditRecorder},
    auth::password::PasswordHasher,
    config::SecurityConfig,
    error::{AppError, Result},
    models::{
        actor::Actor,
        role::{Action, ResourceKind},
        user::{CreateUserRequest, User},
    },
    repository::{OrganizationStore, UserStore},
};
use std::sync::Arc;
use validator::Validate;

pub struct UserService {
    users: Arc<dyn UserStore>,
    organizations: Arc<dyn OrganizationStore>,
    scope: AccessScope,
    recorder: AuditRecorder,
    hasher: Arc<PasswordHasher>,
    policy: SecurityConfig,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        organizations: Arc<dyn OrganizationStore>,
        scope: AccessScope,
        recorder: AuditRecorder,
        hasher: Arc<PasswordHasher>,
        policy: SecurityConfig,
    ) -> Self {
        Self {
            users,
            organizations,
            scope,
            recorder,
            hasher,
            policy,
        }
    }

    /// 列出调用者可见的用户
    pub async fn list(&self, actor: &Actor) -> Result<Vec<User>> {
        self.scope.authorize(actor, ResourceKind::User, Action::Read)?;

        let filter = self.scope.visibility_filter(actor).await?;
        self.users.list(&filter).await
    }

    /// 在本组织或直属子组织内创建用户（默认为调用者所在组织）
    /// 授予的角色不能高于调用者自身角色
    pub async fn create(
        &self,
        actor: &Actor,
        req: CreateUserRequest,
        origin: Option<String>,
    ) -> Result<User> {
        self.scope.authorize(actor, ResourceKind::User, Action::Create)?;
        req.validate()?;

        self.scope.check_role_grant(actor, ResourceKind::User, req.role)?;

        // 只能在本组织或直属子组织中创建用户，上级组织不可
        let organization_id = req.organization_id.unwrap_or(actor.organization_id);
        self.scope
            .check_managed_organization(actor, ResourceKind::User, organization_id)
            .await?;

        let organization = self
            .organizations
            .get_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::not_found("Organization"))?;

        PasswordHasher::validate_password_policy(&req.password, &self.policy)?;
        let password_hash = self.hasher.hash(&req.password)?;

        let user = User::new(&req.email, req.username, password_hash, req.role, &organization);
        self.users.insert(&user).await?;

        tracing::info!(
            user_id = %user.id,
            role = %user.role,
            organization_id = %user.organization_id,
            "User created"
        );

        // 审计失败已由记录器上报，不影响业务结果
        let _ = self
            .recorder
            .record(
                AuditEntry::new(
                    actor,
                    Action::Create,
                    ResourceKind::User,
                    user.id,
                    format!("Created user {} with role {}", user.email, user.role),
                )
                .with_origin(origin),
            )
            .await;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::{AccessDenied, PermissionMatrix},
        models::{organization::Organization, role::Role},
        repository::MemoryStore,
    };
    use argon2::Params;
    use secrecy::Secret;
    use uuid::Uuid;

    fn policy() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: Secret::new("x".repeat(32)),
            access_token_exp_secs: 900,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            trust_proxy: false,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, UserService, Organization, Organization) {
        let store = Arc::new(MemoryStore::new());
        let org = Organization::new("Acme", None);
        let other = Organization::new("Globex", None);
        OrganizationStore::insert(store.as_ref(), &org).await.unwrap();
        OrganizationStore::insert(store.as_ref(), &other).await.unwrap();

        let scope = AccessScope::new(Arc::new(PermissionMatrix::standard().unwrap()), store.clone());
        let hasher = Arc::new(PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap()));
        let service = UserService::new(
            store.clone(),
            store.clone(),
            scope,
            AuditRecorder::new(store.clone()),
            hasher,
            policy(),
        );

        (store, service, org, other)
    }

    fn request(email: &str, organization_id: Option<Uuid>) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: "member".to_string(),
            password: "Password123".to_string(),
            role: Role::Viewer,
            organization_id,
        }
    }

    #[tokio::test]
    async fn test_owner_creates_user_in_own_organization() {
        let (store, service, org, _) = setup().await;
        let owner = Actor::new(Uuid::new_v4(), Role::Owner, org.id);

        let user = service
            .create(&owner, request("Member@Example.com", None), None)
            .await
            .unwrap();
        assert_eq!(user.organization_id, org.id);
        assert_eq!(user.email, "member@example.com");
        assert_ne!(user.password_hash, "Password123");

        let events = store.audit_events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource_kind, ResourceKind::User);
    }

    #[tokio::test]
    async fn test_owner_cannot_create_user_outside_scope() {
        let (store, service, org, other) = setup().await;
        let owner = Actor::new(Uuid::new_v4(), Role::Owner, org.id);

        let err = service
            .create(&owner, request("x@example.com", Some(other.id)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(AccessDenied::Organization)));
        assert!(store.audit_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_child_owner_cannot_provision_into_parent() {
        let (store, service, parent, _) = setup().await;
        let team = Organization::new("Team", Some(parent.id));
        let sibling = Organization::new("Sibling", Some(parent.id));
        OrganizationStore::insert(store.as_ref(), &team).await.unwrap();
        OrganizationStore::insert(store.as_ref(), &sibling).await.unwrap();
        let owner = Actor::new(Uuid::new_v4(), Role::Owner, team.id).with_parent(parent.id);

        let mut req = request("climber@example.com", Some(parent.id));
        req.role = Role::Owner;
        let err = service.create(&owner, req, None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(AccessDenied::Organization)));

        let err = service
            .create(&owner, request("side@example.com", Some(sibling.id)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(AccessDenied::Organization)));

        assert!(UserStore::find_by_email(store.as_ref(), "climber@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(store.audit_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_owner_provisions_into_direct_child() {
        let (store, service, org, _) = setup().await;
        let team = Organization::new("Team", Some(org.id));
        OrganizationStore::insert(store.as_ref(), &team).await.unwrap();
        let owner = Actor::new(Uuid::new_v4(), Role::Owner, org.id);

        let user = service
            .create(&owner, request("lead@example.com", Some(team.id)), None)
            .await
            .unwrap();
        assert_eq!(user.organization_id, team.id);
        assert_eq!(user.parent_organization_id, Some(org.id));
    }

    #[tokio::test]
    async fn test_owner_may_grant_owner_in_own_organization() {
        let (_, service, org, _) = setup().await;
        let owner = Actor::new(Uuid::new_v4(), Role::Owner, org.id);

        let mut req = request("peer@example.com", None);
        req.role = Role::Owner;
        let user = service.create(&owner, req, None).await.unwrap();
        assert_eq!(user.role, Role::Owner);
        assert_eq!(user.organization_id, org.id);
    }

    #[tokio::test]
    async fn test_admin_cannot_create_users() {
        let (_, service, org, _) = setup().await;
        let admin = Actor::new(Uuid::new_v4(), Role::Admin, org.id);

        let err = service
            .create(&admin, request("x@example.com", None), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Forbidden(AccessDenied::InsufficientPermissions)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (_, service, org, _) = setup().await;
        let owner = Actor::new(Uuid::new_v4(), Role::Owner, org.id);

        service.create(&owner, request("dup@example.com", None), None).await.unwrap();
        let err = service
            .create(&owner, request("DUP@example.com", None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
