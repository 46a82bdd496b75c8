//! 认证服务：注册与登录

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::SecurityConfig,
    error::{AppError, Result},
    models::{
        organization::Organization,
        role::Role,
        user::{AuthResponse, LoginRequest, RegisterRequest, User, UserResponse},
    },
    repository::{OrganizationStore, UserStore},
};
use std::sync::Arc;
use validator::Validate;

pub struct AuthService {
    users: Arc<dyn UserStore>,
    organizations: Arc<dyn OrganizationStore>,
    jwt_service: Arc<JwtService>,
    hasher: Arc<PasswordHasher>,
    policy: SecurityConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        organizations: Arc<dyn OrganizationStore>,
        jwt_service: Arc<JwtService>,
        hasher: Arc<PasswordHasher>,
        policy: SecurityConfig,
    ) -> Self {
        Self {
            users,
            organizations,
            jwt_service,
            hasher,
            policy,
        }
    }

    /// 注册：创建新的根组织及其 OWNER 用户
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.policy)?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        let password_hash = self.hasher.hash(&req.password)?;

        let organization_name = match req.organization_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}'s Organization", req.username),
        };
        let organization = Organization::new(organization_name, None);
        self.organizations.insert(&organization).await?;

        let user = User::new(&req.email, req.username, password_hash, Role::Owner, &organization);
        self.users.insert(&user).await?;

        tracing::info!(
            user_id = %user.id,
            organization_id = %organization.id,
            "User registered"
        );

        self.issue(user)
    }

    /// 邮箱 + 密码登录
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        req.validate()?;

        // 未知邮箱与错误密码返回相同错误
        let user = self
            .users
            .find_by_email(&req.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.hasher.verify(&req.password, &user.password_hash).map_err(|e| {
            tracing::warn!(user_id = %user.id, "Login failed: invalid password");
            e
        })?;

        tracing::info!(user_id = %user.id, "User logged in");

        self.issue(user)
    }

    fn issue(&self, user: User) -> Result<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(&user)?;

        Ok(AuthResponse {
            access_token,
            user: UserResponse::from(user),
        })
    }
}
