//! User domain models

use super::{organization::Organization, role::Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub organization_id: Uuid,
    pub parent_organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New member of `organization`; the parent link is copied from the organization.
    pub fn new(
        email: &str,
        username: impl Into<String>,
        password_hash: String,
        role: Role,
        organization: &Organization,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            username: username.into(),
            password_hash,
            role,
            organization_id: organization.id,
            parent_organization_id: organization.parent_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User response (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub organization_id: Uuid,
    pub parent_organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            organization_id: user.organization_id,
            parent_organization_id: user.parent_organization_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Register request (creates an organization and its owner)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub organization_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Login / register response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
}

/// Create user request (member of a visible organization)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Defaults to the caller's own organization
    pub organization_id: Option<Uuid>,
}
