//! Database repository layer
//!
//! Store ports consumed by the access engine and services, with a Postgres
//! implementation per record type and an in-memory backend.

pub mod audit_repo;
pub mod memory;
pub mod organization_repo;
pub mod task_repo;
pub mod user_repo;

pub use audit_repo::AuditRepository;
pub use memory::MemoryStore;
pub use organization_repo::OrganizationRepository;
pub use task_repo::TaskRepository;
pub use user_repo::UserRepository;

use crate::{
    access::VisibilityFilter,
    error::AppError,
    models::{audit::AuditEvent, organization::Organization, task::Task, user::User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Organization lookups used by hierarchy resolution
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError>;

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Organization>, AppError>;

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Organization>, AppError>;

    async fn insert(&self, org: &Organization) -> Result<(), AppError>;
}

/// Task records
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: &Task) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Visible tasks ordered by position ascending, newest first within a position.
    async fn list(&self, filter: &VisibilityFilter) -> Result<Vec<Task>, AppError>;

    /// Returns `false` when the task no longer exists.
    async fn update(&self, task: &Task) -> Result<bool, AppError>;

    /// Returns `false` when the task no longer exists.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// User records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn list(&self, filter: &VisibilityFilter) -> Result<Vec<User>, AppError>;
}

/// Append-only audit store
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, event: &AuditEvent) -> Result<(), AppError>;

    /// Visible events, newest first.
    async fn list(&self, filter: &VisibilityFilter, limit: i64) -> Result<Vec<AuditEvent>, AppError>;
}

/// The four store ports wired to one backend
#[derive(Clone)]
pub struct Stores {
    pub organizations: Arc<dyn OrganizationStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub users: Arc<dyn UserStore>,
    pub audit: Arc<dyn AuditSink>,
}

impl Stores {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            organizations: Arc::new(OrganizationRepository::new(db.clone())),
            tasks: Arc::new(TaskRepository::new(db.clone())),
            users: Arc::new(UserRepository::new(db.clone())),
            audit: Arc::new(AuditRepository::new(db)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            organizations: store.clone(),
            tasks: store.clone(),
            users: store.clone(),
            audit: store,
        }
    }
}
