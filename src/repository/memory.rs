//! In-memory store backend
//!
//! Implements every store port over `tokio` locks. Used by the `memory`
//! storage backend and by tests.

use super::{AuditSink, OrganizationStore, TaskStore, UserStore};
use crate::{
    access::VisibilityFilter,
    error::AppError,
    models::{audit::AuditEvent, organization::Organization, task::Task, user::User},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    organizations: RwLock<HashMap<Uuid, Organization>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
    users: RwLock<HashMap<Uuid, User>>,
    audit: RwLock<Vec<AuditEvent>>,
    fail_audit: AtomicBool,
    record_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent audit append fail (or succeed again).
    pub fn fail_audit_appends(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the audit log in append order.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit.read().await.clone()
    }

    /// Number of task, user and audit store calls made so far.
    pub fn record_store_calls(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        Ok(self.organizations.read().await.get(&id).cloned())
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Organization>, AppError> {
        let orgs = self.organizations.read().await;
        Ok(orgs
            .values()
            .filter(|o| o.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Organization>, AppError> {
        let orgs = self.organizations.read().await;
        let mut found: Vec<Organization> = ids.iter().filter_map(|id| orgs.get(id).cloned()).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn insert(&self, org: &Organization) -> Result<(), AppError> {
        self.organizations.write().await.insert(org.id, org.clone());
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: &Task) -> Result<(), AppError> {
        self.touch();
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        self.touch();
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &VisibilityFilter) -> Result<Vec<Task>, AppError> {
        self.touch();
        let tasks = self.tasks.read().await;
        let mut visible: Vec<Task> = tasks.values().filter(|t| filter.matches(*t)).cloned().collect();
        visible.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(visible)
    }

    async fn update(&self, task: &Task) -> Result<bool, AppError> {
        self.touch();
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.touch();
        Ok(self.tasks.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        self.touch();
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.touch();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn list(&self, filter: &VisibilityFilter) -> Result<Vec<User>, AppError> {
        self.touch();
        let users = self.users.read().await;
        let mut visible: Vec<User> = users.values().filter(|u| filter.matches(*u)).cloned().collect();
        visible.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(visible)
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, event: &AuditEvent) -> Result<(), AppError> {
        self.touch();
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(AppError::Internal("audit sink unavailable".to_string()));
        }
        self.audit.write().await.push(event.clone());
        Ok(())
    }

    async fn list(&self, filter: &VisibilityFilter, limit: i64) -> Result<Vec<AuditEvent>, AppError> {
        self.touch();
        let audit = self.audit.read().await;
        // Reversed so later appends win ties on occurred_at
        let mut visible: Vec<AuditEvent> =
            audit.iter().rev().filter(|e| filter.matches(*e)).cloned().collect();
        visible.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        visible.truncate(limit.max(0) as usize);
        Ok(visible)
    }
}
