//! 审计日志查询服务
//! 写入由 access::AuditRecorder 负责，这里只提供受可见范围约束的读取

use crate::{
    access::AccessScope,
    error::Result,
    models::{
        actor::Actor,
        audit::{AuditEvent, AuditLogQuery},
        role::{Action, ResourceKind},
    },
    repository::AuditSink,
};
use std::sync::Arc;

/// 单次查询返回的最大条数
const MAX_LIMIT: i64 = 1000;

pub struct AuditLogService {
    sink: Arc<dyn AuditSink>,
    scope: AccessScope,
}

impl AuditLogService {
    pub fn new(sink: Arc<dyn AuditSink>, scope: AccessScope) -> Self {
        Self { sink, scope }
    }

    /// 查询调用者可见的审计日志（最新在前）
    pub async fn list(&self, actor: &Actor, query: AuditLogQuery) -> Result<Vec<AuditEvent>> {
        self.scope.authorize(actor, ResourceKind::AuditLog, Action::Read)?;

        let filter = self.scope.visibility_filter(actor).await?;
        let limit = query.limit.clamp(1, MAX_LIMIT);

        self.sink.list(&filter, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::{AccessDenied, AuditEntry, AuditRecorder, PermissionMatrix},
        error::AppError,
        models::{organization::Organization, role::Role},
        repository::{MemoryStore, OrganizationStore},
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn test_list_is_scoped_and_limited() {
        let store = Arc::new(MemoryStore::new());
        let org = Organization::new("Acme", None);
        let other = Organization::new("Globex", None);
        OrganizationStore::insert(store.as_ref(), &org).await.unwrap();
        OrganizationStore::insert(store.as_ref(), &other).await.unwrap();

        let recorder = AuditRecorder::new(store.clone());
        let inside = Actor::new(Uuid::new_v4(), Role::Owner, org.id);
        let outside = Actor::new(Uuid::new_v4(), Role::Owner, other.id);
        for actor in [&inside, &inside, &outside] {
            recorder
                .record(AuditEntry::new(actor, Action::Create, ResourceKind::Task, Uuid::new_v4(), "t"))
                .await
                .unwrap();
        }

        let scope = AccessScope::new(Arc::new(PermissionMatrix::standard().unwrap()), store.clone());
        let service = AuditLogService::new(store.clone(), scope);

        let admin = Actor::new(Uuid::new_v4(), Role::Admin, org.id);
        let events = service.list(&admin, AuditLogQuery::default()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.organization_id == org.id));
        assert!(events[0].occurred_at >= events[1].occurred_at);

        let events = service.list(&admin, AuditLogQuery { limit: 1 }).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_viewer_cannot_read_audit_log() {
        let store = Arc::new(MemoryStore::new());
        let scope = AccessScope::new(Arc::new(PermissionMatrix::standard().unwrap()), store.clone());
        let service = AuditLogService::new(store.clone(), scope);

        let viewer = Actor::new(Uuid::new_v4(), Role::Viewer, Uuid::new_v4());
        let err = service.list(&viewer, AuditLogQuery::default()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Forbidden(AccessDenied::InsufficientPermissions)
        ));
        assert_eq!(store.record_store_calls(), 0);
    }
}
