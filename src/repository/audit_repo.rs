//! Audit repository (审计数据访问)

use super::AuditSink;
use crate::{access::VisibilityFilter, error::AppError, models::audit::AuditEvent};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct AuditRepository {
    db: PgPool,
}

impl AuditRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for AuditRepository {
    /// 插入审计日志（只追加）
    async fn append(&self, event: &AuditEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, actor_id, organization_id, action, resource_kind, resource_id,
                detail, origin, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.id)
        .bind(event.actor_id)
        .bind(event.organization_id)
        .bind(event.action.as_str())
        .bind(event.resource_kind.as_str())
        .bind(event.resource_id)
        .bind(&event.detail)
        .bind(&event.origin)
        .bind(event.occurred_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 查询审计日志，按时间倒序
    async fn list(&self, filter: &VisibilityFilter, limit: i64) -> Result<Vec<AuditEvent>, AppError> {
        let logs = sqlx::query_as::<_, AuditEvent>(
            r#"
            SELECT * FROM audit_logs
            WHERE organization_id = ANY($1)
              AND ($2::uuid IS NULL OR actor_id = $2)
            ORDER BY occurred_at DESC
            LIMIT $3
            "#,
        )
        .bind(filter.organization_id_list())
        .bind(filter.owner_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }
}
