//! Organization repository (组织数据访问)

use super::OrganizationStore;
use crate::{error::AppError, models::organization::Organization};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct OrganizationRepository {
    db: PgPool,
}

impl OrganizationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    /// 根据 ID 查找组织
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(org)
    }

    /// 查询直接子组织
    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE parent_id = $1 ORDER BY name",
        )
        .bind(parent_id)
        .fetch_all(&self.db)
        .await?;

        Ok(orgs)
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE id = ANY($1) ORDER BY name",
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(orgs)
    }

    /// 创建组织
    async fn insert(&self, org: &Organization) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(org.id)
        .bind(&org.name)
        .bind(org.parent_id)
        .bind(org.created_at)
        .bind(org.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
