//! Task repository (任务数据访问)

use super::TaskStore;
use crate::{access::VisibilityFilter, error::AppError, models::task::Task};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct TaskRepository {
    db: PgPool,
}

impl TaskRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn insert(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, title, description, status, category, owner_id, organization_id,
                position, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.category.as_str())
        .bind(task.owner_id)
        .bind(task.organization_id)
        .bind(task.position)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(task)
    }

    /// 可见性过滤直接作为查询谓词
    async fn list(&self, filter: &VisibilityFilter) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks
            WHERE organization_id = ANY($1)
              AND ($2::uuid IS NULL OR owner_id = $2)
            ORDER BY position ASC, created_at DESC
            "#,
        )
        .bind(filter.organization_id_list())
        .bind(filter.owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET
                title = $2,
                description = $3,
                status = $4,
                category = $5,
                position = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.category.as_str())
        .bind(task.position)
        .bind(task.updated_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
