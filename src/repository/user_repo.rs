//! User repository (数据库访问层)

use super::UserStore;
use crate::{access::VisibilityFilter, error::AppError, models::user::User};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// 创建用户，邮箱重复时返回 Conflict
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, username, password_hash, role, organization_id,
                parent_organization_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.organization_id)
        .bind(user.parent_organization_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("User with this email already exists".to_string())
            }
            other => AppError::Database(other),
        })?;

        Ok(())
    }

    /// 根据邮箱查找用户（不区分大小写）
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn list(&self, filter: &VisibilityFilter) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE organization_id = ANY($1)
              AND ($2::uuid IS NULL OR id = $2)
            ORDER BY username
            "#,
        )
        .bind(filter.organization_id_list())
        .bind(filter.owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }
}
