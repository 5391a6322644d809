use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::entities::sessions;

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        token: &str,
        ip_address: &str,
        user_agent: Option<&str>,
        expires_at: &str,
    ) -> Result<sessions::Model> {
        let active = sessions::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.to_string()),
            ip_address: Set(ip_address.to_string()),
            user_agent: Set(user_agent.map(str::to_string)),
            expires_at: Set(expires_at.to_string()),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = sessions::Entity::insert(active)
            .exec_with_returning(&self.conn)
            .await
            .context("Failed to create session")?;

        Ok(model)
    }

    pub async fn count_active_for_user(&self, user_id: i32) -> Result<u64> {
        let count = sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count active sessions")?;

        Ok(count)
    }

    /// Mark sessions whose expiry has passed as inactive. Returns rows
    /// affected.
    pub async fn deactivate_expired(&self, now: &str) -> Result<u64> {
        let result = sessions::Entity::update_many()
            .col_expr(sessions::Column::IsActive, Expr::value(false))
            .filter(sessions::Column::IsActive.eq(true))
            .filter(sessions::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await
            .context("Failed to deactivate expired sessions")?;

        Ok(result.rows_affected)
    }
}
