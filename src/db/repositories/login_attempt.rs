use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::login_attempts;

pub struct LoginAttemptRepository {
    conn: DatabaseConnection,
}

impl LoginAttemptRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert one attempt row. The identifier is stored lowercased so
    /// window counts see a canonical value.
    pub async fn record(
        &self,
        identifier: &str,
        ip_address: &str,
        user_agent: Option<&str>,
        success: bool,
        reason: &str,
    ) -> Result<()> {
        let active = login_attempts::ActiveModel {
            identifier: Set(identifier.to_lowercase()),
            ip_address: Set(ip_address.to_string()),
            user_agent: Set(user_agent.map(str::to_string)),
            success: Set(success),
            reason: Set(reason.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        login_attempts::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to record login attempt")?;

        Ok(())
    }

    /// Failed attempts for the identifier at or after the cutoff.
    pub async fn count_recent_failures(&self, identifier: &str, cutoff: &str) -> Result<u64> {
        let count = login_attempts::Entity::find()
            .filter(login_attempts::Column::Identifier.eq(identifier.to_lowercase()))
            .filter(login_attempts::Column::Success.eq(false))
            .filter(login_attempts::Column::CreatedAt.gte(cutoff))
            .count(&self.conn)
            .await
            .context("Failed to count recent login failures")?;

        Ok(count)
    }

    pub async fn count_for_identifier(&self, identifier: &str) -> Result<u64> {
        let count = login_attempts::Entity::find()
            .filter(login_attempts::Column::Identifier.eq(identifier.to_lowercase()))
            .count(&self.conn)
            .await
            .context("Failed to count login attempts")?;

        Ok(count)
    }

    pub async fn recent_for_identifier(
        &self,
        identifier: &str,
        limit: u64,
    ) -> Result<Vec<login_attempts::Model>> {
        let attempts = login_attempts::Entity::find()
            .filter(login_attempts::Column::Identifier.eq(identifier.to_lowercase()))
            .order_by_desc(login_attempts::Column::CreatedAt)
            .paginate(&self.conn, limit)
            .fetch_page(0)
            .await
            .context("Failed to list recent login attempts")?;

        Ok(attempts)
    }

    /// Delete attempts older than the cutoff. Returns rows removed.
    pub async fn prune(&self, cutoff: &str) -> Result<u64> {
        let result = login_attempts::Entity::delete_many()
            .filter(login_attempts::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await
            .context("Failed to prune login attempts")?;

        Ok(result.rows_affected)
    }
}
