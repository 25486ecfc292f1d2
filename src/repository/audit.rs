//! Audit log repository (append-only)

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::audit::AuditLog};

#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record a staff action
    pub async fn add(&self, actor_email: &str, action: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO audit_logs (actor_email, action, date) VALUES ($1, $2, NOW())")
            .bind(actor_email)
            .bind(action)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Log entries, newest first
    pub async fn list(&self, limit: i64) -> AppResult<Vec<AuditLog>> {
        let logs = sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs ORDER BY date DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
