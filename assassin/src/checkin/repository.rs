//! Check-in persistence.

use super::errors::CheckInResult;
use super::models::CheckIn;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;

/// Trait for check-in repository operations
#[async_trait]
pub trait CheckInRepository: Send + Sync {
    /// Record a check-in
    async fn insert(&self, check_in: &CheckIn) -> CheckInResult<()>;

    /// All check-ins, oldest first
    async fn list(&self) -> CheckInResult<Vec<CheckIn>>;

    /// Cheap liveness check of the backing store
    async fn ping(&self) -> CheckInResult<()>;
}

/// PostgreSQL implementation of `CheckInRepository`
pub struct PgCheckInRepository {
    pool: PgPool,
}

impl PgCheckInRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `check_ins` table if it does not exist yet
    pub async fn ensure_schema(&self) -> CheckInResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS check_ins (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                image_url TEXT NOT NULL,
                submitted_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_check_ins_submitted_at ON check_ins (submitted_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CheckInRepository for PgCheckInRepository {
    async fn insert(&self, check_in: &CheckIn) -> CheckInResult<()> {
        sqlx::query(
            "INSERT INTO check_ins (id, name, image_url, submitted_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(check_in.id)
        .bind(&check_in.name)
        .bind(&check_in.image_url)
        .bind(check_in.submitted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> CheckInResult<Vec<CheckIn>> {
        let rows = sqlx::query(
            "SELECT id, name, image_url, submitted_at
             FROM check_ins
             ORDER BY submitted_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CheckIn {
                id: r.get("id"),
                name: r.get("name"),
                image_url: r.get("image_url"),
                submitted_at: r.get("submitted_at"),
            })
            .collect())
    }

    async fn ping(&self) -> CheckInResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process repository, used when no database is configured
#[derive(Default)]
pub struct MemoryCheckInRepository {
    check_ins: RwLock<Vec<CheckIn>>,
}

impl MemoryCheckInRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckInRepository for MemoryCheckInRepository {
    async fn insert(&self, check_in: &CheckIn) -> CheckInResult<()> {
        self.check_ins.write().await.push(check_in.clone());
        Ok(())
    }

    async fn list(&self) -> CheckInResult<Vec<CheckIn>> {
        let mut check_ins = self.check_ins.read().await.clone();
        check_ins.sort_by_key(|c| c.submitted_at);
        Ok(check_ins)
    }

    async fn ping(&self) -> CheckInResult<()> {
        Ok(())
    }
}
