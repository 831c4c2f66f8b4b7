//! Vulnerability record persistence.
//!
//! The primary key on `vulnerabilities.vulnerability_id` is the only
//! cross-request coordination: two concurrent inserts for the same id cannot
//! both succeed, and the loser sees [`StoreError::Duplicate`].

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::vulnerability::{FixResult, NewVulnerabilityRecord, VulnerabilityRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Vulnerability ID '{0}' already exists")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait VulnerabilityStore: Send + Sync {
    /// Fetch the stored fix fields for an id, if any.
    async fn find_fix(&self, vulnerability_id: &str) -> Result<Option<FixResult>, StoreError>;

    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the id exists.
    async fn insert(&self, record: &NewVulnerabilityRecord) -> Result<(), StoreError>;

    /// Connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgVulnerabilityStore {
    pool: PgPool,
}

impl PgVulnerabilityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full stored record, including the creation timestamp.
    pub async fn find_record(
        &self,
        vulnerability_id: &str,
    ) -> Result<Option<VulnerabilityRecord>, StoreError> {
        let record = sqlx::query_as::<_, VulnerabilityRecord>(
            "SELECT * FROM vulnerabilities WHERE vulnerability_id = $1",
        )
        .bind(vulnerability_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}

#[async_trait]
impl VulnerabilityStore for PgVulnerabilityStore {
    async fn find_fix(&self, vulnerability_id: &str) -> Result<Option<FixResult>, StoreError> {
        let fix = sqlx::query_as::<_, FixResult>(
            r#"
            SELECT vulnerability_id, fixed_code, fix_description
            FROM vulnerabilities
            WHERE vulnerability_id = $1
            "#,
        )
        .bind(vulnerability_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(fix)
    }

    async fn insert(&self, record: &NewVulnerabilityRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO vulnerabilities (vulnerability_id, description, code_snippet,
                language, fixed_code, fix_description)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&record.vulnerability_id)
        .bind(&record.description)
        .bind(&record.code_snippet)
        .bind(&record.language)
        .bind(&record.fixed_code)
        .bind(&record.fix_description)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate(record.vulnerability_id.clone())
            }
            _ => StoreError::Database(e),
        })?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
