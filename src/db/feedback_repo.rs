//! PostgreSQL feedback repository
//!
//! Each accepted submission becomes one row. Rows are only ever inserted;
//! the identifier is assigned by the database.

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    db::{
        repository::{FeedbackRepository, RepositoryError, RepositoryResult},
        DbPool,
    },
    models::{CanonicalFeedback, PersistedFeedback, ResearchOptIn},
};

/// PostgreSQL implementation of FeedbackRepository
#[derive(Clone)]
pub struct PgFeedbackRepository {
    pool: DbPool,
    table: String,
}

impl PgFeedbackRepository {
    /// Create a repository writing to `table`.
    ///
    /// `table` is interpolated into SQL; callers pass a name that passed
    /// `DatabaseConfig::validate`.
    pub fn new(pool: DbPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// Name of the backing table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the feedback table if it does not exist yet
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                rating          SMALLINT NOT NULL CHECK (rating BETWEEN 1 AND 5),
                opinion         TEXT,
                research_optin  TEXT NOT NULL
                                CHECK (research_optin IN ('not_interested', 'interested')),
                email           TEXT,
                created_at      TIMESTAMPTZ NOT NULL,
                ip              TEXT,
                user_agent      TEXT
            )
            "#,
            table = self.table
        );

        sqlx::query(&ddl).execute(&self.pool).await?;

        tracing::info!(table = %self.table, "Feedback table ready");
        Ok(())
    }

    /// Convert a database row to PersistedFeedback
    fn row_to_feedback(row: &sqlx::postgres::PgRow) -> RepositoryResult<PersistedFeedback> {
        let rating: i16 = row.try_get("rating")?;
        let rating = u8::try_from(rating)
            .map_err(|_| RepositoryError::Serialization(format!("Invalid rating: {}", rating)))?;

        let research_optin: String = row.try_get("research_optin")?;
        let research_optin = research_optin
            .parse::<ResearchOptIn>()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        Ok(PersistedFeedback {
            feedback: CanonicalFeedback {
                rating,
                opinion: row.try_get("opinion")?,
                research_optin,
                email: row.try_get("email")?,
            },
            created_at: row.try_get("created_at")?,
            ip: row.try_get("ip")?,
            user_agent: row.try_get("user_agent")?,
        })
    }
}

#[async_trait]
impl FeedbackRepository for PgFeedbackRepository {
    async fn insert(&self, doc: &PersistedFeedback) -> RepositoryResult<Uuid> {
        let sql = format!(
            r#"
            INSERT INTO {} (
                rating, opinion, research_optin, email, created_at, ip, user_agent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
            self.table
        );

        let id = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(i16::from(doc.feedback.rating))
            .bind(&doc.feedback.opinion)
            .bind(doc.feedback.research_optin.as_str())
            .bind(&doc.feedback.email)
            .bind(doc.created_at)
            .bind(&doc.ip)
            .bind(&doc.user_agent)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<PersistedFeedback>> {
        let sql = format!(
            r#"
            SELECT rating, opinion, research_optin, email, created_at, ip, user_agent
            FROM {}
            WHERE id = $1
            "#,
            self.table
        );

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_feedback(&row)?)),
            None => Ok(None),
        }
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let count = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| RepositoryError::Connection(format!("Health check failed: {}", e)))
    }
}
