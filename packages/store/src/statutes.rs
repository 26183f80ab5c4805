//! Queries on the `statutes` table and the [`PgStatuteStore`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use citelaw_resolver::store::StatuteStore;
use citelaw_resolver::types::{JurisdictionLevel, Statute, StatuteRecord};

use crate::error::{Result, StoreError};

/// A row of the `statutes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatuteRow {
    pub id: String,
    pub citation: String,
    pub jurisdiction: String,
    pub level: String,
    pub title: String,
    pub chapter: Option<String>,
    pub section: String,
    pub content: String,
    pub url: Option<String>,
    pub source: String,
    pub is_active: bool,
    pub effective_date: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl TryFrom<StatuteRow> for StatuteRecord {
    type Error = StoreError;

    fn try_from(row: StatuteRow) -> Result<Self> {
        let Some(level) = JurisdictionLevel::parse(&row.level) else {
            return Err(StoreError::CorruptRow {
                message: format!("unknown level '{}'", row.level),
                citation: row.citation,
                jurisdiction: row.jurisdiction,
            });
        };

        Ok(StatuteRecord {
            statute: Statute {
                id: row.id,
                citation: row.citation,
                jurisdiction: row.jurisdiction,
                title: row.title,
                content: row.content,
                section: row.section,
                source_url: row.url,
                effective_date: row.effective_date,
            },
            level,
            chapter: row.chapter,
            source: row.source,
            is_active: row.is_active,
            last_updated: row.last_updated,
        })
    }
}

/// Insert a statute, or replace every field of the existing row with the
/// same `(citation, jurisdiction)`.
pub async fn upsert_statute(pool: &PgPool, record: &StatuteRecord) -> Result<StatuteRecord> {
    let statute = &record.statute;
    let row = sqlx::query_as::<_, StatuteRow>(
        r#"
        INSERT INTO statutes (
            id, citation, jurisdiction, level, title, chapter, section,
            content, url, source, is_active, effective_date, last_updated
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (citation, jurisdiction) DO UPDATE SET
            id = EXCLUDED.id,
            level = EXCLUDED.level,
            title = EXCLUDED.title,
            chapter = EXCLUDED.chapter,
            section = EXCLUDED.section,
            content = EXCLUDED.content,
            url = EXCLUDED.url,
            source = EXCLUDED.source,
            is_active = EXCLUDED.is_active,
            effective_date = EXCLUDED.effective_date,
            last_updated = EXCLUDED.last_updated
        RETURNING *
        "#,
    )
    .bind(&statute.id)
    .bind(&statute.citation)
    .bind(&statute.jurisdiction)
    .bind(record.level.as_str())
    .bind(&statute.title)
    .bind(&record.chapter)
    .bind(&statute.section)
    .bind(&statute.content)
    .bind(&statute.source_url)
    .bind(&record.source)
    .bind(record.is_active)
    .bind(&statute.effective_date)
    .bind(record.last_updated)
    .fetch_one(pool)
    .await?;

    row.try_into()
}

/// Get a statute by its `(citation, jurisdiction)` key.
pub async fn get_statute(
    pool: &PgPool,
    citation: &str,
    jurisdiction: &str,
) -> Result<Option<StatuteRecord>> {
    let row = sqlx::query_as::<_, StatuteRow>(
        "SELECT * FROM statutes WHERE citation = $1 AND jurisdiction = $2",
    )
    .bind(citation)
    .bind(jurisdiction)
    .fetch_optional(pool)
    .await?;

    row.map(StatuteRecord::try_from).transpose()
}

/// Mark a statute inactive. Returns false if no such row exists.
pub async fn deactivate_statute(pool: &PgPool, citation: &str, jurisdiction: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE statutes SET is_active = FALSE, last_updated = now()
        WHERE citation = $1 AND jurisdiction = $2
        "#,
    )
    .bind(citation)
    .bind(jurisdiction)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Count active statutes per jurisdiction, ordered by jurisdiction.
pub async fn count_by_jurisdiction(pool: &PgPool) -> Result<Vec<(String, i64)>> {
    let counts = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT jurisdiction, COUNT(*) FROM statutes
        WHERE is_active
        GROUP BY jurisdiction
        ORDER BY jurisdiction
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// [`StatuteStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStatuteStore {
    pool: PgPool,
}

impl PgStatuteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StatuteStore for PgStatuteStore {
    async fn get(
        &self,
        citation: &str,
        jurisdiction: &str,
    ) -> std::result::Result<Option<StatuteRecord>, citelaw_resolver::StoreError> {
        Ok(get_statute(&self.pool, citation, jurisdiction).await?)
    }

    async fn upsert(
        &self,
        record: &StatuteRecord,
    ) -> std::result::Result<(), citelaw_resolver::StoreError> {
        upsert_statute(&self.pool, record).await?;
        tracing::debug!(
            citation = record.citation(),
            jurisdiction = record.jurisdiction(),
            "Statute stored"
        );
        Ok(())
    }
}
