//! Repository for weekly-summary support: admin scopes, stat sample
//! windows, and the `summary_cache` table.

use sqlx::PgPool;

use cityline_core::types::Timestamp;

use crate::models::summary::{SummaryCache, WeeklySampleRow};

/// Column list for summary_cache queries.
const COLUMNS: &str =
    "id, city, department, summary_text, stats, generated_at, created_at, updated_at";

/// Provides reads and the upsert for cached weekly narratives.
pub struct SummaryRepo;

impl SummaryRepo {
    /// Every distinct (city, department) admin scope that needs a summary.
    pub async fn admin_scopes(pool: &PgPool) -> Result<Vec<(String, String)>, sqlx::Error> {
        sqlx::query_as::<_, (String, String)>(
            "SELECT DISTINCT city, department FROM admins ORDER BY city, department",
        )
        .fetch_all(pool)
        .await
    }

    /// Issues created in the half-open window `[from, to)` for a scope,
    /// reduced to weekly-stat samples. `resolution_hours` is the span from
    /// creation to last update; zero for untouched issues.
    pub async fn weekly_samples(
        pool: &PgPool,
        city: &str,
        department: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<WeeklySampleRow>, sqlx::Error> {
        sqlx::query_as::<_, WeeklySampleRow>(
            "SELECT status, severity, category,
                    (EXTRACT(EPOCH FROM (updated_at - created_at)) / 3600.0)::float8
                        AS resolution_hours
             FROM issues
             WHERE city = $1 AND category = $2
               AND created_at >= $3 AND created_at < $4",
        )
        .bind(city)
        .bind(department)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Upsert the cached narrative for a scope, returning the stored row.
    pub async fn upsert(
        pool: &PgPool,
        city: &str,
        department: &str,
        summary_text: &str,
        stats: &serde_json::Value,
    ) -> Result<SummaryCache, sqlx::Error> {
        let query = format!(
            "INSERT INTO summary_cache (city, department, summary_text, stats, generated_at)
             VALUES ($1, $2, $3, $4, NOW())
             ON CONFLICT ON CONSTRAINT uq_summary_cache_scope
             DO UPDATE SET summary_text = EXCLUDED.summary_text,
                           stats = EXCLUDED.stats,
                           generated_at = EXCLUDED.generated_at,
                           updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SummaryCache>(&query)
            .bind(city)
            .bind(department)
            .bind(summary_text)
            .bind(stats)
            .fetch_one(pool)
            .await
    }

    /// Last cached narrative for a scope, if one was ever generated.
    pub async fn find(
        pool: &PgPool,
        city: &str,
        department: &str,
    ) -> Result<Option<SummaryCache>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM summary_cache WHERE city = $1 AND department = $2");
        sqlx::query_as::<_, SummaryCache>(&query)
            .bind(city)
            .bind(department)
            .fetch_optional(pool)
            .await
    }
}
