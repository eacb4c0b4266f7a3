//! Read access to the append-only `issue_updates` audit trail.
//!
//! Writes happen exclusively through `IssueRepo`'s transition methods, in
//! the same transaction as the issue update itself. There is no update or
//! delete path for audit rows.

use sqlx::PgPool;

use cityline_core::types::DbId;

use crate::models::issue_update::{IssueUpdate, SortOrder};

/// Column list for issue_updates queries.
const COLUMNS: &str = "id, issue_id, status, comment, updated_by, timestamp, created_at";

/// Provides ordered reads over the audit trail.
pub struct IssueUpdateRepo;

impl IssueUpdateRepo {
    /// Ordered history for one issue. The id tie-break keeps rows written
    /// in the same instant in insertion order.
    pub async fn history(
        pool: &PgPool,
        issue_id: DbId,
        order: SortOrder,
    ) -> Result<Vec<IssueUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issue_updates
             WHERE issue_id = $1
             ORDER BY timestamp {dir}, id {dir}",
            dir = order.sql()
        );
        sqlx::query_as::<_, IssueUpdate>(&query)
            .bind(issue_id)
            .fetch_all(pool)
            .await
    }

    /// Number of audit rows recorded for an issue.
    pub async fn count_for_issue(pool: &PgPool, issue_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM issue_updates WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_one(pool)
            .await
    }
}
