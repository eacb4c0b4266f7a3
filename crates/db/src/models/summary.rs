//! Analytics projections and the weekly-summary cache.

use serde::Serialize;
use sqlx::FromRow;

use cityline_core::issue::{IssueStatus, Severity};
use cityline_core::summary::IssueSample;
use cityline_core::types::{DbId, Timestamp};

/// Issue count per lifecycle status.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub count: i64,
}

/// Issue count per category.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Issues reported on one calendar day.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyCount {
    pub date: chrono::NaiveDate,
    pub count: i64,
}

/// Resolved-issue count for one technician (top-performer list).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TechnicianResolvedCount {
    pub name: String,
    pub resolved_count: i64,
}

/// Full leaderboard row: workload and resolution speed per technician.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TechnicianLeaderboard {
    pub name: String,
    pub resolved_count: i64,
    pub in_progress_count: i64,
    pub total_assigned: i64,
    /// Mean hours to resolve, one decimal; None when nothing was resolved.
    pub avg_resolution_hours: Option<f64>,
}

/// One issue inside a reporting window, as sampled for the weekly stats.
#[derive(Debug, Clone, FromRow)]
pub struct WeeklySampleRow {
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    pub category: String,
    pub resolution_hours: f64,
}

impl From<WeeklySampleRow> for IssueSample {
    fn from(row: WeeklySampleRow) -> Self {
        IssueSample {
            status: row.status,
            severity: row.severity,
            category: row.category,
            resolution_hours: row.resolution_hours,
        }
    }
}

/// A row from the `summary_cache` table: the last generated narrative for
/// one (city, department) scope plus the stats it was generated from.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SummaryCache {
    pub id: DbId,
    pub city: String,
    pub department: String,
    pub summary_text: String,
    pub stats: serde_json::Value,
    pub generated_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
