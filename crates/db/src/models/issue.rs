//! Issue entity, write DTO, and the role-scoped read projections.

use serde::Serialize;
use sqlx::FromRow;

use cityline_core::issue::{IssueStatus, Severity};
use cityline_core::types::{DbId, Timestamp};

/// A row from the `issues` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Issue {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: Option<String>,
    pub technician_id: Option<DbId>,
    /// Denormalized cache of the upvotes join-table cardinality.
    pub upvotes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new issue. Status starts at Pending and the upvote
/// counter at zero via column defaults.
#[derive(Debug)]
pub struct CreateIssue {
    pub user_id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: Severity,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: Option<String>,
}

/// Citizen dashboard row: an open issue in the caller's city, with the
/// caller's own upvote state.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DashboardIssue {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub upvotes: i32,
    pub image_path: Option<String>,
    pub caller_voted: bool,
}

/// Social feed row: a same-city issue by another reporter, with engagement
/// counts and the caller's like state.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedPost {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub author_name: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub caller_liked: bool,
}

/// Admin triage queue row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct QueueIssue {
    pub id: DbId,
    pub title: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub upvotes: i32,
    pub city: String,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    /// Reporter display name; None when the account was deleted.
    pub reported_by: Option<String>,
    pub technician_name: Option<String>,
}

/// Issue detail joined with the reporter's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IssueWithReporter {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: Option<String>,
    pub technician_id: Option<DbId>,
    pub upvotes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub reported_by: Option<String>,
}

/// Technician worklist row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorklistIssue {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
}

/// Pending / in-progress / resolved tallies for a scope.
#[derive(Debug, Clone, Copy, Serialize, FromRow)]
pub struct StatusTallies {
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

/// Flat row for the filtered data export.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExportRow {
    pub id: DbId,
    pub title: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub upvotes: i32,
    pub city: String,
    pub created_at: Timestamp,
}

/// Coordinate point for the admin heatmap.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HeatmapPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
}
