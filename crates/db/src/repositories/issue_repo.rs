//! Repository for the `issues` table and its role-scoped read views.
//!
//! Transitions serialize on the issue row (`SELECT ... FOR UPDATE`) so the
//! terminal-state guard, the column update, and the audit-trail append
//! commit or roll back as one unit.

use sqlx::{PgPool, Postgres, Transaction};

use cityline_core::error::CoreError;
use cityline_core::issue::{ensure_transition, IssueStatus, Severity};
use cityline_core::roles::UpdateAuthor;
use cityline_core::types::DbId;

use crate::error::RepoError;
use crate::models::issue::{
    CreateIssue, DashboardIssue, ExportRow, FeedPost, HeatmapPoint, Issue, IssueWithReporter,
    QueueIssue, StatusTallies, WorklistIssue,
};
use crate::models::summary::{
    CategoryCount, DailyCount, StatusCount, TechnicianLeaderboard, TechnicianResolvedCount,
};

/// Column list for issues queries.
const COLUMNS: &str = "id, user_id, title, description, category, severity, status, \
    city, latitude, longitude, image_path, technician_id, upvotes, created_at, updated_at";

/// Detail columns joined with the reporter's name.
const DETAIL_COLUMNS: &str = "i.id, i.user_id, i.title, i.description, i.category, i.severity, \
    i.status, i.city, i.latitude, i.longitude, i.image_path, i.technician_id, i.upvotes, \
    i.created_at, i.updated_at, u.name AS reported_by";

/// Provides writes and role-scoped reads for issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert a new issue, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateIssue) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues
                (user_id, title, description, category, severity, city, latitude, longitude, image_path)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.severity.as_str())
            .bind(&input.city)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.image_path)
            .fetch_one(pool)
            .await
    }

    /// Find an issue by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Issue detail joined with the reporter's display name.
    pub async fn find_with_reporter(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<IssueWithReporter>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM issues i
             LEFT JOIN users u ON u.id = i.user_id
             WHERE i.id = $1"
        );
        sqlx::query_as::<_, IssueWithReporter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Issue detail visible to one technician: None unless the issue is
    /// assigned to them, so foreign issues read as not found.
    pub async fn find_assigned(
        pool: &PgPool,
        id: DbId,
        technician_id: DbId,
    ) -> Result<Option<IssueWithReporter>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM issues i
             LEFT JOIN users u ON u.id = i.user_id
             WHERE i.id = $1 AND i.technician_id = $2"
        );
        sqlx::query_as::<_, IssueWithReporter>(&query)
            .bind(id)
            .bind(technician_id)
            .fetch_optional(pool)
            .await
    }

    /// Admin transition: set the status, replace the technician assignment
    /// (None clears it), and append the audit row in one transaction.
    pub async fn admin_transition(
        pool: &PgPool,
        issue_id: DbId,
        new_status: IssueStatus,
        technician_id: Option<DbId>,
        comment: &str,
    ) -> Result<Issue, RepoError> {
        let mut tx = pool.begin().await?;

        let current = lock_issue(&mut tx, issue_id).await?;
        ensure_transition(current.status, new_status)?;

        let query = format!(
            "UPDATE issues
             SET status = $2, technician_id = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Issue>(&query)
            .bind(issue_id)
            .bind(new_status.as_str())
            .bind(technician_id)
            .fetch_one(&mut *tx)
            .await?;

        append_update(&mut tx, issue_id, new_status, comment, UpdateAuthor::Admin).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Technician transition: only the assigned technician may update, and
    /// an evidence photo may replace the stored one. Appends the audit row
    /// in the same transaction.
    pub async fn technician_transition(
        pool: &PgPool,
        technician_id: DbId,
        issue_id: DbId,
        new_status: IssueStatus,
        comment: &str,
        image_path: Option<&str>,
    ) -> Result<Issue, RepoError> {
        let mut tx = pool.begin().await?;

        let current = lock_issue(&mut tx, issue_id).await?;
        if current.technician_id != Some(technician_id) {
            return Err(CoreError::Forbidden(
                "Issue is not assigned to this technician".to_string(),
            )
            .into());
        }
        ensure_transition(current.status, new_status)?;

        let query = format!(
            "UPDATE issues
             SET status = $2, image_path = COALESCE($3, image_path), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Issue>(&query)
            .bind(issue_id)
            .bind(new_status.as_str())
            .bind(image_path)
            .fetch_one(&mut *tx)
            .await?;

        append_update(&mut tx, issue_id, new_status, comment, UpdateAuthor::Technician).await?;

        tx.commit().await?;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Citizen views
    // -----------------------------------------------------------------------

    /// Open issues in a city for the citizen dashboard, ranked by upvotes,
    /// with the caller's upvote state.
    pub async fn citizen_dashboard(
        pool: &PgPool,
        user_id: DbId,
        city: &str,
    ) -> Result<Vec<DashboardIssue>, sqlx::Error> {
        sqlx::query_as::<_, DashboardIssue>(
            "SELECT i.id, i.title, i.description, i.category, i.severity, i.status,
                    i.city, i.latitude, i.longitude, i.upvotes, i.image_path,
                    (uv.user_id IS NOT NULL) AS caller_voted
             FROM issues i
             LEFT JOIN upvotes uv ON uv.issue_id = i.id AND uv.user_id = $1
             WHERE i.city = $2 AND i.status NOT IN ('Resolved', 'Rejected')
             ORDER BY i.upvotes DESC, i.created_at DESC",
        )
        .bind(user_id)
        .bind(city)
        .fetch_all(pool)
        .await
    }

    /// Count of resolved issues in a city (dashboard badge).
    pub async fn resolved_count_for_city(pool: &PgPool, city: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM issues WHERE city = $1 AND status = 'Resolved'",
        )
        .bind(city)
        .fetch_one(pool)
        .await
    }

    /// Same-city feed of other users' reports, newest first, with
    /// engagement counts and the caller's like state. Capped at 50 rows.
    pub async fn feed(
        pool: &PgPool,
        user_id: DbId,
        city: &str,
    ) -> Result<Vec<FeedPost>, sqlx::Error> {
        sqlx::query_as::<_, FeedPost>(
            "SELECT i.id, i.title, i.description, i.category, i.severity, i.status,
                    i.image_path, i.created_at,
                    u.name AS author_name,
                    (SELECT COUNT(*) FROM likes lc WHERE lc.issue_id = i.id) AS like_count,
                    (SELECT COUNT(*) FROM comments c WHERE c.issue_id = i.id) AS comment_count,
                    (ml.user_id IS NOT NULL) AS caller_liked
             FROM issues i
             JOIN users u ON u.id = i.user_id
             LEFT JOIN likes ml ON ml.issue_id = i.id AND ml.user_id = $1
             WHERE i.city = $2 AND i.user_id <> $1
             ORDER BY i.created_at DESC
             LIMIT 50",
        )
        .bind(user_id)
        .bind(city)
        .fetch_all(pool)
        .await
    }

    /// The caller's own reports, newest first. The upvote counter is
    /// recomputed from the join table rather than read from the cache
    /// column, so the citizen always sees the true cardinality.
    pub async fn my_issues(pool: &PgPool, user_id: DbId) -> Result<Vec<Issue>, sqlx::Error> {
        sqlx::query_as::<_, Issue>(
            "SELECT i.id, i.user_id, i.title, i.description, i.category, i.severity, i.status,
                    i.city, i.latitude, i.longitude, i.image_path, i.technician_id,
                    (SELECT COUNT(*) FROM upvotes uv WHERE uv.issue_id = i.id)::INT AS upvotes,
                    i.created_at, i.updated_at
             FROM issues i
             WHERE i.user_id = $1
             ORDER BY i.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Admin views
    // -----------------------------------------------------------------------

    /// Triage queue for one severity tier: unresolved issues in the admin's
    /// city and department, ranked by upvotes. Rejected issues stay visible
    /// so the queue explains itself.
    pub async fn admin_queue(
        pool: &PgPool,
        city: &str,
        department: &str,
        severity: Severity,
    ) -> Result<Vec<QueueIssue>, sqlx::Error> {
        sqlx::query_as::<_, QueueIssue>(
            "SELECT i.id, i.title, i.category, i.severity, i.status, i.upvotes,
                    i.city, i.image_path, i.created_at,
                    u.name AS reported_by,
                    t.name AS technician_name
             FROM issues i
             LEFT JOIN users u ON u.id = i.user_id
             LEFT JOIN technicians t ON t.id = i.technician_id
             WHERE i.city = $1 AND i.category = $2 AND i.severity = $3
               AND i.status <> 'Resolved'
             ORDER BY i.upvotes DESC, i.created_at DESC",
        )
        .bind(city)
        .bind(department)
        .bind(severity.as_str())
        .fetch_all(pool)
        .await
    }

    /// Pending / in-progress / resolved tallies for a city + department.
    pub async fn status_tallies(
        pool: &PgPool,
        city: &str,
        department: &str,
    ) -> Result<StatusTallies, sqlx::Error> {
        sqlx::query_as::<_, StatusTallies>(
            "SELECT COUNT(*) FILTER (WHERE status = 'Pending') AS pending,
                    COUNT(*) FILTER (WHERE status = 'In Progress') AS in_progress,
                    COUNT(*) FILTER (WHERE status = 'Resolved') AS resolved
             FROM issues
             WHERE city = $1 AND category = $2",
        )
        .bind(city)
        .bind(department)
        .fetch_one(pool)
        .await
    }

    /// Open-issue coordinates for the admin heatmap.
    pub async fn heatmap(
        pool: &PgPool,
        city: &str,
        department: &str,
    ) -> Result<Vec<HeatmapPoint>, sqlx::Error> {
        sqlx::query_as::<_, HeatmapPoint>(
            "SELECT latitude, longitude, severity, status
             FROM issues
             WHERE city = $1 AND category = $2 AND status NOT IN ('Resolved', 'Rejected')",
        )
        .bind(city)
        .bind(department)
        .fetch_all(pool)
        .await
    }

    /// Scope rows for the data export, filtered by optional status and an
    /// optional inclusive calendar-date range.
    pub async fn export_rows(
        pool: &PgPool,
        city: &str,
        department: &str,
        status: Option<IssueStatus>,
        date_range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    ) -> Result<Vec<ExportRow>, sqlx::Error> {
        let base = "SELECT id, title, category, severity, status, upvotes, city, created_at
             FROM issues
             WHERE city = $1 AND category = $2";

        match (status, date_range) {
            (Some(status), Some((from, to))) => {
                let query =
                    format!("{base} AND status = $3 AND created_at::date BETWEEN $4 AND $5 ORDER BY created_at DESC");
                sqlx::query_as::<_, ExportRow>(&query)
                    .bind(city)
                    .bind(department)
                    .bind(status.as_str())
                    .bind(from)
                    .bind(to)
                    .fetch_all(pool)
                    .await
            }
            (Some(status), None) => {
                let query = format!("{base} AND status = $3 ORDER BY created_at DESC");
                sqlx::query_as::<_, ExportRow>(&query)
                    .bind(city)
                    .bind(department)
                    .bind(status.as_str())
                    .fetch_all(pool)
                    .await
            }
            (None, Some((from, to))) => {
                let query =
                    format!("{base} AND created_at::date BETWEEN $3 AND $4 ORDER BY created_at DESC");
                sqlx::query_as::<_, ExportRow>(&query)
                    .bind(city)
                    .bind(department)
                    .bind(from)
                    .bind(to)
                    .fetch_all(pool)
                    .await
            }
            (None, None) => {
                let query = format!("{base} ORDER BY created_at DESC");
                sqlx::query_as::<_, ExportRow>(&query)
                    .bind(city)
                    .bind(department)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    // -----------------------------------------------------------------------
    // Technician views
    // -----------------------------------------------------------------------

    /// Assigned issues ordered by status priority (Pending, In Progress,
    /// Resolved, Rejected) then recency. `only_open` drops resolved rows.
    pub async fn worklist(
        pool: &PgPool,
        technician_id: DbId,
        only_open: bool,
    ) -> Result<Vec<WorklistIssue>, sqlx::Error> {
        let filter = if only_open { "AND status <> 'Resolved'" } else { "" };
        let query = format!(
            "SELECT id, title, description, category, severity, status,
                    latitude, longitude, image_path, created_at
             FROM issues
             WHERE technician_id = $1 {filter}
             ORDER BY CASE status
                 WHEN 'Pending' THEN 1
                 WHEN 'In Progress' THEN 2
                 WHEN 'Resolved' THEN 3
                 ELSE 4
             END, created_at DESC"
        );
        sqlx::query_as::<_, WorklistIssue>(&query)
            .bind(technician_id)
            .fetch_all(pool)
            .await
    }

    /// Assigned issues in one status, newest first.
    pub async fn worklist_by_status(
        pool: &PgPool,
        technician_id: DbId,
        status: IssueStatus,
    ) -> Result<Vec<WorklistIssue>, sqlx::Error> {
        sqlx::query_as::<_, WorklistIssue>(
            "SELECT id, title, description, category, severity, status,
                    latitude, longitude, image_path, created_at
             FROM issues
             WHERE technician_id = $1 AND status = $2
             ORDER BY created_at DESC",
        )
        .bind(technician_id)
        .bind(status.as_str())
        .fetch_all(pool)
        .await
    }

    /// Tallies across all of a technician's assigned issues.
    pub async fn assigned_tallies(
        pool: &PgPool,
        technician_id: DbId,
    ) -> Result<StatusTallies, sqlx::Error> {
        sqlx::query_as::<_, StatusTallies>(
            "SELECT COUNT(*) FILTER (WHERE status = 'Pending') AS pending,
                    COUNT(*) FILTER (WHERE status = 'In Progress') AS in_progress,
                    COUNT(*) FILTER (WHERE status = 'Resolved') AS resolved
             FROM issues
             WHERE technician_id = $1",
        )
        .bind(technician_id)
        .fetch_one(pool)
        .await
    }

    /// Coordinates of every assigned issue, for the worklist map center.
    pub async fn assigned_coordinates(
        pool: &PgPool,
        technician_id: DbId,
    ) -> Result<Vec<(f64, f64)>, sqlx::Error> {
        sqlx::query_as::<_, (f64, f64)>(
            "SELECT latitude, longitude FROM issues WHERE technician_id = $1",
        )
        .bind(technician_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    /// Status breakdown for a city + department scope.
    pub async fn status_breakdown(
        pool: &PgPool,
        city: &str,
        department: &str,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count
             FROM issues
             WHERE city = $1 AND category = $2
             GROUP BY status
             ORDER BY count DESC",
        )
        .bind(city)
        .bind(department)
        .fetch_all(pool)
        .await
    }

    /// Category breakdown across a whole city.
    pub async fn category_breakdown(
        pool: &PgPool,
        city: &str,
    ) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count
             FROM issues
             WHERE city = $1
             GROUP BY category
             ORDER BY count DESC",
        )
        .bind(city)
        .fetch_all(pool)
        .await
    }

    /// Reports per day over the most recent distinct days with activity.
    pub async fn report_trend(
        pool: &PgPool,
        city: &str,
        days: i64,
    ) -> Result<Vec<DailyCount>, sqlx::Error> {
        sqlx::query_as::<_, DailyCount>(
            "SELECT created_at::date AS date, COUNT(*) AS count
             FROM issues
             WHERE city = $1
             GROUP BY created_at::date
             ORDER BY date DESC
             LIMIT $2",
        )
        .bind(city)
        .bind(days)
        .fetch_all(pool)
        .await
    }

    /// Top technicians in scope by resolved-issue count.
    pub async fn top_technicians(
        pool: &PgPool,
        city: &str,
        department: &str,
        limit: i64,
    ) -> Result<Vec<TechnicianResolvedCount>, sqlx::Error> {
        sqlx::query_as::<_, TechnicianResolvedCount>(
            "SELECT t.name, COUNT(i.id) AS resolved_count
             FROM technicians t
             LEFT JOIN issues i ON i.technician_id = t.id AND i.status = 'Resolved'
             WHERE t.city = $1 AND t.department = $2
             GROUP BY t.id, t.name
             ORDER BY resolved_count DESC
             LIMIT $3",
        )
        .bind(city)
        .bind(department)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Workload and resolution-speed leaderboard for the scope's
    /// technicians.
    pub async fn technician_leaderboard(
        pool: &PgPool,
        city: &str,
        department: &str,
    ) -> Result<Vec<TechnicianLeaderboard>, sqlx::Error> {
        sqlx::query_as::<_, TechnicianLeaderboard>(
            "SELECT t.name,
                    COUNT(*) FILTER (WHERE i.status = 'Resolved') AS resolved_count,
                    COUNT(*) FILTER (WHERE i.status = 'In Progress') AS in_progress_count,
                    COUNT(i.id) AS total_assigned,
                    ROUND(AVG(CASE WHEN i.status = 'Resolved'
                        THEN EXTRACT(EPOCH FROM (i.updated_at - i.created_at)) / 3600.0
                    END)::numeric, 1)::float8 AS avg_resolution_hours
             FROM technicians t
             LEFT JOIN issues i ON i.technician_id = t.id
             WHERE t.city = $1 AND t.department = $2
             GROUP BY t.id, t.name
             ORDER BY resolved_count DESC, avg_resolution_hours ASC NULLS LAST
             LIMIT 10",
        )
        .bind(city)
        .bind(department)
        .fetch_all(pool)
        .await
    }
}

/// Fetch and row-lock an issue inside the caller's transaction.
async fn lock_issue(
    tx: &mut Transaction<'_, Postgres>,
    issue_id: DbId,
) -> Result<Issue, RepoError> {
    let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1 FOR UPDATE");
    let issue = sqlx::query_as::<_, Issue>(&query)
        .bind(issue_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Issue",
            id: issue_id,
        })?;
    Ok(issue)
}

/// Append the audit row inside the caller's transaction.
///
/// The timestamp is `clock_timestamp()`, read at the insert itself. `NOW()`
/// is frozen at transaction start, which predates the issue row lock, so a
/// transaction that began first but locked second would stamp its row out
/// of commit order.
async fn append_update(
    tx: &mut Transaction<'_, Postgres>,
    issue_id: DbId,
    status: IssueStatus,
    comment: &str,
    author: UpdateAuthor,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO issue_updates (issue_id, status, comment, updated_by, timestamp)
         VALUES ($1, $2, $3, $4, clock_timestamp())",
    )
    .bind(issue_id)
    .bind(status.as_str())
    .bind(comment)
    .bind(author.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
