//! Handlers for the `/admin` resource: the triage queue, issue management,
//! the technician roster, analytics, export data, the heatmap feed, and the
//! weekly summary.
//!
//! Every endpoint is scoped to the calling admin's (city, department); the
//! scope is loaded fresh per request rather than trusted from the client.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cityline_core::error::CoreError;
use cityline_core::issue::{IssueStatus, Severity};
use cityline_core::summary::{WeeklyStats, SUMMARY_PLACEHOLDER};
use cityline_core::types::{DbId, Timestamp};
use cityline_db::models::issue::{
    ExportRow, HeatmapPoint, Issue, IssueWithReporter, QueueIssue, StatusTallies,
};
use cityline_db::models::issue_update::{IssueUpdate, SortOrder};
use cityline_db::models::principal::{Admin, CreateTechnician, EligibleTechnician, TechnicianWithLoad};
use cityline_db::models::summary::{
    CategoryCount, DailyCount, StatusCount, TechnicianLeaderboard, TechnicianResolvedCount,
};
use cityline_db::repositories::{
    AdminRepo, IssueRepo, IssueUpdateRepo, SummaryRepo, TechnicianRepo,
};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::background::summary_refresh::scope_weekly_stats;
use crate::error::{AppError, AppResult};
use crate::handlers::issues::MapCenter;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of distinct days in the report trend.
const TREND_DAYS: i64 = 10;
/// Size of the top-performer list.
const TOP_TECHNICIANS: i64 = 5;
/// Minimum password length for admin-created technician accounts.
const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response body for `GET /admin/queue`.
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub name: String,
    pub city: String,
    pub department: String,
    pub map_center: MapCenter,
    pub tallies: StatusTallies,
    /// Unresolved issues partitioned by severity, each ranked by upvotes.
    pub critical: Vec<QueueIssue>,
    pub moderate: Vec<QueueIssue>,
    pub minor: Vec<QueueIssue>,
}

/// Response body for `GET /admin/issues/{id}`.
#[derive(Debug, Serialize)]
pub struct IssueDetailResponse {
    pub issue: IssueWithReporter,
    /// Update history, newest first.
    pub updates: Vec<IssueUpdate>,
    /// Assignment candidates in the issue's city and category.
    pub technicians: Vec<EligibleTechnician>,
}

/// Request body for `PUT /admin/issues/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateIssueRequest {
    pub status: String,
    /// Replaces the assignment; omitting it (or null) clears the technician.
    #[serde(default)]
    pub technician_id: Option<DbId>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Request body for `POST /admin/technicians`.
#[derive(Debug, Deserialize)]
pub struct CreateTechnicianRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Safe response shape for a newly created technician.
#[derive(Debug, Serialize)]
pub struct TechnicianResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: String,
    pub department: String,
}

/// Response body for `GET /admin/analytics`.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub city: String,
    pub department: String,
    pub status_breakdown: Vec<StatusCount>,
    /// City-wide, across all departments.
    pub category_breakdown: Vec<CategoryCount>,
    pub report_trend: Vec<DailyCount>,
    pub top_technicians: Vec<TechnicianResolvedCount>,
    pub leaderboard: Vec<TechnicianLeaderboard>,
}

/// Query parameters for `GET /admin/export`.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub status: Option<String>,
    /// `YYYY-MM-DD`; applied only when both bounds are present.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Response body for `GET /admin/summary`.
#[derive(Debug, Serialize)]
pub struct WeeklySummaryResponse {
    pub city: String,
    pub department: String,
    /// Stats computed fresh at request time.
    pub stats: WeeklyStats,
    /// Last generated narrative, or a placeholder when none exists yet.
    pub summary_text: String,
    pub generated_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Triage queue and issue management
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/queue
///
/// The triage view: unresolved issues in the admin's scope partitioned by
/// severity, status tallies, and the geocoded map center.
pub async fn queue(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
) -> AppResult<Json<QueueResponse>> {
    let admin = load_admin(&state, principal.id).await?;

    let critical =
        IssueRepo::admin_queue(&state.pool, &admin.city, &admin.department, Severity::Critical)
            .await?;
    let moderate =
        IssueRepo::admin_queue(&state.pool, &admin.city, &admin.department, Severity::Moderate)
            .await?;
    let minor =
        IssueRepo::admin_queue(&state.pool, &admin.city, &admin.department, Severity::Minor)
            .await?;
    let tallies = IssueRepo::status_tallies(&state.pool, &admin.city, &admin.department).await?;
    let (latitude, longitude) = state.geocoder.resolve_city(&admin.city).await;

    Ok(Json(QueueResponse {
        name: admin.name,
        city: admin.city,
        department: admin.department,
        map_center: MapCenter {
            latitude,
            longitude,
        },
        tallies,
        critical,
        moderate,
        minor,
    }))
}

/// GET /api/v1/admin/issues/{id}
///
/// Issue detail with the reporter's name, descending history, and the
/// technicians eligible for assignment.
pub async fn issue_detail(
    State(state): State<AppState>,
    RequireAdmin(_principal): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<IssueDetailResponse>> {
    let issue = IssueRepo::find_with_reporter(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))?;

    let updates = IssueUpdateRepo::history(&state.pool, id, SortOrder::Desc).await?;
    let technicians =
        TechnicianRepo::list_eligible(&state.pool, &issue.city, &issue.category).await?;

    Ok(Json(IssueDetailResponse {
        issue,
        updates,
        technicians,
    }))
}

/// PUT /api/v1/admin/issues/{id}
///
/// Set the status and replace the technician assignment. Transitions out of
/// a terminal status return 409 without touching the audit trail.
pub async fn update_issue(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIssueRequest>,
) -> AppResult<Json<DataResponse<Issue>>> {
    let status: IssueStatus = input.status.parse().map_err(AppError::Core)?;
    let comment = input.comment.unwrap_or_default();

    let issue =
        IssueRepo::admin_transition(&state.pool, id, status, input.technician_id, &comment).await?;

    tracing::info!(
        issue_id = id,
        admin_id = principal.id,
        status = status.as_str(),
        technician_id = input.technician_id,
        "Issue updated by admin"
    );
    Ok(Json(DataResponse { data: issue }))
}

// ---------------------------------------------------------------------------
// Technician roster
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/technicians
///
/// Roster for the admin's scope with per-technician assigned-issue load.
pub async fn list_technicians(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<TechnicianWithLoad>>>> {
    let admin = load_admin(&state, principal.id).await?;
    let technicians =
        TechnicianRepo::list_with_load(&state.pool, &admin.city, &admin.department).await?;
    Ok(Json(DataResponse { data: technicians }))
}

/// POST /api/v1/admin/technicians
///
/// Create a technician account in the admin's own city and department.
pub async fn add_technician(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
    Json(input): Json<CreateTechnicianRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TechnicianResponse>>)> {
    let admin = load_admin(&state, principal.id).await?;

    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Name is required".into(),
        )));
    }
    if input.email.trim().is_empty() || !input.email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email is required".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let technician = TechnicianRepo::create(
        &state.pool,
        &CreateTechnician {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password_hash,
            phone: input.phone,
            city: admin.city,
            department: admin.department,
        },
    )
    .await?;

    tracing::info!(
        technician_id = technician.id,
        admin_id = principal.id,
        "Technician account created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TechnicianResponse {
                id: technician.id,
                name: technician.name,
                email: technician.email,
                phone: technician.phone,
                city: technician.city,
                department: technician.department,
            },
        }),
    ))
}

/// DELETE /api/v1/admin/technicians/{id}
///
/// Remove a technician. Their assigned issues keep the audit history but
/// lose the assignment.
pub async fn delete_technician(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = TechnicianRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Technician",
            id,
        }));
    }

    tracing::info!(technician_id = id, admin_id = principal.id, "Technician removed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Analytics, export, heatmap
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/analytics
pub async fn analytics(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
) -> AppResult<Json<AnalyticsResponse>> {
    let admin = load_admin(&state, principal.id).await?;

    let status_breakdown =
        IssueRepo::status_breakdown(&state.pool, &admin.city, &admin.department).await?;
    let category_breakdown = IssueRepo::category_breakdown(&state.pool, &admin.city).await?;
    let report_trend = IssueRepo::report_trend(&state.pool, &admin.city, TREND_DAYS).await?;
    let top_technicians =
        IssueRepo::top_technicians(&state.pool, &admin.city, &admin.department, TOP_TECHNICIANS)
            .await?;
    let leaderboard =
        IssueRepo::technician_leaderboard(&state.pool, &admin.city, &admin.department).await?;

    Ok(Json(AnalyticsResponse {
        city: admin.city,
        department: admin.department,
        status_breakdown,
        category_breakdown,
        report_trend,
        top_technicians,
        leaderboard,
    }))
}

/// GET /api/v1/admin/export
///
/// Flat issue rows for the admin's scope, filtered by optional status and
/// an optional inclusive date range. The range applies only when both
/// bounds are present, matching the frontend's filter form. Formatting
/// (CSV, PDF) is the caller's concern.
pub async fn export(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
    Query(params): Query<ExportParams>,
) -> AppResult<Json<DataResponse<Vec<ExportRow>>>> {
    let admin = load_admin(&state, principal.id).await?;

    let status = match params.status.as_deref() {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<IssueStatus>().map_err(AppError::Core)?),
        _ => None,
    };

    let date_range = match (params.start_date.as_deref(), params.end_date.as_deref()) {
        (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
            let from = parse_date(start)?;
            let to = parse_date(end)?;
            Some((from, to))
        }
        _ => None,
    };

    let rows =
        IssueRepo::export_rows(&state.pool, &admin.city, &admin.department, status, date_range)
            .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/admin/heatmap
///
/// Coordinates of open issues in scope, for the map overlay.
pub async fn heatmap(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<HeatmapPoint>>>> {
    let admin = load_admin(&state, principal.id).await?;
    let points = IssueRepo::heatmap(&state.pool, &admin.city, &admin.department).await?;
    Ok(Json(DataResponse { data: points }))
}

// ---------------------------------------------------------------------------
// Weekly summary
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/summary
///
/// Weekly stats computed fresh, plus the last narrative generated by the
/// background job. The request path never calls the text-generation
/// service; without a cached row the narrative is a fixed placeholder.
pub async fn weekly_summary(
    State(state): State<AppState>,
    RequireAdmin(principal): RequireAdmin,
) -> AppResult<Json<WeeklySummaryResponse>> {
    let admin = load_admin(&state, principal.id).await?;

    let stats = scope_weekly_stats(&state.pool, &admin.city, &admin.department).await?;
    let cached = SummaryRepo::find(&state.pool, &admin.city, &admin.department).await?;

    let (summary_text, generated_at) = match cached {
        Some(row) => (row.summary_text, Some(row.generated_at)),
        None => (SUMMARY_PLACEHOLDER.to_string(), None),
    };

    Ok(Json(WeeklySummaryResponse {
        city: admin.city,
        department: admin.department,
        stats,
        summary_text,
        generated_at,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the calling admin's row; 401 when the account was deleted after the
/// token was issued.
async fn load_admin(state: &AppState, admin_id: DbId) -> AppResult<Admin> {
    AdminRepo::find_by_id(&state.pool, admin_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Account no longer exists".into(),
            ))
        })
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}
