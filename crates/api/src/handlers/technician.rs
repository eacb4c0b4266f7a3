//! Handlers for the `/technician` resource: the worklist, per-issue detail,
//! and the field-update endpoint with optional evidence photo.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use cityline_core::error::CoreError;
use cityline_core::geo::map_center;
use cityline_core::issue::IssueStatus;
use cityline_core::types::DbId;
use cityline_db::models::issue::{Issue, IssueWithReporter, StatusTallies, WorklistIssue};
use cityline_db::models::issue_update::{IssueUpdate, SortOrder};
use cityline_db::repositories::{IssueRepo, IssueUpdateRepo, TechnicianRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::issues::MapCenter;
use crate::middleware::rbac::RequireTechnician;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /technician/worklist`.
#[derive(Debug, Deserialize)]
pub struct WorklistParams {
    /// When true the worklist includes resolved issues; default false.
    #[serde(default)]
    pub include_resolved: bool,
}

/// Response body for `GET /technician/worklist`.
#[derive(Debug, Serialize)]
pub struct WorklistResponse {
    pub name: String,
    pub city: String,
    pub tallies: StatusTallies,
    /// Mean coordinate of all assigned issues; city-center fallback when
    /// none are assigned.
    pub map_center: MapCenter,
    /// Assigned issues in fixed priority order (Pending first).
    pub issues: Vec<WorklistIssue>,
}

/// Query parameters for `GET /technician/issues`.
#[derive(Debug, Deserialize)]
pub struct StatusFilterParams {
    pub status: String,
}

/// Response body for `GET /technician/issues/{id}`.
#[derive(Debug, Serialize)]
pub struct AssignedIssueResponse {
    pub issue: IssueWithReporter,
    /// Update history, newest first.
    pub updates: Vec<IssueUpdate>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/technician/worklist
///
/// The technician home view: assigned issues in priority order, status
/// tallies across all assignments, and the map center.
pub async fn worklist(
    State(state): State<AppState>,
    RequireTechnician(principal): RequireTechnician,
    Query(params): Query<WorklistParams>,
) -> AppResult<Json<WorklistResponse>> {
    let technician = TechnicianRepo::find_by_id(&state.pool, principal.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Account no longer exists".into(),
            ))
        })?;

    let issues =
        IssueRepo::worklist(&state.pool, principal.id, !params.include_resolved).await?;
    let tallies = IssueRepo::assigned_tallies(&state.pool, principal.id).await?;

    // Tallies and the map cover every assignment, resolved included.
    let coordinates = IssueRepo::assigned_coordinates(&state.pool, principal.id).await?;
    let (latitude, longitude) = map_center(&coordinates);

    Ok(Json(WorklistResponse {
        name: technician.name,
        city: technician.city,
        tallies,
        map_center: MapCenter {
            latitude,
            longitude,
        },
        issues,
    }))
}

/// GET /api/v1/technician/issues?status=...
///
/// Assigned issues filtered to one status, newest first.
pub async fn issues_by_status(
    State(state): State<AppState>,
    RequireTechnician(principal): RequireTechnician,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<DataResponse<Vec<WorklistIssue>>>> {
    let status: IssueStatus = params.status.parse().map_err(AppError::Core)?;
    let issues = IssueRepo::worklist_by_status(&state.pool, principal.id, status).await?;
    Ok(Json(DataResponse { data: issues }))
}

/// GET /api/v1/technician/issues/{id}
///
/// Detail for one assigned issue. Issues assigned to anyone else read as
/// not found, so the worklist never leaks across technicians.
pub async fn issue_detail(
    State(state): State<AppState>,
    RequireTechnician(principal): RequireTechnician,
    Path(id): Path<DbId>,
) -> AppResult<Json<AssignedIssueResponse>> {
    let issue = IssueRepo::find_assigned(&state.pool, id, principal.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))?;

    let updates = IssueUpdateRepo::history(&state.pool, id, SortOrder::Desc).await?;
    Ok(Json(AssignedIssueResponse { issue, updates }))
}

/// PUT /api/v1/technician/issues/{id}
///
/// Field update on an assigned issue. Accepts a multipart form with text
/// fields `status` and `comment` plus an optional `image` evidence photo
/// that replaces the stored one. Updating an issue assigned to someone
/// else returns 403; transitions out of a terminal status return 409.
pub async fn update_issue(
    State(state): State<AppState>,
    RequireTechnician(principal): RequireTechnician,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Issue>>> {
    let mut status_raw = String::new();
    let mut comment = String::new();
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !filename.is_empty() && !data.is_empty() {
                    image = Some((filename, data.to_vec()));
                }
            }
            "status" => {
                status_raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "comment" => {
                comment = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            _ => {} // ignore unknown fields
        }
    }

    let status: IssueStatus = status_raw.parse().map_err(AppError::Core)?;

    let image_path = match image {
        Some((filename, data)) => {
            let stored = state
                .file_store
                .save(&filename, &data)
                .await
                .map_err(|e| AppError::InternalError(format!("File store error: {e}")))?;
            Some(stored)
        }
        None => None,
    };

    let issue = IssueRepo::technician_transition(
        &state.pool,
        principal.id,
        id,
        status,
        &comment,
        image_path.as_deref(),
    )
    .await?;

    tracing::info!(
        issue_id = id,
        technician_id = principal.id,
        status = status.as_str(),
        "Issue updated by technician"
    );
    Ok(Json(DataResponse { data: issue }))
}
