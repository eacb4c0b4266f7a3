//! Handlers for the `/issues` resource: citizen reporting, dashboards, and
//! the engagement endpoints (upvotes, likes, comments).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use cityline_core::error::CoreError;
use cityline_core::issue::Severity;
use cityline_core::report::validate_report;
use cityline_core::types::DbId;
use cityline_db::models::engagement::{CommentWithAuthor, LikeToggle};
use cityline_db::models::issue::{CreateIssue, DashboardIssue, FeedPost, Issue};
use cityline_db::models::issue_update::{IssueUpdate, SortOrder};
use cityline_db::repositories::{EngagementRepo, IssueRepo, IssueUpdateRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireCitizen};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response body for `GET /issues/dashboard`.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub name: String,
    pub city: String,
    /// Map center for the city, resolved via geocoding (fail-soft).
    pub map_center: MapCenter,
    /// City-wide resolved-issue count.
    pub resolved_count: i64,
    /// Open issues in the city, ranked by upvotes.
    pub issues: Vec<DashboardIssue>,
}

#[derive(Debug, Serialize)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

/// One of the caller's own reports with its full ascending history.
#[derive(Debug, Serialize)]
pub struct MyIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub updates: Vec<IssueUpdate>,
}

/// Query parameters for `GET /issues/{id}/updates`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// `asc` (default) or `desc`.
    pub order: Option<SortOrder>,
}

/// Request body for `POST /issues/{id}/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

/// Response body for `POST /issues/{id}/upvote`.
#[derive(Debug, Serialize)]
pub struct UpvoteResponse {
    pub upvotes: i32,
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// POST /api/v1/issues
///
/// Report a new issue. Accepts a multipart form with text fields `title`,
/// `description`, `category`, `severity`, `city`, `latitude`, `longitude`
/// and an optional `image` file. The issue starts Pending with no assignee.
pub async fn report(
    State(state): State<AppState>,
    RequireCitizen(principal): RequireCitizen,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Issue>>)> {
    let mut title = String::new();
    let mut description = String::new();
    let mut category = String::new();
    let mut severity_raw = String::new();
    let mut city = String::new();
    let mut latitude_raw = String::new();
    let mut longitude_raw = String::new();
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
                // An empty file input still submits a field; skip it.
                if !filename.is_empty() && !data.is_empty() {
                    image = Some((filename, data.to_vec()));
                }
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "title" => title = text,
                    "description" => description = text,
                    "category" => category = text,
                    "severity" => severity_raw = text,
                    "city" => city = text,
                    "latitude" => latitude_raw = text,
                    "longitude" => longitude_raw = text,
                    _ => {} // ignore unknown fields
                }
            }
        }
    }

    let severity: Severity = severity_raw.parse().map_err(AppError::Core)?;
    let latitude: f64 = latitude_raw
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid latitude".into()))?;
    let longitude: f64 = longitude_raw
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid longitude".into()))?;

    validate_report(&title, &category, &city, latitude, longitude).map_err(AppError::Core)?;

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

    let issue = IssueRepo::create(
        &state.pool,
        &CreateIssue {
            user_id: principal.id,
            title,
            description,
            category,
            severity,
            city,
            latitude,
            longitude,
            image_path,
        },
    )
    .await?;

    tracing::info!(issue_id = issue.id, user_id = principal.id, "Issue reported");
    Ok((StatusCode::CREATED, Json(DataResponse { data: issue })))
}

// ---------------------------------------------------------------------------
// Citizen views
// ---------------------------------------------------------------------------

/// GET /api/v1/issues/dashboard
///
/// The citizen home view: open issues in the caller's city ranked by
/// upvotes, the city-wide resolved count, and a geocoded map center.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireCitizen(principal): RequireCitizen,
) -> AppResult<Json<DashboardResponse>> {
    let user = UserRepo::find_by_id(&state.pool, principal.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: principal.id,
        }))?;

    let issues = IssueRepo::citizen_dashboard(&state.pool, principal.id, &user.city).await?;
    let resolved_count = IssueRepo::resolved_count_for_city(&state.pool, &user.city).await?;
    let (latitude, longitude) = state.geocoder.resolve_city(&user.city).await;

    Ok(Json(DashboardResponse {
        name: user.name,
        city: user.city,
        map_center: MapCenter {
            latitude,
            longitude,
        },
        resolved_count,
        issues,
    }))
}

/// GET /api/v1/issues/feed
///
/// Same-city reports by other citizens, newest first, capped at 50.
pub async fn feed(
    State(state): State<AppState>,
    RequireCitizen(principal): RequireCitizen,
) -> AppResult<Json<DataResponse<Vec<FeedPost>>>> {
    let user = UserRepo::find_by_id(&state.pool, principal.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: principal.id,
        }))?;

    let posts = IssueRepo::feed(&state.pool, principal.id, &user.city).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// GET /api/v1/issues/mine
///
/// The caller's own reports (any status), each with its full ascending
/// update history.
pub async fn my_issues(
    State(state): State<AppState>,
    RequireCitizen(principal): RequireCitizen,
) -> AppResult<Json<DataResponse<Vec<MyIssue>>>> {
    let issues = IssueRepo::my_issues(&state.pool, principal.id).await?;

    let mut result = Vec::with_capacity(issues.len());
    for issue in issues {
        let updates = IssueUpdateRepo::history(&state.pool, issue.id, SortOrder::Asc).await?;
        result.push(MyIssue { issue, updates });
    }

    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/issues/{id}/updates
///
/// Ordered update history for one issue. Defaults to ascending; pass
/// `?order=desc` for staff detail views.
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(id): Path<DbId>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<IssueUpdate>>>> {
    // 404 before returning an empty history for a missing issue.
    IssueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id,
        }))?;

    let order = params.order.unwrap_or(SortOrder::Asc);
    let updates = IssueUpdateRepo::history(&state.pool, id, order).await?;
    Ok(Json(DataResponse { data: updates }))
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

/// POST /api/v1/issues/{id}/upvote
///
/// One-time upvote. A second vote from the same citizen returns 409 and
/// leaves the count unchanged.
pub async fn upvote(
    State(state): State<AppState>,
    RequireCitizen(principal): RequireCitizen,
    Path(id): Path<DbId>,
) -> AppResult<Json<UpvoteResponse>> {
    let upvotes = EngagementRepo::upvote(&state.pool, principal.id, id).await?;
    tracing::info!(issue_id = id, user_id = principal.id, upvotes, "Issue upvoted");
    Ok(Json(UpvoteResponse { upvotes }))
}

/// POST /api/v1/issues/{id}/like
///
/// Toggle the caller's like; returns the action taken and the fresh count.
pub async fn like(
    State(state): State<AppState>,
    RequireCitizen(principal): RequireCitizen,
    Path(id): Path<DbId>,
) -> AppResult<Json<LikeToggle>> {
    let toggle = EngagementRepo::toggle_like(&state.pool, principal.id, id).await?;
    Ok(Json(toggle))
}

/// GET /api/v1/issues/{id}/comments
///
/// Comments with author names, newest first.
pub async fn list_comments(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CommentWithAuthor>>>> {
    let comments = EngagementRepo::list_comments(&state.pool, id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/issues/{id}/comments
///
/// Append a comment. Whitespace-only text is a validation error.
pub async fn add_comment(
    State(state): State<AppState>,
    RequireCitizen(principal): RequireCitizen,
    Path(id): Path<DbId>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CommentWithAuthor>>)> {
    let comment = EngagementRepo::add_comment(&state.pool, principal.id, id, &input.comment).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}
