pub mod admin;
pub mod auth;
pub mod health;
pub mod issues;
pub mod technician;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register               citizen self-registration (public)
/// /auth/login/citizen          citizen login (public)
/// /auth/login/admin            admin login (public)
/// /auth/login/technician       technician login (public)
/// /auth/refresh                rotate a refresh token (public)
/// /auth/logout                 revoke all sessions (requires auth)
///
/// /issues                      report an issue (citizen, multipart POST)
/// /issues/dashboard            open issues + map center (citizen)
/// /issues/feed                 same-city social feed (citizen)
/// /issues/mine                 own reports with ascending history (citizen)
/// /issues/{id}/updates         ordered history, ?order=asc|desc (any role)
/// /issues/{id}/upvote          one-time upvote (citizen, POST)
/// /issues/{id}/like            like toggle (citizen, POST)
/// /issues/{id}/comments        list (any role), add (citizen, POST)
///
/// /admin/queue                 severity-partitioned triage queue
/// /admin/issues/{id}           detail + eligible technicians (GET),
///                              status/assignment update (PUT)
/// /admin/technicians           roster with load (GET), create (POST)
/// /admin/technicians/{id}      remove (DELETE)
/// /admin/analytics             breakdowns, trend, leaderboards
/// /admin/export                filtered rows, ?status&start_date&end_date
/// /admin/heatmap               open-issue coordinates for the map
/// /admin/summary               weekly stats + cached narrative
///
/// /technician/worklist         assigned issues, ?include_resolved
/// /technician/issues           by-status filter, ?status=...
/// /technician/issues/{id}      assigned detail (GET),
///                              field update (multipart PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication: registration, per-role login, refresh, logout.
        .nest("/auth", auth::router())
        // Citizen reporting and engagement.
        .nest("/issues", issues::router())
        // Admin triage, roster, analytics, and the weekly summary.
        .nest("/admin", admin::router())
        // Technician worklist and field updates.
        .nest("/technician", technician::router())
}
