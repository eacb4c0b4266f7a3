//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the admin role.
///
/// ```text
/// GET    /queue               -> queue
/// GET    /issues/{id}         -> issue_detail
/// PUT    /issues/{id}         -> update_issue
/// GET    /technicians         -> list_technicians
/// POST   /technicians         -> add_technician
/// DELETE /technicians/{id}    -> delete_technician
/// GET    /analytics           -> analytics
/// GET    /export              -> export
/// GET    /heatmap             -> heatmap
/// GET    /summary             -> weekly_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(admin::queue))
        .route(
            "/issues/{id}",
            get(admin::issue_detail).put(admin::update_issue),
        )
        .route(
            "/technicians",
            get(admin::list_technicians).post(admin::add_technician),
        )
        .route("/technicians/{id}", delete(admin::delete_technician))
        .route("/analytics", get(admin::analytics))
        .route("/export", get(admin::export))
        .route("/heatmap", get(admin::heatmap))
        .route("/summary", get(admin::weekly_summary))
}
