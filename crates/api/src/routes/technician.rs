//! Route definitions for the `/technician` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::technician;
use crate::state::AppState;

/// Routes mounted at `/technician`. All require the technician role.
///
/// ```text
/// GET /worklist        -> worklist (?include_resolved)
/// GET /issues          -> issues_by_status (?status=...)
/// GET /issues/{id}     -> issue_detail
/// PUT /issues/{id}     -> update_issue (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/worklist", get(technician::worklist))
        .route("/issues", get(technician::issues_by_status))
        .route(
            "/issues/{id}",
            get(technician::issue_detail).put(technician::update_issue),
        )
}
