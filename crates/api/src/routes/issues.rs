//! Route definitions for the `/issues` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::issues;
use crate::state::AppState;

/// Routes mounted at `/issues`.
///
/// ```text
/// POST /                  -> report (citizen, multipart)
/// GET  /dashboard         -> dashboard (citizen)
/// GET  /feed              -> feed (citizen)
/// GET  /mine              -> my_issues (citizen)
/// GET  /{id}/updates      -> history (any authenticated role)
/// POST /{id}/upvote       -> upvote (citizen)
/// POST /{id}/like         -> like (citizen)
/// GET  /{id}/comments     -> list_comments (any authenticated role)
/// POST /{id}/comments     -> add_comment (citizen)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(issues::report))
        .route("/dashboard", get(issues::dashboard))
        .route("/feed", get(issues::feed))
        .route("/mine", get(issues::my_issues))
        .route("/{id}/updates", get(issues::history))
        .route("/{id}/upvote", post(issues::upvote))
        .route("/{id}/like", post(issues::like))
        .route(
            "/{id}/comments",
            get(issues::list_comments).post(issues::add_comment),
        )
}
