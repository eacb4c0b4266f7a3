//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register           -> register (citizen self-signup)
/// POST /login/citizen      -> login_citizen
/// POST /login/admin        -> login_admin
/// POST /login/technician   -> login_technician
/// POST /refresh            -> refresh
/// POST /logout             -> logout (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login/citizen", post(auth::login_citizen))
        .route("/login/admin", post(auth::login_admin))
        .route("/login/technician", post(auth::login_technician))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}
