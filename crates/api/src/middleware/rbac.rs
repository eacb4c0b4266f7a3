//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthPrincipal`] and rejects requests whose role
//! does not match. The three roles are disjoint (separate tables, separate
//! id sequences), so unlike hierarchical schemes no role implies another:
//! an admin token is rejected on citizen routes and vice versa.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cityline_core::error::CoreError;
use cityline_core::roles::Role;

use super::auth::AuthPrincipal;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `citizen` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn citizen_only(RequireCitizen(principal): RequireCitizen) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireCitizen(pub AuthPrincipal);

impl FromRequestParts<AppState> for RequireCitizen {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = AuthPrincipal::from_request_parts(parts, state).await?;
        if principal.role != Role::Citizen {
            return Err(AppError::Core(CoreError::Forbidden(
                "Citizen role required".into(),
            )));
        }
        Ok(RequireCitizen(principal))
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthPrincipal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = AuthPrincipal::from_request_parts(parts, state).await?;
        if principal.role != Role::Admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(principal))
    }
}

/// Requires the `technician` role. Rejects with 403 Forbidden otherwise.
pub struct RequireTechnician(pub AuthPrincipal);

impl FromRequestParts<AppState> for RequireTechnician {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = AuthPrincipal::from_request_parts(parts, state).await?;
        if principal.role != Role::Technician {
            return Err(AppError::Core(CoreError::Forbidden(
                "Technician role required".into(),
            )));
        }
        Ok(RequireTechnician(principal))
    }
}

/// Requires any authenticated principal (any valid role).
///
/// Functionally equivalent to [`AuthPrincipal`] but named explicitly for use
/// in route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthPrincipal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = AuthPrincipal::from_request_parts(parts, state).await?;
        Ok(RequireAuth(principal))
    }
}
