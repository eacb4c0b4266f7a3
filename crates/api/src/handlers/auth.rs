//! Handlers for the `/auth` resource (registration, per-role login,
//! refresh, logout).
//!
//! Citizens, admins, and technicians authenticate against separate tables,
//! so each role has its own login endpoint. The issued tokens carry the role,
//! and refresh/logout resolve the correct table from it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cityline_core::error::CoreError;
use cityline_core::roles::Role;
use cityline_core::types::DbId;
use cityline_db::models::principal::CreateUser;
use cityline_db::models::session::CreateSession;
use cityline_db::repositories::{AdminRepo, SessionRepo, TechnicianRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthPrincipal;
use crate::state::AppState;

/// Minimum password length for citizen self-registration.
const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub city: String,
}

/// Request body for the per-role login endpoints.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub principal: PrincipalInfo,
}

/// Public principal info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct PrincipalInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub city: String,
    /// Department, for admins and technicians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Citizen self-registration. Does not log the citizen in; the client follows
/// up with `POST /auth/login/citizen`. A duplicate email maps to 409 via the
/// unique constraint.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PrincipalInfo>)> {
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
    if input.city.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "City is required".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password_hash,
            phone: input.phone,
            city: input.city.trim().to_string(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(PrincipalInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            role: Role::Citizen,
            city: user.city,
            department: None,
        }),
    ))
}

/// POST /api/v1/auth/login/citizen
pub async fn login_citizen(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    check_password(&input.password, &user.password_hash)?;

    let response = create_auth_response(
        &state,
        Role::Citizen,
        user.id,
        user.name,
        user.email,
        user.city,
        None,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/login/admin
pub async fn login_admin(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let admin = AdminRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    check_password(&input.password, &admin.password_hash)?;

    let response = create_auth_response(
        &state,
        Role::Admin,
        admin.id,
        admin.name,
        admin.email,
        admin.city,
        Some(admin.department),
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/login/technician
pub async fn login_technician(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let technician = TechnicianRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    check_password(&input.password, &technician.password_hash)?;

    let response = create_auth_response(
        &state,
        Role::Technician,
        technician.id,
        technician.name,
        technician.email,
        technician.city,
        Some(technician.department),
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// session is revoked (token rotation).
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    // Resolve the principal from the table the session's role points at.
    let gone = || AppError::Core(CoreError::Unauthorized("Account no longer exists".into()));
    let response = match session.role {
        Role::Citizen => {
            let user = UserRepo::find_by_id(&state.pool, session.principal_id)
                .await?
                .ok_or_else(gone)?;
            create_auth_response(
                &state,
                Role::Citizen,
                user.id,
                user.name,
                user.email,
                user.city,
                None,
            )
            .await?
        }
        Role::Admin => {
            let admin = AdminRepo::find_by_id(&state.pool, session.principal_id)
                .await?
                .ok_or_else(gone)?;
            create_auth_response(
                &state,
                Role::Admin,
                admin.id,
                admin.name,
                admin.email,
                admin.city,
                Some(admin.department),
            )
            .await?
        }
        Role::Technician => {
            let technician = TechnicianRepo::find_by_id(&state.pool, session.principal_id)
                .await?
                .ok_or_else(gone)?;
            create_auth_response(
                &state,
                Role::Technician,
                technician.id,
                technician.name,
                technician.email,
                technician.city,
                Some(technician.department),
            )
            .await?
        }
    };

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated principal. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_principal(&state.pool, principal.role, principal.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

/// Verify a password, mapping mismatches to the same 401 a missing account
/// produces so login failures do not leak which emails exist.
fn check_password(password: &str, stored_hash: &str) -> AppResult<()> {
    let valid = verify_password(password, stored_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(invalid_credentials());
    }
    Ok(())
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    role: Role,
    principal_id: DbId,
    name: String,
    email: String,
    city: String,
    department: Option<String>,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(principal_id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            principal_id,
            role,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        principal: PrincipalInfo {
            id: principal_id,
            name,
            email,
            role,
            city,
            department,
        },
    })
}
