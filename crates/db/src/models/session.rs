//! Refresh-token session model.

use sqlx::FromRow;

use cityline_core::roles::Role;
use cityline_core::types::{DbId, Timestamp};

/// A row from the `sessions` table. One row per issued refresh token;
/// rotation revokes the old row and inserts a new one. `principal_id`
/// points into the table named by `role`.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub principal_id: DbId,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a session. The refresh token is stored as its SHA-256
/// hash; the opaque token itself never touches the database.
#[derive(Debug)]
pub struct CreateSession {
    pub principal_id: DbId,
    pub role: Role,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
