//! Repository for the `sessions` table (refresh tokens).

use sqlx::PgPool;

use cityline_core::roles::Role;
use cityline_core::types::DbId;

use crate::models::session::{CreateSession, Session};

/// Column list for sessions queries.
const COLUMNS: &str =
    "id, principal_id, role, refresh_token_hash, expires_at, is_revoked, created_at, updated_at";

/// Provides CRUD operations for refresh-token sessions across all three
/// principal types.
pub struct SessionRepo;

impl SessionRepo {
    /// Create a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (principal_id, role, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.principal_id)
            .bind(input.role.as_str())
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a live session by refresh token hash. Revoked and expired
    /// sessions do not match.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE refresh_token_hash = $1 AND is_revoked = FALSE AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(refresh_token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session (rotation). Returns `true` if a live
    /// session was revoked.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_revoked = TRUE, updated_at = NOW()
             WHERE id = $1 AND is_revoked = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every live session for one principal (logout everywhere).
    /// Returns the number of sessions revoked.
    pub async fn revoke_all_for_principal(
        pool: &PgPool,
        role: Role,
        principal_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_revoked = TRUE, updated_at = NOW()
             WHERE role = $1 AND principal_id = $2 AND is_revoked = FALSE",
        )
        .bind(role.as_str())
        .bind(principal_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired sessions outright. Returns the number deleted.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
