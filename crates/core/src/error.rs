//! Domain error taxonomy shared across the workspace.

use crate::types::DbId;

/// Domain errors raised by core validation and repository rule checks.
///
/// The API layer maps each variant to a stable HTTP status, so choosing
/// the variant here decides what the client sees.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
