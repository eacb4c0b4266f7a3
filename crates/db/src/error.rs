//! Error type for repository methods that mix domain rules with SQL.

use cityline_core::error::CoreError;

/// Returned by repository methods that enforce domain rules inside a
/// transaction (terminal-state guards, assignment checks, duplicate
/// votes). Plain CRUD methods keep the bare `sqlx::Error` signature.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
