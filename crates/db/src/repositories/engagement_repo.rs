//! Repository for upvotes, likes, and comments.
//!
//! Write paths lock the issue row first, so concurrent engagement from the
//! same user serializes and resolves at the unique pair constraints instead
//! of drifting the denormalized counter.

use sqlx::{PgPool, Postgres, Transaction};

use cityline_core::error::CoreError;
use cityline_core::report::validate_comment;
use cityline_core::types::DbId;

use crate::error::RepoError;
use crate::models::engagement::{CommentWithAuthor, LikeAction, LikeToggle};

/// Provides engagement writes and counts.
pub struct EngagementRepo;

impl EngagementRepo {
    /// Record a one-time upvote and refresh the counter cache from the
    /// join-table cardinality. Conflict when the caller already voted.
    pub async fn upvote(pool: &PgPool, user_id: DbId, issue_id: DbId) -> Result<i32, RepoError> {
        let mut tx = pool.begin().await?;
        lock_issue_row(&mut tx, issue_id).await?;

        let inserted = sqlx::query(
            "INSERT INTO upvotes (user_id, issue_id) VALUES ($1, $2)
             ON CONFLICT (user_id, issue_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(issue_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(CoreError::Conflict("Already voted".to_string()).into());
        }

        // Recompute rather than increment, so the cache column can never
        // drift from the join table it summarizes.
        let upvotes = sqlx::query_scalar::<_, i32>(
            "UPDATE issues
             SET upvotes = (SELECT COUNT(*) FROM upvotes WHERE issue_id = $1)::INT
             WHERE id = $1
             RETURNING upvotes",
        )
        .bind(issue_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(upvotes)
    }

    /// Toggle the caller's like under the issue row lock. Returns the
    /// action taken and the fresh count.
    pub async fn toggle_like(
        pool: &PgPool,
        user_id: DbId,
        issue_id: DbId,
    ) -> Result<LikeToggle, RepoError> {
        let mut tx = pool.begin().await?;
        lock_issue_row(&mut tx, issue_id).await?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND issue_id = $2")
            .bind(user_id)
            .bind(issue_id)
            .execute(&mut *tx)
            .await?;

        let action = if removed.rows_affected() > 0 {
            LikeAction::Unliked
        } else {
            sqlx::query("INSERT INTO likes (user_id, issue_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(issue_id)
                .execute(&mut *tx)
                .await?;
            LikeAction::Liked
        };

        let like_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE issue_id = $1")
                .bind(issue_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(LikeToggle { action, like_count })
    }

    /// Append a comment after trimming. Empty or whitespace-only text is a
    /// validation error; commenting on a missing issue is not found.
    pub async fn add_comment(
        pool: &PgPool,
        user_id: DbId,
        issue_id: DbId,
        text: &str,
    ) -> Result<CommentWithAuthor, RepoError> {
        let trimmed = validate_comment(text)?;

        let exists = sqlx::query_scalar::<_, DbId>("SELECT id FROM issues WHERE id = $1")
            .bind(issue_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound {
                entity: "Issue",
                id: issue_id,
            }
            .into());
        }

        let comment = sqlx::query_as::<_, CommentWithAuthor>(
            "WITH inserted AS (
                 INSERT INTO comments (issue_id, user_id, comment_text)
                 VALUES ($1, $2, $3)
                 RETURNING id, issue_id, user_id, comment_text, created_at
             )
             SELECT ins.id, ins.issue_id, ins.user_id, ins.comment_text,
                    u.name AS author_name, ins.created_at
             FROM inserted ins
             JOIN users u ON u.id = ins.user_id",
        )
        .bind(issue_id)
        .bind(user_id)
        .bind(&trimmed)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Comments on one issue with author names, newest first.
    pub async fn list_comments(
        pool: &PgPool,
        issue_id: DbId,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.id, c.issue_id, c.user_id, c.comment_text,
                    u.name AS author_name, c.created_at
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.issue_id = $1
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(issue_id)
        .fetch_all(pool)
        .await
    }

    /// Join-table cardinality for one issue's upvotes (the counter cache's
    /// source of truth).
    pub async fn upvote_count(pool: &PgPool, issue_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM upvotes WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_one(pool)
            .await
    }

    /// Current like count for one issue.
    pub async fn like_count(pool: &PgPool, issue_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_one(pool)
            .await
    }
}

/// Row-lock an issue inside the caller's transaction; not found when the
/// issue does not exist.
async fn lock_issue_row(
    tx: &mut Transaction<'_, Postgres>,
    issue_id: DbId,
) -> Result<(), RepoError> {
    let locked = sqlx::query_scalar::<_, DbId>("SELECT id FROM issues WHERE id = $1 FOR UPDATE")
        .bind(issue_id)
        .fetch_optional(&mut **tx)
        .await?;
    if locked.is_none() {
        return Err(CoreError::NotFound {
            entity: "Issue",
            id: issue_id,
        }
        .into());
    }
    Ok(())
}
