//! Engagement records: upvotes, likes, and comments.

use serde::Serialize;
use sqlx::FromRow;

use cityline_core::types::{DbId, Timestamp};

/// A comment joined with its author's display name, as served to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentWithAuthor {
    pub id: DbId,
    pub issue_id: DbId,
    pub user_id: DbId,
    pub comment_text: String,
    pub author_name: String,
    pub created_at: Timestamp,
}

/// Whether a like toggle added or removed the caller's like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Liked,
    Unliked,
}

/// Result of a like toggle: the action taken and the fresh count.
#[derive(Debug, Clone, Serialize)]
pub struct LikeToggle {
    pub action: LikeAction,
    pub like_count: i64,
}
