//! Audit-trail records for issue transitions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cityline_core::issue::IssueStatus;
use cityline_core::roles::UpdateAuthor;
use cityline_core::types::{DbId, Timestamp};

/// Ordering for history reads. Citizen timelines ascend; staff detail
/// views descend. Both directions share one query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A row from the `issue_updates` table. Rows are never modified after
/// insert, so there is no `updated_at`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IssueUpdate {
    pub id: DbId,
    pub issue_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub comment: String,
    #[sqlx(try_from = "String")]
    pub updated_by: UpdateAuthor,
    pub timestamp: Timestamp,
    pub created_at: Timestamp,
}
