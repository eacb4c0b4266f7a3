//! Repository layer.
//!
//! Each repository is a zero-sized struct with async methods taking
//! `&PgPool` as the first argument. Methods that enforce domain rules
//! inside a transaction return [`RepoError`](crate::error::RepoError);
//! plain CRUD keeps the bare `sqlx::Error` signature.

pub mod engagement_repo;
pub mod issue_repo;
pub mod issue_update_repo;
pub mod principal_repo;
pub mod session_repo;
pub mod summary_repo;

pub use engagement_repo::EngagementRepo;
pub use issue_repo::IssueRepo;
pub use issue_update_repo::IssueUpdateRepo;
pub use principal_repo::{AdminRepo, TechnicianRepo, UserRepo};
pub use session_repo::SessionRepo;
pub use summary_repo::SummaryRepo;
