//! Database models.
//!
//! Entity structs derive `sqlx::FromRow`; write DTOs and the read-view
//! projections live next to the entity they serve. Status, severity, and
//! role columns decode into their `cityline-core` enums via
//! `#[sqlx(try_from = "String")]`, so an out-of-enum value in the database
//! surfaces as a decode error instead of leaking to clients.

pub mod engagement;
pub mod issue;
pub mod issue_update;
pub mod principal;
pub mod session;
pub mod summary;
