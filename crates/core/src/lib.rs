//! Cityline domain core.
//!
//! Pure domain logic with no database or HTTP dependencies: the issue
//! lifecycle (status and severity enumerations plus transition rules),
//! actor roles, report and comment validation, coordinate math, and the
//! weekly report statistics that feed the summary narrative.

pub mod error;
pub mod geo;
pub mod issue;
pub mod report;
pub mod roles;
pub mod summary;
pub mod types;
