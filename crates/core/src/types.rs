//! Shared type aliases.

use chrono::{DateTime, Utc};

/// Database primary key type (maps to BIGSERIAL).
pub type DbId = i64;

/// Timestamp type used across the system; always UTC.
pub type Timestamp = DateTime<Utc>;
