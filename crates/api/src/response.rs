//! Shared response envelope for API handlers.
//!
//! List and single-entity reads serialize as `{ "data": ... }`. Composite
//! views that aggregate several queries (the citizen dashboard, the admin
//! queue, the technician worklist) define their own top-level response
//! structs in their handler modules instead.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: issue }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
