use std::sync::Arc;

use cityline_services::geocode::GeocodeClient;
use cityline_services::storage::FileStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cityline_db::DbPool,
    /// Server configuration (JWT settings, upload dir, service endpoints).
    pub config: Arc<ServerConfig>,
    /// Forward-geocoding client for dashboard map centers.
    pub geocoder: Arc<GeocodeClient>,
    /// On-disk storage for uploaded photos.
    pub file_store: Arc<FileStore>,
}
