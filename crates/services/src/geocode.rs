//! Forward geocoding of city names via a Nominatim-compatible endpoint.
//!
//! City coordinates only seed the dashboard map center, so lookups are
//! fail-soft: any error falls back to [`FALLBACK_COORDINATES`] instead of
//! failing the request.

use std::time::Duration;

use cityline_core::geo::FALLBACK_COORDINATES;

/// Per-request timeout. Geocoding sits on the dashboard path, so a slow
/// upstream must not stall page loads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Nominatim's usage policy requires an identifying user agent.
const USER_AGENT: &str = "cityline/0.1";

/// Errors from the geocoding layer.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered but found no match for the query.
    #[error("No geocoding result for '{0}'")]
    NoResult(String),

    /// The endpoint returned a body we could not interpret.
    #[error("Malformed geocoding response: {0}")]
    Malformed(String),
}

/// HTTP client for a single Nominatim-compatible geocoding service.
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodeClient {
    /// Create a client for the given base URL, e.g.
    /// `https://nominatim.openstreetmap.org`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Resolve a city name to `(latitude, longitude)`, falling back to
    /// [`FALLBACK_COORDINATES`] on any failure.
    pub async fn resolve_city(&self, city: &str) -> (f64, f64) {
        match self.lookup_city(city).await {
            Ok(coords) => coords,
            Err(e) => {
                tracing::warn!(city, error = %e, "Geocoding failed, using fallback coordinates");
                FALLBACK_COORDINATES
            }
        }
    }

    /// Look up a city name, propagating errors to the caller.
    pub async fn lookup_city(&self, city: &str) -> Result<(f64, f64), GeocodeError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", city), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        parse_search_response(&body, city)
    }
}

/// Extract `(lat, lon)` from a Nominatim search response.
///
/// Nominatim serializes coordinates as JSON strings, not numbers.
fn parse_search_response(body: &serde_json::Value, query: &str) -> Result<(f64, f64), GeocodeError> {
    let results = body
        .as_array()
        .ok_or_else(|| GeocodeError::Malformed("expected a JSON array".to_string()))?;

    let first = results
        .first()
        .ok_or_else(|| GeocodeError::NoResult(query.to_string()))?;

    let latitude = parse_coordinate(first, "lat")?;
    let longitude = parse_coordinate(first, "lon")?;
    Ok((latitude, longitude))
}

fn parse_coordinate(result: &serde_json::Value, key: &str) -> Result<f64, GeocodeError> {
    let raw = result
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| GeocodeError::Malformed(format!("missing '{key}' field")))?;
    raw.parse()
        .map_err(|_| GeocodeError::Malformed(format!("'{key}' is not a number: {raw}")))
}
