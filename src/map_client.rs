// Geocoding and routing collaborators used by the route planner
// Nominatim resolves free-text places, OSRM returns candidate routes. Both sit
// behind traits so the planner can be driven by in-process fakes in tests

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org/route/v1";
pub const DEFAULT_USER_AGENT: &str = "trip-planner-rust";

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        MapError::InvalidResponse(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub nominatim_url: String,
    pub osrm_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub position: Coordinate,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TravelMode {
    #[default]
    Driving,
    Cycling,
    Walking,
}

impl TravelMode {
    // OSRM profile segment of the route URL
    pub fn profile(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Cycling => "cycling",
            TravelMode::Walking => "walking",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile())
    }
}

impl FromStr for TravelMode {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "cycling" => Ok(TravelMode::Cycling),
            "walking" => Ok(TravelMode::Walking),
            other => Err(MapError::ClientError(format!("Unknown travel mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateRoute {
    // Meters
    pub distance: f64,
    // Seconds
    pub duration: f64,
    // GeoJSON geometry, passed through untouched for drawing
    #[serde(default)]
    pub geometry: serde_json::Value,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    // At most one place per query; Ok(None) when nothing matched
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, MapError>;
}

#[async_trait]
pub trait RouteService: Send + Sync {
    async fn routes(
        &self,
        points: &[Coordinate],
        mode: TravelMode,
        alternatives: bool,
    ) -> Result<Vec<CandidateRoute>, MapError>;
}

fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, MapError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| MapError::ClientError(e.to_string()))
}

fn map_transport_error(e: reqwest::Error, timeout_ms: u64) -> MapError {
    if e.is_timeout() {
        MapError::Timeout(timeout_ms)
    } else {
        MapError::NetworkError(e.to_string())
    }
}

pub struct NominatimClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl NominatimClient {
    pub fn new(config: ClientConfig) -> Result<Self, MapError> {
        Ok(Self {
            http: build_http_client(&config)?,
            config,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Reads the first result of a Nominatim `format=json` search.
pub fn parse_nominatim(body: &str) -> Result<Option<GeocodedPlace>, MapError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)?;
    let Some(first) = places.into_iter().next() else {
        return Ok(None);
    };

    let lat = first
        .lat
        .trim()
        .parse::<f64>()
        .map_err(|_| MapError::InvalidResponse(format!("Invalid latitude: {:?}", first.lat)))?;
    let lon = first
        .lon
        .trim()
        .parse::<f64>()
        .map_err(|_| MapError::InvalidResponse(format!("Invalid longitude: {:?}", first.lon)))?;

    Ok(Some(GeocodedPlace {
        position: Coordinate { lat, lon },
        label: first.display_name,
    }))
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, MapError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        debug!(query, "Geocoding");
        let response = self
            .http
            .get(&self.config.nominatim_url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("addressdetails", "1"),
                ("limit", "1"),
            ])
            .header(ACCEPT_LANGUAGE, self.config.accept_language.as_str())
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::ApiResponseError {
                status_code: status.as_u16(),
                message: "Geocoding failed".to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout_ms))?;
        parse_nominatim(&body)
    }
}

pub struct OsrmClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OsrmClient {
    pub fn new(config: ClientConfig) -> Result<Self, MapError> {
        Ok(Self {
            http: build_http_client(&config)?,
            config,
        })
    }

    // `{base}/{profile}/{lon},{lat};{lon},{lat}...`
    pub fn route_url(&self, points: &[Coordinate], mode: TravelMode) -> String {
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{},{}", p.lon, p.lat))
            .collect();
        format!(
            "{}/{}/{}",
            self.config.osrm_url.trim_end_matches('/'),
            mode.profile(),
            coords.join(";")
        )
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<CandidateRoute>,
}

/// Parses an OSRM route response. A non-"Ok" code is an error; a missing
/// route list is an empty one.
pub fn parse_osrm(body: &str) -> Result<Vec<CandidateRoute>, MapError> {
    let response: OsrmResponse = serde_json::from_str(body)?;
    match response.code.as_deref() {
        None | Some("Ok") => Ok(response.routes),
        Some(code) => Err(MapError::InvalidResponse(format!(
            "OSRM error: {} - {}",
            code,
            response.message.unwrap_or_else(|| "No message".to_string())
        ))),
    }
}

#[async_trait]
impl RouteService for OsrmClient {
    async fn routes(
        &self,
        points: &[Coordinate],
        mode: TravelMode,
        alternatives: bool,
    ) -> Result<Vec<CandidateRoute>, MapError> {
        if points.len() < 2 {
            return Err(MapError::ClientError(
                "At least two points are needed for a route".to_string(),
            ));
        }

        let mut params = vec![
            ("overview", "full"),
            ("geometries", "geojson"),
            ("steps", "false"),
            ("annotations", "false"),
        ];
        if alternatives {
            params.push(("alternatives", "true"));
        }

        let url = self.route_url(points, mode);
        debug!(%url, "Requesting routes");
        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout_ms))?;
        if !status.is_success() {
            return Err(MapError::ApiResponseError {
                status_code: status.as_u16(),
                message: format!("Routing failed: {}", body),
            });
        }

        parse_osrm(&body)
    }
}

// In-process collaborators for planner tests
#[cfg(test)]
pub mod mock_services {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockGeocoder {
        places: HashMap<String, Coordinate>,
        failing: Vec<String>,
        pub call_count: AtomicUsize,
    }

    impl MockGeocoder {
        pub fn new() -> Self {
            Self::default()
        }

        // Matching ignores case, like the real service
        pub fn with_place(mut self, query: &str, lat: f64, lon: f64) -> Self {
            self.places
                .insert(query.to_lowercase(), Coordinate { lat, lon });
            self
        }

        pub fn failing_on(mut self, query: &str) -> Self {
            self.failing.push(query.to_lowercase());
            self
        }
    }

    #[async_trait]
    impl Geocoder for MockGeocoder {
        async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, MapError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let key = query.trim().to_lowercase();
            if self.failing.contains(&key) {
                return Err(MapError::ApiResponseError {
                    status_code: 503,
                    message: "Geocoding failed".to_string(),
                });
            }
            Ok(self.places.get(&key).map(|position| GeocodedPlace {
                position: *position,
                label: format!("{} (resolved)", query.trim()),
            }))
        }
    }

    pub struct MockRouter {
        routes: Vec<CandidateRoute>,
        fail: bool,
        pub requests: Mutex<Vec<(Vec<Coordinate>, TravelMode, bool)>>,
    }

    impl MockRouter {
        pub fn with_routes(routes: Vec<CandidateRoute>) -> Self {
            Self {
                routes,
                fail: false,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                routes: Vec::new(),
                fail: true,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RouteService for MockRouter {
        async fn routes(
            &self,
            points: &[Coordinate],
            mode: TravelMode,
            alternatives: bool,
        ) -> Result<Vec<CandidateRoute>, MapError> {
            self.requests
                .lock()
                .unwrap()
                .push((points.to_vec(), mode, alternatives));
            if self.fail {
                return Err(MapError::NetworkError("connection reset".to_string()));
            }
            Ok(self.routes.clone())
        }
    }

    pub fn route(distance: f64, duration: f64) -> CandidateRoute {
        CandidateRoute {
            distance,
            duration,
            geometry: serde_json::json!({
                "type": "LineString",
                "coordinates": [[73.8, 15.4], [74.1, 15.6]]
            }),
        }
    }
}
