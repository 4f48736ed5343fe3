// Route planner: geocode the stops, fetch candidate routes, keep the best one
// The planner owns the map view (markers and the drawn route). A failed plan
// leaves the view empty rather than half drawn

use futures::future::join_all;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::format::{format_duration, format_km};
use crate::map_client::{
    CandidateRoute, ClientConfig, Coordinate, Geocoder, MapError, NominatimClient, OsrmClient,
    RouteService, TravelMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optimize {
    #[default]
    Fastest,
    Shortest,
}

#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub origin: String,
    // Comma-separated place names
    pub waypoints: String,
    pub destination: String,
    pub mode: TravelMode,
    pub optimize: Optimize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinate,
    // The query text the user typed for this stop
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_km: String,
    pub duration: String,
    pub mode: TravelMode,
    // Whole rupees
    pub estimated_cost: i64,
}

impl RouteSummary {
    pub fn from_route(route: &CandidateRoute, mode: TravelMode) -> Self {
        Self {
            distance_km: format_km(route.distance),
            duration: format_duration(route.duration),
            mode,
            estimated_cost: estimate_cost(route.distance, mode),
        }
    }

    pub fn stats_line(&self) -> String {
        format!(
            "Distance: {} km | Time: {} | Mode: {} | Est. Cost: ₹{}",
            self.distance_km, self.duration, self.mode, self.estimated_cost
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub markers: Vec<Marker>,
    pub route: CandidateRoute,
    pub summary: RouteSummary,
}

// Display strings double as the status line shown to the user
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Please provide both origin and destination")]
    MissingEndpoints,

    #[error("Could not geocode locations. Try more specific names.")]
    NotEnoughLocations,

    #[error("Planning failed. Please adjust inputs and try again.")]
    Failed(#[source] MapError),
}

#[derive(Debug, Default)]
struct MapView {
    markers: Vec<Marker>,
    route: Option<CandidateRoute>,
}

pub struct RoutePlanner<G, R> {
    geocoder: G,
    router: R,
    view: Mutex<MapView>,
}

impl RoutePlanner<NominatimClient, OsrmClient> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, MapError> {
        Ok(Self::new(
            NominatimClient::new(config.clone())?,
            OsrmClient::new(config.clone())?,
        ))
    }
}

impl<G: Geocoder, R: RouteService> RoutePlanner<G, R> {
    pub fn new(geocoder: G, router: R) -> Self {
        Self {
            geocoder,
            router,
            view: Mutex::new(MapView::default()),
        }
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.view.lock().markers.clone()
    }

    pub fn route(&self) -> Option<CandidateRoute> {
        self.view.lock().route.clone()
    }

    pub fn clear(&self) {
        let mut view = self.view.lock();
        view.markers.clear();
        view.route = None;
    }

    /// Plans a route through origin, waypoints and destination.
    ///
    /// The view is cleared first. All stops are geocoded concurrently and
    /// stops that cannot be found are skipped; at least two must resolve.
    /// Any collaborator error fails the whole plan and clears the view.
    pub async fn plan(&self, request: &PlanRequest) -> Result<RoutePlan, PlanError> {
        self.clear();

        let result = self.plan_route(request).await;
        match &result {
            Ok(plan) => info!(
                stops = plan.markers.len(),
                mode = %plan.summary.mode,
                distance_km = %plan.summary.distance_km,
                "Route planned"
            ),
            Err(e) => {
                warn!(error = %e, cause = ?std::error::Error::source(e), "Route planning failed");
                self.clear();
            }
        }
        result
    }

    async fn plan_route(&self, request: &PlanRequest) -> Result<RoutePlan, PlanError> {
        let origin = request.origin.trim();
        let destination = request.destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(PlanError::MissingEndpoints);
        }

        let mut queries = vec![origin.to_string()];
        queries.extend(split_waypoints(&request.waypoints));
        queries.push(destination.to_string());

        let lookups = join_all(queries.iter().map(|q| self.geocoder.geocode(q))).await;

        let mut markers = Vec::with_capacity(queries.len());
        for (query, lookup) in queries.into_iter().zip(lookups) {
            if let Some(place) = lookup.map_err(PlanError::Failed)? {
                markers.push(Marker {
                    position: place.position,
                    label: query,
                });
            }
        }

        if markers.len() < 2 {
            return Err(PlanError::NotEnoughLocations);
        }
        self.view.lock().markers = markers.clone();

        let points: Vec<Coordinate> = markers.iter().map(|m| m.position).collect();
        let candidates = self
            .router
            .routes(&points, request.mode, request.optimize == Optimize::Shortest)
            .await
            .map_err(PlanError::Failed)?;

        let route = select_route(candidates, request.optimize).ok_or_else(|| {
            PlanError::Failed(MapError::InvalidResponse("No route found".to_string()))
        })?;
        self.view.lock().route = Some(route.clone());

        Ok(RoutePlan {
            summary: RouteSummary::from_route(&route, request.mode),
            markers,
            route,
        })
    }
}

pub fn split_waypoints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Minimum distance for Shortest, minimum duration for Fastest; ties keep the earlier route
pub fn select_route(routes: Vec<CandidateRoute>, optimize: Optimize) -> Option<CandidateRoute> {
    routes.into_iter().reduce(|best, candidate| {
        let better = match optimize {
            Optimize::Shortest => candidate.distance < best.distance,
            Optimize::Fastest => candidate.duration < best.duration,
        };
        if better {
            candidate
        } else {
            best
        }
    })
}

/// Rough trip cost in rupees. Driving assumes ~7 INR/km of fuel plus a
/// toll allowance, cycling a rental proxy, walking is free.
pub fn estimate_cost(meters: f64, mode: TravelMode) -> i64 {
    let km = meters / 1000.0;
    match mode {
        TravelMode::Driving => {
            let toll = if km > 150.0 { 200.0 } else { 50.0 };
            (km * 7.0 + toll).round() as i64
        }
        TravelMode::Cycling => (km * 1.5).round() as i64,
        TravelMode::Walking => 0,
    }
}
