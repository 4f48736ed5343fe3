// Main library file for the trip planner

// Itinerary model and the pieces around it
pub mod config;
pub mod destinations;
pub mod export;
pub mod format;
pub mod itinerary;
pub mod logging;
pub mod map_client;
pub mod map_planner;
pub mod persistence;
pub mod storage;
pub mod templates;

// Re-export key types for convenience
pub use config::PlannerConfig;
pub use destinations::{CartTotals, Destination, DestinationCart, DestinationFilter};
pub use export::{render_text, to_xml, ExportError};
pub use itinerary::{recalc_totals, Activity, Currency, Day, Snapshot, Totals, Trip};
pub use map_client::{
    CandidateRoute, ClientConfig, Coordinate, GeocodedPlace, Geocoder, MapError, RouteService,
    TravelMode,
};
pub use map_planner::{Optimize, PlanError, PlanRequest, RoutePlan, RoutePlanner};
pub use persistence::{Notice, PersistenceError, TripRepository, STORAGE_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use templates::{load_template, TEMPLATES};
