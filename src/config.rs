// Runtime configuration, read from TRIP_PLANNER_* environment variables
// Unset variables fall back to defaults; set-but-invalid values are errors

use anyhow::{anyhow, Result};
use std::env;
use std::fmt::{Debug, Display};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::itinerary::{Currency, Trip};
use crate::map_client::{
    ClientConfig, MapError, NominatimClient, OsrmClient, DEFAULT_NOMINATIM_URL, DEFAULT_OSRM_URL,
    DEFAULT_USER_AGENT,
};
use crate::map_planner::RoutePlanner;
use crate::persistence::{TripRepository, STORAGE_KEY};
use crate::storage::FileStore;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub store_dir: PathBuf,
    pub storage_key: String,
    pub nominatim_url: String,
    pub osrm_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_ms: u64,
    pub default_currency: Currency,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".trip_planner"),
            storage_key: STORAGE_KEY.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en".to_string(),
            timeout_ms: 10_000,
            default_currency: Currency::Inr,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Same as `from_env` with an injectable source, so tests need not touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            store_dir: try_load(&lookup, "TRIP_PLANNER_STORE_DIR", defaults.store_dir)?,
            storage_key: try_load(&lookup, "TRIP_PLANNER_STORAGE_KEY", defaults.storage_key)?,
            nominatim_url: try_load(&lookup, "TRIP_PLANNER_NOMINATIM_URL", defaults.nominatim_url)?,
            osrm_url: try_load(&lookup, "TRIP_PLANNER_OSRM_URL", defaults.osrm_url)?,
            user_agent: try_load(&lookup, "TRIP_PLANNER_USER_AGENT", defaults.user_agent)?,
            accept_language: try_load(
                &lookup,
                "TRIP_PLANNER_ACCEPT_LANGUAGE",
                defaults.accept_language,
            )?,
            timeout_ms: try_load(&lookup, "TRIP_PLANNER_TIMEOUT_MS", defaults.timeout_ms)?,
            default_currency: try_load(&lookup, "TRIP_PLANNER_CURRENCY", defaults.default_currency)?,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            nominatim_url: self.nominatim_url.clone(),
            osrm_url: self.osrm_url.clone(),
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
            timeout_ms: self.timeout_ms,
        }
    }

    pub fn repository(&self) -> TripRepository<FileStore> {
        TripRepository::with_key(FileStore::new(&self.store_dir), self.storage_key.clone())
    }

    pub fn route_planner(&self) -> Result<RoutePlanner<NominatimClient, OsrmClient>, MapError> {
        RoutePlanner::from_config(&self.client_config())
    }

    pub fn new_trip(&self) -> Trip {
        Trip::new(1, self.default_currency)
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Debug,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {} value {:?}: {}", key, raw, e)),
        _ => {
            info!("{} not set, using default: {:?}", key, default);
            Ok(default)
        }
    }
}
