#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset catalog, `GeoJSON` normalization, and street data stores.
//!
//! All attribute data is precomputed and static per load: the full
//! city-wide street network, the neighborhood boundary set, and the
//! cluster overlay load once at startup (sequential, each awaited);
//! per-neighborhood street subsets load on demand and are cached for
//! the session, never invalidated.

pub mod catalog;
pub mod normalize;
pub mod store;

use shade_map_street_models::{NeighborhoodTable, StreetSegment};
use thiserror::Error;

/// Errors that can occur while loading or parsing a dataset.
///
/// Any variant is fatal to the affected view: there is no automatic
/// retry, the user reloads.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Local file read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP fetch failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog TOML parsing failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] toml::de::Error),

    /// The dataset parsed but did not match the expected schema.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },
}

/// The three datasets loaded before the dashboard becomes interactive.
#[derive(Debug, Clone)]
pub struct InitialData {
    /// Neighborhood boundaries, alphabetically ordered.
    pub neighborhoods: NeighborhoodTable,
    /// Full city-wide street network.
    pub city_segments: Vec<StreetSegment>,
    /// Cluster overlay polygons, passed through to the render surface
    /// untouched.
    pub clusters: geojson::FeatureCollection,
}

/// Loads the initial datasets in order: neighborhoods, city streets,
/// clusters. Each load is awaited before the next begins.
///
/// # Errors
///
/// Returns [`DatasetError`] if any of the three loads fails.
pub async fn load_initial(store: &dyn store::DatasetStore) -> Result<InitialData, DatasetError> {
    let neighborhoods = store.load_neighborhoods().await?;
    log::info!("Loaded {} neighborhoods", neighborhoods.len());

    let city_segments = store.load_city().await?;
    log::info!("Loaded {} city-wide street segments", city_segments.len());

    let clusters = store.load_clusters().await?;
    log::info!("Loaded {} cluster polygons", clusters.features.len());

    Ok(InitialData {
        neighborhoods,
        city_segments,
        clusters,
    })
}
