//! Street data stores: file-backed, HTTP-backed, and in-memory.
//!
//! A store hands out the initial datasets and the on-demand
//! per-neighborhood street subsets. Subsets are cached for the session
//! once fetched and never invalidated; the underlying fetch is
//! idempotent and read-only, so redundant fetches of the same
//! neighborhood are harmless.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use shade_map_street_models::{NeighborhoodTable, StreetSegment};

use crate::DatasetError;
use crate::catalog::DatasetCatalog;
use crate::normalize::{normalize_neighborhoods, normalize_segments, parse_feature_collection};

/// Source of every dataset the dashboard consumes.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Loads the neighborhood boundary set.
    async fn load_neighborhoods(&self) -> Result<NeighborhoodTable, DatasetError>;

    /// Loads the full city-wide street network.
    async fn load_city(&self) -> Result<Vec<StreetSegment>, DatasetError>;

    /// Loads one neighborhood's street subset.
    async fn load_neighborhood(&self, code: &str) -> Result<Vec<StreetSegment>, DatasetError>;

    /// Loads the cluster overlay polygons.
    async fn load_clusters(&self) -> Result<geojson::FeatureCollection, DatasetError>;
}

/// Session cache of per-neighborhood subsets, keyed by code.
#[derive(Default)]
struct SubsetCache {
    subsets: Mutex<BTreeMap<String, Vec<StreetSegment>>>,
}

impl SubsetCache {
    fn get(&self, code: &str) -> Option<Vec<StreetSegment>> {
        self.subsets
            .lock()
            .expect("subset cache mutex poisoned")
            .get(code)
            .cloned()
    }

    fn insert(&self, code: &str, segments: Vec<StreetSegment>) {
        self.subsets
            .lock()
            .expect("subset cache mutex poisoned")
            .insert(code.to_string(), segments);
    }
}

/// Store reading pre-generated `GeoJSON` files from a local data
/// directory.
pub struct FileStore {
    root: PathBuf,
    catalog: DatasetCatalog,
    cache: SubsetCache,
}

impl FileStore {
    /// Creates a store rooted at `root` using the given catalog.
    #[must_use]
    pub fn new(root: PathBuf, catalog: DatasetCatalog) -> Self {
        Self {
            root,
            catalog,
            cache: SubsetCache::default(),
        }
    }

    fn read(&self, relative: &str) -> Result<String, DatasetError> {
        let path = self.root.join(relative);
        log::debug!("Reading dataset {}", path.display());
        Ok(std::fs::read_to_string(path)?)
    }
}

#[async_trait]
impl DatasetStore for FileStore {
    async fn load_neighborhoods(&self) -> Result<NeighborhoodTable, DatasetError> {
        let collection = parse_feature_collection(&self.read(&self.catalog.neighborhoods)?)?;
        Ok(NeighborhoodTable::new(normalize_neighborhoods(&collection)))
    }

    async fn load_city(&self) -> Result<Vec<StreetSegment>, DatasetError> {
        let collection = parse_feature_collection(&self.read(&self.catalog.city_streets)?)?;
        Ok(normalize_segments(&collection))
    }

    async fn load_neighborhood(&self, code: &str) -> Result<Vec<StreetSegment>, DatasetError> {
        if let Some(cached) = self.cache.get(code) {
            return Ok(cached);
        }
        let relative = self.catalog.neighborhood_streets_path(code);
        let collection = parse_feature_collection(&self.read(&relative)?)?;
        let segments = normalize_segments(&collection);
        self.cache.insert(code, segments.clone());
        Ok(segments)
    }

    async fn load_clusters(&self) -> Result<geojson::FeatureCollection, DatasetError> {
        parse_feature_collection(&self.read(&self.catalog.clusters)?)
    }
}

/// Store fetching `GeoJSON` documents over HTTP from a base URL.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    catalog: DatasetCatalog,
    cache: SubsetCache,
}

impl HttpStore {
    /// Creates a store fetching from `base_url` using the given catalog.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: String, catalog: DatasetCatalog) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            catalog,
            cache: SubsetCache::default(),
        }
    }

    async fn fetch(&self, relative: &str) -> Result<String, DatasetError> {
        let url = format!("{}/{relative}", self.base_url);
        log::debug!("Fetching dataset {url}");
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl DatasetStore for HttpStore {
    async fn load_neighborhoods(&self) -> Result<NeighborhoodTable, DatasetError> {
        let collection = parse_feature_collection(&self.fetch(&self.catalog.neighborhoods).await?)?;
        Ok(NeighborhoodTable::new(normalize_neighborhoods(&collection)))
    }

    async fn load_city(&self) -> Result<Vec<StreetSegment>, DatasetError> {
        let collection = parse_feature_collection(&self.fetch(&self.catalog.city_streets).await?)?;
        Ok(normalize_segments(&collection))
    }

    async fn load_neighborhood(&self, code: &str) -> Result<Vec<StreetSegment>, DatasetError> {
        if let Some(cached) = self.cache.get(code) {
            return Ok(cached);
        }
        let relative = self.catalog.neighborhood_streets_path(code);
        let collection = parse_feature_collection(&self.fetch(&relative).await?)?;
        let segments = normalize_segments(&collection);
        self.cache.insert(code, segments.clone());
        Ok(segments)
    }

    async fn load_clusters(&self) -> Result<geojson::FeatureCollection, DatasetError> {
        parse_feature_collection(&self.fetch(&self.catalog.clusters).await?)
    }
}

/// In-memory store for tests and demos.
///
/// Records every neighborhood fetch so tests can assert on fetch
/// behavior (redundant fetches are allowed but observable).
#[derive(Default)]
pub struct MemoryStore {
    /// Neighborhood boundaries.
    pub neighborhoods: NeighborhoodTable,
    /// City-wide segments.
    pub city_segments: Vec<StreetSegment>,
    /// Per-neighborhood subsets keyed by code.
    pub subsets: BTreeMap<String, Vec<StreetSegment>>,
    /// Cluster overlay.
    pub clusters: Option<geojson::FeatureCollection>,
    fetch_log: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Codes of every neighborhood fetch issued so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the fetch-log mutex is poisoned.
    #[must_use]
    pub fn fetches(&self) -> Vec<String> {
        self.fetch_log
            .lock()
            .expect("fetch log mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl DatasetStore for MemoryStore {
    async fn load_neighborhoods(&self) -> Result<NeighborhoodTable, DatasetError> {
        Ok(self.neighborhoods.clone())
    }

    async fn load_city(&self) -> Result<Vec<StreetSegment>, DatasetError> {
        Ok(self.city_segments.clone())
    }

    async fn load_neighborhood(&self, code: &str) -> Result<Vec<StreetSegment>, DatasetError> {
        self.fetch_log
            .lock()
            .expect("fetch log mutex poisoned")
            .push(code.to_string());
        self.subsets
            .get(code)
            .cloned()
            .ok_or_else(|| DatasetError::Schema {
                message: format!("no street subset for neighborhood {code}"),
            })
    }

    async fn load_clusters(&self) -> Result<geojson::FeatureCollection, DatasetError> {
        self.clusters
            .clone()
            .ok_or_else(|| DatasetError::Schema {
                message: "no cluster dataset".to_string(),
            })
    }
}
