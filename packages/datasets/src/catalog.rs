//! Dataset catalog: where each `GeoJSON` dataset lives.
//!
//! The catalog is a TOML document naming the neighborhood, city-street,
//! and cluster datasets plus a `{code}` path template for per-neighborhood
//! street subsets. A default catalog is embedded at compile time; a
//! deployment can override it with its own file.

use serde::Deserialize;

use crate::DatasetError;

/// Embedded default catalog.
const DEFAULT_CATALOG: &str = include_str!("../catalog/default.toml");

/// Relative paths (or URL suffixes) for every dataset the dashboard
/// consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetCatalog {
    /// Neighborhood boundary polygons.
    pub neighborhoods: String,
    /// City-wide street network with precomputed attributes.
    pub city_streets: String,
    /// Cluster overlay polygons.
    pub clusters: String,
    /// Path template for one neighborhood's street subset; must contain
    /// the `{code}` placeholder.
    pub neighborhood_streets: String,
}

impl DatasetCatalog {
    /// Returns the embedded default catalog.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. Since it is a
    /// compile-time constant, a parse failure indicates a development
    /// error and is caught by the tests.
    #[must_use]
    pub fn default_catalog() -> Self {
        toml::de::from_str(DEFAULT_CATALOG).expect("Failed to parse embedded default catalog")
    }

    /// Parses a catalog from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Catalog`] if the TOML is malformed, or
    /// [`DatasetError::Schema`] if the neighborhood template lacks the
    /// `{code}` placeholder.
    pub fn from_toml(content: &str) -> Result<Self, DatasetError> {
        let catalog: Self = toml::de::from_str(content)?;
        if !catalog.neighborhood_streets.contains("{code}") {
            return Err(DatasetError::Schema {
                message: format!(
                    "neighborhood_streets template '{}' is missing the {{code}} placeholder",
                    catalog.neighborhood_streets
                ),
            });
        }
        Ok(catalog)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be read or parsed.
    pub fn from_path(path: &std::path::Path) -> Result<Self, DatasetError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Resolves the street-subset path for one neighborhood code.
    #[must_use]
    pub fn neighborhood_streets_path(&self, code: &str) -> String {
        self.neighborhood_streets.replace("{code}", code)
    }
}
