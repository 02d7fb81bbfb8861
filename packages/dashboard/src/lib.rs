#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard state, spatial filter engine, and scope resolver.
//!
//! This crate is the decision core of the shade map: it owns the live
//! user-controlled state (thresholds, active scope, cluster toggle),
//! filters the active street dataset against that state, and drives the
//! rendering and chart collaborators at defined transition boundaries.
//! All state lives in one owned [`Dashboard`] value and every mutation
//! goes through a named transition, so the whole pipeline unit-tests
//! without a live map.

mod dashboard;
pub mod filter;
pub mod render;
pub mod scope;
pub mod state;

pub use dashboard::Dashboard;

use thiserror::Error;

/// Errors surfaced by dashboard transitions.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A dataset fetch or parse failed. Fatal to the affected view; no
    /// automatic retry.
    #[error("Data load failure: {0}")]
    DataLoad(#[from] shade_map_datasets::DatasetError),

    /// The geocoding request itself failed (distinct from a successful
    /// search with no match).
    #[error("Geocoding failure: {0}")]
    Geocode(#[from] shade_map_geocoder::GeocodeError),

    /// A selection referenced a neighborhood the loaded table does not
    /// contain.
    #[error("Unknown neighborhood: {code}")]
    UnknownNeighborhood {
        /// The unresolvable code or index.
        code: String,
    },
}
