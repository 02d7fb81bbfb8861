#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text place search for the map search box.
//!
//! Wraps the Nominatim / `OpenStreetMap` search API. The dashboard only
//! consumes the first match: a successful search either yields one
//! coordinate to fit the viewport to, or "no match", which is a
//! recoverable user-visible notice, not an error.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum
//! on the public instance.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use thiserror::Error;

/// Default public Nominatim endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Errors that can occur during a place search.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },

    /// The service rejected the request for exceeding its rate limit.
    #[error("Rate limited by geocoding service")]
    RateLimited,
}

/// First matching place for a free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Display name of the match, when the service provides one.
    pub display_name: Option<String>,
}

/// A free-text search service. `Ok(None)` means "no match" and leaves
/// dashboard state unchanged.
#[async_trait]
pub trait GeocodeService: Send + Sync {
    /// Searches for the first place matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing
    /// fails.
    async fn search(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}

/// Nominatim-backed search client.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Creates a client against the given endpoint (see
    /// [`DEFAULT_BASE_URL`]).
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl GeocodeService for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        log::debug!("Geocoding query '{query}'");
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim JSON response, taking the first result.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let longitude = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some(GeocodedPlace {
        latitude,
        longitude,
        display_name: first["display_name"].as_str().map(String::from),
    }))
}
