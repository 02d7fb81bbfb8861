//! Collaborator interfaces for rendering and charts.
//!
//! The dashboard core never draws anything itself: it hands filtered
//! layers, viewport bounds, and metric payloads to these traits at
//! defined transition boundaries. Replace-layer semantics are part of
//! the contract — installing a new street layer retires the previous
//! one, so exactly one street layer is visible at any time.

use shade_map_metrics::SegmentMetrics;
use shade_map_spatial::Bounds;

use crate::filter::FilteredLayer;

/// The map rendering surface (tiles, layers, viewport).
pub trait RenderSurface {
    /// Replaces the active street layer with a freshly filtered one.
    fn replace_street_layer(&mut self, layer: &FilteredLayer);

    /// Fits the viewport to a bounding box.
    fn fit_bounds(&mut self, bounds: Bounds);

    /// Centers the viewport on a point (search results).
    fn fit_point(&mut self, lng: f64, lat: f64);

    /// Highlights one neighborhood outline, or clears the highlight.
    /// The previous highlight is always reset before a new one applies.
    fn set_neighborhood_highlight(&mut self, code: Option<&str>);

    /// Shows or hides the cluster overlay.
    fn set_cluster_overlay(&mut self, clusters: Option<&geojson::FeatureCollection>);

    /// Surfaces a user-visible notice (e.g. "no search results").
    fn notify(&mut self, message: &str);
}

/// Sink for the detail-panel charts. Purely one-way: the charts never
/// feed back into the core.
pub trait ChartSink {
    /// Draws the three fixed charts for a selected segment.
    fn draw(&mut self, metrics: &SegmentMetrics);
}
