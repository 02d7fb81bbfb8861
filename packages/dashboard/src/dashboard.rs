//! The owned dashboard orchestrator.
//!
//! One [`Dashboard`] value holds every piece of live UI state and the
//! loaded datasets. Each user control maps to one transition method;
//! rendering collaborators are invoked only at the end of a completed
//! transition, never interleaved with the decision logic.

use shade_map_classify::StyleScale;
use shade_map_datasets::InitialData;
use shade_map_datasets::store::DatasetStore;
use shade_map_geocoder::GeocodeService;
use shade_map_metrics::SegmentMetrics;
use shade_map_spatial::{NeighborhoodIndex, bounds_of, geometry_bounds};
use shade_map_street_models::{NeighborhoodTable, StreetSegment};

use crate::DashboardError;
use crate::filter::{self, FilteredLayer};
use crate::render::{ChartSink, RenderSurface};
use crate::scope::{Applied, ScopeResolver};
use crate::state::{FilterThresholds, ScopeSelection, SentinelPolicy};

/// The dashboard's single control state plus its loaded datasets.
pub struct Dashboard {
    neighborhoods: NeighborhoodTable,
    city_segments: Vec<StreetSegment>,
    clusters: geojson::FeatureCollection,
    index: NeighborhoodIndex,
    resolver: ScopeResolver,
    thresholds: FilterThresholds,
    sentinel_policy: SentinelPolicy,
    clusters_visible: bool,
}

impl Dashboard {
    /// Builds the dashboard from the initially loaded datasets.
    #[must_use]
    pub fn new(data: InitialData) -> Self {
        let index = NeighborhoodIndex::build(&data.neighborhoods);
        Self {
            neighborhoods: data.neighborhoods,
            city_segments: data.city_segments,
            clusters: data.clusters,
            index,
            resolver: ScopeResolver::new(),
            thresholds: FilterThresholds::default(),
            sentinel_policy: SentinelPolicy::default(),
            clusters_visible: false,
        }
    }

    /// First render: the unfiltered city-wide layer, viewport fit to
    /// the full extent. The UI is interactive from here on.
    pub fn init(&mut self, surface: &mut dyn RenderSurface) {
        self.refresh(surface);
        if let Some(bounds) = self.city_bounds() {
            surface.fit_bounds(bounds);
        }
    }

    /// Loaded neighborhoods in selection-UI order.
    #[must_use]
    pub const fn neighborhoods(&self) -> &NeighborhoodTable {
        &self.neighborhoods
    }

    /// Current scope selection.
    #[must_use]
    pub fn selection(&self) -> ScopeSelection {
        self.resolver.selection()
    }

    /// Current thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> FilterThresholds {
        self.thresholds
    }

    /// Sets the minimum sun-exposure percentage and re-filters.
    pub fn set_shade_threshold(&mut self, percent: f64, surface: &mut dyn RenderSurface) {
        self.thresholds.shade_min_percent = percent.clamp(0.0, 100.0);
        self.refresh(surface);
    }

    /// Sets the minimum comfort index and re-filters.
    pub fn set_comfort_threshold(&mut self, comfort: f64, surface: &mut dyn RenderSurface) {
        self.thresholds.comfort_min = comfort;
        self.refresh(surface);
    }

    /// Changes the sentinel policy for unmeasured segments and
    /// re-filters.
    pub fn set_sentinel_policy(&mut self, policy: SentinelPolicy, surface: &mut dyn RenderSurface) {
        self.sentinel_policy = policy;
        self.refresh(surface);
    }

    /// Selects a neighborhood by code: fetches its street subset,
    /// highlights its outline, fits the viewport to its extent, and
    /// re-filters.
    ///
    /// A selection superseded while its fetch was in flight is a
    /// silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownNeighborhood`] for a code
    /// absent from the loaded table, or [`DashboardError::DataLoad`] if
    /// the subset fetch fails (the scope then reverts to city-wide).
    #[allow(clippy::future_not_send)]
    pub async fn select_neighborhood(
        &mut self,
        code: &str,
        store: &dyn DatasetStore,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), DashboardError> {
        let Some(neighborhood) = self.neighborhoods.by_code(code) else {
            return Err(DashboardError::UnknownNeighborhood {
                code: code.to_string(),
            });
        };
        let boundary = neighborhood.geometry.clone();

        let ticket = self.resolver.begin_select(code);
        match store.load_neighborhood(code).await {
            Ok(segments) => {
                if self.resolver.complete_load(&ticket, segments) == Applied::Stale {
                    return Ok(());
                }
                surface.set_neighborhood_highlight(Some(code));
                if let Some(bounds) = geometry_bounds(&boundary) {
                    surface.fit_bounds(bounds);
                }
                self.refresh(surface);
                Ok(())
            }
            Err(err) => {
                if self.resolver.fail_load(&ticket) == Applied::Current {
                    surface.set_neighborhood_highlight(None);
                    self.refresh(surface);
                }
                Err(err.into())
            }
        }
    }

    /// Selects a neighborhood by its selection-UI index (dropdown).
    ///
    /// # Errors
    ///
    /// Same as [`Self::select_neighborhood`]; an out-of-range index is
    /// an unknown neighborhood.
    #[allow(clippy::future_not_send)]
    pub async fn select_index(
        &mut self,
        index: usize,
        store: &dyn DatasetStore,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), DashboardError> {
        let Some(code) = self.neighborhoods.get(index).map(|n| n.code.clone()) else {
            return Err(DashboardError::UnknownNeighborhood {
                code: format!("#{index}"),
            });
        };
        self.select_neighborhood(&code, store, surface).await
    }

    /// Maps a click on the map to a neighborhood selection. Returns
    /// `false` when the point is outside every neighborhood.
    ///
    /// # Errors
    ///
    /// Same as [`Self::select_neighborhood`].
    #[allow(clippy::future_not_send)]
    pub async fn select_at(
        &mut self,
        lng: f64,
        lat: f64,
        store: &dyn DatasetStore,
        surface: &mut dyn RenderSurface,
    ) -> Result<bool, DashboardError> {
        let Some(code) = self.index.locate(lng, lat).map(String::from) else {
            return Ok(false);
        };
        self.select_neighborhood(&code, store, surface).await?;
        Ok(true)
    }

    /// Resets to city-wide scope: clears the highlight, restores the
    /// full feature set, and fits the viewport to the city extent.
    pub fn reset_to_city(&mut self, surface: &mut dyn RenderSurface) {
        self.resolver.reset_to_city();
        surface.set_neighborhood_highlight(None);
        self.refresh(surface);
        if let Some(bounds) = self.city_bounds() {
            surface.fit_bounds(bounds);
        }
    }

    /// Shows or hides the cluster overlay. Orthogonal to scope and
    /// thresholds.
    pub fn toggle_clusters(&mut self, visible: bool, surface: &mut dyn RenderSurface) {
        self.clusters_visible = visible;
        if visible {
            surface.set_cluster_overlay(Some(&self.clusters));
        } else {
            surface.set_cluster_overlay(None);
        }
    }

    /// Projects the detail-panel payload for a segment of the current
    /// filtered set and hands it to the chart sink.
    ///
    /// Returns `None` while a subset fetch is in flight or for an
    /// out-of-range index.
    pub fn select_segment(
        &self,
        index: usize,
        charts: &mut dyn ChartSink,
    ) -> Option<SegmentMetrics> {
        let layer = self.filtered_layer()?;
        let segment = layer.segments.get(index)?;
        let metrics = shade_map_metrics::project(&segment.attributes, &self.neighborhoods);
        charts.draw(&metrics);
        Some(metrics)
    }

    /// Free-text search: centers the viewport on the first match, or
    /// surfaces a notice and leaves all state unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Geocode`] if the search request
    /// itself fails.
    #[allow(clippy::future_not_send, clippy::unused_self)]
    pub async fn search(
        &self,
        query: &str,
        geocoder: &dyn GeocodeService,
        surface: &mut dyn RenderSurface,
    ) -> Result<bool, DashboardError> {
        match geocoder.search(query).await? {
            Some(place) => {
                surface.fit_point(place.longitude, place.latitude);
                Ok(true)
            }
            None => {
                surface.notify("No matching results found.");
                Ok(false)
            }
        }
    }

    /// The current filtered layer, or `None` while a neighborhood
    /// subset fetch is in flight.
    #[must_use]
    pub fn filtered_layer(&self) -> Option<FilteredLayer> {
        let (segments, scale) = match self.selection() {
            ScopeSelection::City => (self.city_segments.as_slice(), StyleScale::City),
            ScopeSelection::Neighborhood(_) => (
                self.resolver.neighborhood_segments()?,
                StyleScale::Neighborhood,
            ),
        };
        Some(filter::apply(
            segments,
            self.thresholds,
            self.sentinel_policy,
            scale,
        ))
    }

    /// Cuts a neighborhood subset from the city-wide set by segment
    /// centroid. Fallback for catalogs without pre-cut subset files.
    #[must_use]
    pub fn cut_subset(&self, code: &str) -> Vec<StreetSegment> {
        self.index.segments_within(code, &self.city_segments)
    }

    /// Recomputes the filtered set and replaces the rendered street
    /// layer. A no-op while a subset fetch is in flight.
    fn refresh(&mut self, surface: &mut dyn RenderSurface) {
        if let Some(layer) = self.filtered_layer() {
            surface.replace_street_layer(&layer);
        }
    }

    fn city_bounds(&self) -> Option<shade_map_spatial::Bounds> {
        bounds_of(self.city_segments.iter().map(|seg| &seg.geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shade_map_datasets::store::MemoryStore;
    use shade_map_geocoder::{GeocodeError, GeocodedPlace};
    use shade_map_spatial::Bounds;
    use shade_map_street_models::{IntensityBin, Neighborhood, StreetAttributes};

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::LineString(vec![
            vec![x0, y0],
            vec![x1, y1],
        ]))
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![x0, y0],
            vec![x1, y0],
            vec![x1, y1],
            vec![x0, y1],
            vec![x0, y0],
        ]]))
    }

    fn segment(name: &str, exposure: f64, comfort: Option<f64>) -> StreetSegment {
        StreetSegment {
            geometry: line(0.1, 0.1, 0.9, 0.1),
            attributes: StreetAttributes {
                name: Some(name.to_string()),
                avg_exposure: exposure,
                comfort_index: comfort,
                final_score: Some(0.8),
                intensity_bin: IntensityBin::Bin4,
                ..StreetAttributes::default()
            },
        }
    }

    fn empty_clusters() -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        }
    }

    fn initial_data() -> InitialData {
        InitialData {
            neighborhoods: NeighborhoodTable::new(vec![Neighborhood {
                code: "BU0363AB".into(),
                name: "Apollobuurt".into(),
                geometry: square(0.0, 0.0, 1.0, 1.0),
            }]),
            city_segments: vec![
                segment("sunny", 0.9, Some(35.0)),
                segment("shaded", 0.1, Some(35.0)),
                segment("unmeasured", 0.9, None),
            ],
            clusters: empty_clusters(),
        }
    }

    fn store_with_subset() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.subsets.insert(
            "BU0363AB".to_string(),
            vec![segment("local street", 0.9, Some(35.0))],
        );
        store
    }

    /// Recording fake for the render surface.
    #[derive(Default)]
    struct Recording {
        layers: Vec<FilteredLayer>,
        bounds: Vec<Bounds>,
        points: Vec<(f64, f64)>,
        highlights: Vec<Option<String>>,
        cluster_visibility: Vec<bool>,
        notices: Vec<String>,
    }

    impl RenderSurface for Recording {
        fn replace_street_layer(&mut self, layer: &FilteredLayer) {
            self.layers.push(layer.clone());
        }

        fn fit_bounds(&mut self, bounds: Bounds) {
            self.bounds.push(bounds);
        }

        fn fit_point(&mut self, lng: f64, lat: f64) {
            self.points.push((lng, lat));
        }

        fn set_neighborhood_highlight(&mut self, code: Option<&str>) {
            self.highlights.push(code.map(String::from));
        }

        fn set_cluster_overlay(&mut self, clusters: Option<&geojson::FeatureCollection>) {
            self.cluster_visibility.push(clusters.is_some());
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingCharts {
        drawn: Vec<SegmentMetrics>,
    }

    impl ChartSink for RecordingCharts {
        fn draw(&mut self, metrics: &SegmentMetrics) {
            self.drawn.push(metrics.clone());
        }
    }

    struct FixedGeocoder(Option<GeocodedPlace>);

    #[async_trait]
    impl GeocodeService for FixedGeocoder {
        async fn search(&self, _query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn init_renders_full_city_layer_and_fits_bounds() {
        let mut dashboard = Dashboard::new(initial_data());
        let mut surface = Recording::default();
        dashboard.init(&mut surface);

        assert_eq!(surface.layers.len(), 1);
        assert_eq!(surface.layers[0].segments.len(), 3);
        assert_eq!(surface.layers[0].scale, StyleScale::City);
        assert_eq!(surface.bounds.len(), 1);
    }

    #[test]
    fn threshold_changes_refilter_synchronously() {
        let mut dashboard = Dashboard::new(initial_data());
        let mut surface = Recording::default();
        dashboard.init(&mut surface);

        dashboard.set_shade_threshold(50.0, &mut surface);
        let layer = surface.layers.last().unwrap();
        let names: Vec<&str> = layer
            .segments
            .iter()
            .map(|s| s.attributes.display_name())
            .collect();
        assert_eq!(names, ["sunny", "unmeasured"]);

        dashboard.set_comfort_threshold(1.0, &mut surface);
        let layer = surface.layers.last().unwrap();
        assert_eq!(layer.segments.len(), 1, "sentinel excluded by comfort >= 1");

        dashboard.set_sentinel_policy(SentinelPolicy::Exclude, &mut surface);
        dashboard.set_comfort_threshold(0.0, &mut surface);
        let layer = surface.layers.last().unwrap();
        // Shade threshold of 50 still applies; "unmeasured" is now
        // dropped by the Exclude policy even at a zero comfort bound.
        assert_eq!(layer.segments.len(), 1);
        assert_eq!(layer.segments[0].attributes.display_name(), "sunny");
    }

    #[tokio::test]
    async fn neighborhood_selection_switches_dataset_and_scale() {
        let mut dashboard = Dashboard::new(initial_data());
        let store = store_with_subset();
        let mut surface = Recording::default();
        dashboard.init(&mut surface);

        dashboard
            .select_neighborhood("BU0363AB", &store, &mut surface)
            .await
            .unwrap();

        assert_eq!(
            dashboard.selection(),
            ScopeSelection::Neighborhood("BU0363AB".into())
        );
        assert_eq!(surface.highlights.last().unwrap().as_deref(), Some("BU0363AB"));

        let layer = surface.layers.last().unwrap();
        assert_eq!(layer.scale, StyleScale::Neighborhood);
        assert_eq!(layer.segments.len(), 1);
        assert_eq!(layer.style_of(&layer.segments[0]).weight, 7);
    }

    #[tokio::test]
    async fn scope_round_trip_restores_identical_city_set() {
        let mut dashboard = Dashboard::new(initial_data());
        let store = store_with_subset();
        let mut surface = Recording::default();
        dashboard.init(&mut surface);
        let initial = surface.layers[0].segments.clone();

        dashboard
            .select_neighborhood("BU0363AB", &store, &mut surface)
            .await
            .unwrap();
        dashboard.reset_to_city(&mut surface);

        assert_eq!(dashboard.selection(), ScopeSelection::City);
        assert_eq!(surface.highlights.last().unwrap(), &None);
        let restored = &surface.layers.last().unwrap().segments;
        assert_eq!(restored, &initial);
    }

    #[tokio::test]
    async fn unknown_neighborhood_is_an_error() {
        let mut dashboard = Dashboard::new(initial_data());
        let store = MemoryStore::default();
        let mut surface = Recording::default();

        let err = dashboard
            .select_neighborhood("BU9999XX", &store, &mut surface)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownNeighborhood { .. }));
        assert_eq!(dashboard.selection(), ScopeSelection::City);
    }

    #[tokio::test]
    async fn failed_subset_fetch_reverts_to_city() {
        let mut dashboard = Dashboard::new(initial_data());
        // Store without the subset: the fetch fails.
        let store = MemoryStore::default();
        let mut surface = Recording::default();
        dashboard.init(&mut surface);

        let err = dashboard
            .select_neighborhood("BU0363AB", &store, &mut surface)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataLoad(_)));
        assert_eq!(dashboard.selection(), ScopeSelection::City);
        assert_eq!(surface.highlights.last().unwrap(), &None);
    }

    #[tokio::test]
    async fn click_selection_resolves_through_the_index() {
        let mut dashboard = Dashboard::new(initial_data());
        let store = store_with_subset();
        let mut surface = Recording::default();
        dashboard.init(&mut surface);

        let hit = dashboard
            .select_at(0.5, 0.5, &store, &mut surface)
            .await
            .unwrap();
        assert!(hit);
        assert_eq!(store.fetches(), ["BU0363AB"]);

        let miss = dashboard
            .select_at(9.0, 9.0, &store, &mut surface)
            .await
            .unwrap();
        assert!(!miss);
    }

    #[test]
    fn cluster_toggle_is_orthogonal_to_filtering() {
        let mut dashboard = Dashboard::new(initial_data());
        let mut surface = Recording::default();
        dashboard.init(&mut surface);
        let layers_before = surface.layers.len();

        dashboard.toggle_clusters(true, &mut surface);
        dashboard.toggle_clusters(false, &mut surface);

        assert_eq!(surface.cluster_visibility, [true, false]);
        assert_eq!(surface.layers.len(), layers_before);
    }

    #[test]
    fn segment_selection_projects_and_draws() {
        let dashboard = Dashboard::new(initial_data());
        let mut charts = RecordingCharts::default();

        let metrics = dashboard.select_segment(0, &mut charts).unwrap();
        assert_eq!(metrics.name, "sunny");
        assert_eq!(charts.drawn.len(), 1);

        assert!(dashboard.select_segment(99, &mut charts).is_none());
    }

    #[tokio::test]
    async fn search_fits_match_or_notifies() {
        let mut dashboard = Dashboard::new(initial_data());
        let mut surface = Recording::default();

        let found = dashboard
            .search(
                "dam square",
                &FixedGeocoder(Some(GeocodedPlace {
                    latitude: 52.37,
                    longitude: 4.89,
                    display_name: None,
                })),
                &mut surface,
            )
            .await
            .unwrap();
        assert!(found);
        assert_eq!(surface.points, [(4.89, 52.37)]);

        let missed = dashboard
            .search("nowhere", &FixedGeocoder(None), &mut surface)
            .await
            .unwrap();
        assert!(!missed);
        assert_eq!(surface.notices.len(), 1);
        assert_eq!(dashboard.selection(), ScopeSelection::City);
    }

    #[test]
    fn subset_cutting_falls_back_on_the_spatial_index() {
        let dashboard = Dashboard::new(initial_data());
        let cut = dashboard.cut_subset("BU0363AB");
        // All three test segments run through the neighborhood square.
        assert_eq!(cut.len(), 3);
        assert!(dashboard.cut_subset("BU9999XX").is_empty());
    }
}
