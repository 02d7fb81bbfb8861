#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for neighborhood attribution.
//!
//! Builds an R-tree over neighborhood boundary polygons and provides
//! point-in-polygon lookups plus centroid-based cutting of street-segment
//! subsets. Used when a dataset catalog carries no pre-cut per-neighborhood
//! street files, and for viewport-bounds computation on scope changes.

use geo::{BoundingRect, Centroid, Contains, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};
use shade_map_street_models::{Neighborhood, NeighborhoodTable, StreetSegment};

/// A neighborhood polygon stored in the R-tree with its code.
struct BoundaryEntry {
    code: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Geographic bounding box used for viewport fitting, in lng/lat order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Center point of the box as `(lng, lat)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.min_x, self.max_x),
            f64::midpoint(self.min_y, self.max_y),
        )
    }

    /// Smallest box covering both `self` and `other`.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Pre-built R-tree over neighborhood boundaries.
///
/// Constructed once after the neighborhood dataset loads and shared by
/// all consumers; the index never mutates afterwards.
pub struct NeighborhoodIndex {
    tree: RTree<BoundaryEntry>,
}

impl NeighborhoodIndex {
    /// Builds the index from the loaded neighborhood table.
    ///
    /// Neighborhoods whose geometry fails to parse as a polygon are
    /// skipped with a warning rather than aborting the build.
    #[must_use]
    pub fn build(table: &NeighborhoodTable) -> Self {
        let mut entries = Vec::with_capacity(table.len());

        for neighborhood in table {
            let Some(polygon) = to_multi_polygon(&neighborhood.geometry) else {
                log::warn!(
                    "Skipping neighborhood {} with non-polygon geometry",
                    neighborhood.code
                );
                continue;
            };
            let Some(envelope) = polygon_envelope(&polygon) else {
                log::warn!(
                    "Skipping neighborhood {} with empty geometry",
                    neighborhood.code
                );
                continue;
            };
            entries.push(BoundaryEntry {
                code: neighborhood.code.clone(),
                envelope,
                polygon,
            });
        }

        log::info!("Built neighborhood index with {} boundaries", entries.len());
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Looks up the neighborhood code containing a point.
    ///
    /// Neighborhoods tile the city without overlap, so first match wins.
    #[must_use]
    pub fn locate(&self, lng: f64, lat: f64) -> Option<&str> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        for entry in self.tree.locate_in_envelope_intersecting(&query_env) {
            if entry.polygon.contains(&point) {
                return Some(&entry.code);
            }
        }
        None
    }

    /// Cuts the subset of segments whose centroid falls inside the
    /// neighborhood with the given code.
    ///
    /// Segments without a computable centroid are excluded.
    #[must_use]
    pub fn segments_within(&self, code: &str, segments: &[StreetSegment]) -> Vec<StreetSegment> {
        let Some(entry) = self.tree.iter().find(|e| e.code == code) else {
            log::warn!("No indexed boundary for neighborhood {code}");
            return Vec::new();
        };

        segments
            .iter()
            .filter(|seg| {
                segment_centroid(&seg.geometry)
                    .is_some_and(|(lng, lat)| entry.polygon.contains(&geo::Point::new(lng, lat)))
            })
            .cloned()
            .collect()
    }
}

/// Computes the centroid of a segment polyline as `(lng, lat)`.
#[must_use]
pub fn segment_centroid(geometry: &geojson::Geometry) -> Option<(f64, f64)> {
    let geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    geom.centroid().map(|p| (p.x(), p.y()))
}

/// Bounding box of a single geometry.
#[must_use]
pub fn geometry_bounds(geometry: &geojson::Geometry) -> Option<Bounds> {
    let geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    geom.bounding_rect().map(|rect| Bounds {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}

/// Bounding box covering every geometry in the iterator.
///
/// Returns `None` when no geometry yields a bounding rectangle.
#[must_use]
pub fn bounds_of<'a>(geometries: impl IntoIterator<Item = &'a geojson::Geometry>) -> Option<Bounds> {
    geometries
        .into_iter()
        .filter_map(geometry_bounds)
        .reduce(|acc, b| acc.merge(&b))
}

/// Boundary polygon of a single neighborhood, for highlight/bounds use.
#[must_use]
pub fn neighborhood_bounds(neighborhood: &Neighborhood) -> Option<Bounds> {
    geometry_bounds(&neighborhood.geometry)
}

/// Parses a `GeoJSON` geometry into a [`MultiPolygon`], accepting both
/// `Polygon` and `MultiPolygon` types.
fn to_multi_polygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Bounding box envelope for a [`MultiPolygon`].
fn polygon_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect().map(|rect| {
        AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
    })
}
