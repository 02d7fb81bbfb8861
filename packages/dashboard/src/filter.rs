//! Spatial filter engine.
//!
//! A pure predicate over the active dataset: every threshold or scope
//! change recomputes the full filtered set from scratch (dataset sizes
//! make incremental updates unnecessary). The output couples the
//! surviving segments with the style scale of the active scope, so the
//! render surface gets both the features and their styling in one
//! layer value.

use shade_map_classify::{StreetStyle, StyleScale, street_style};
use shade_map_street_models::{StreetAttributes, StreetSegment};

use crate::state::{FilterThresholds, SentinelPolicy};

/// The filtered feature set for the active scope, ready to render.
#[derive(Debug, Clone)]
pub struct FilteredLayer {
    /// Segments passing the current thresholds.
    pub segments: Vec<StreetSegment>,
    /// Style scale bound to the active scope.
    pub scale: StyleScale,
}

impl FilteredLayer {
    /// Line style for one of this layer's segments.
    #[must_use]
    pub fn style_of(&self, segment: &StreetSegment) -> StreetStyle {
        street_style(&segment.attributes, self.scale)
    }
}

/// Whether a segment passes the current thresholds.
///
/// Both comparisons are inclusive: a segment exactly at a threshold is
/// retained.
#[must_use]
pub fn keeps(
    attrs: &StreetAttributes,
    thresholds: FilterThresholds,
    policy: SentinelPolicy,
) -> bool {
    if attrs.avg_exposure * 100.0 < thresholds.shade_min_percent {
        return false;
    }
    match policy {
        SentinelPolicy::Include => {
            attrs.comfort_index.unwrap_or(0.0) >= thresholds.comfort_min
        }
        SentinelPolicy::Exclude => attrs
            .comfort_index
            .is_some_and(|comfort| comfort >= thresholds.comfort_min),
    }
}

/// Applies the thresholds to a dataset, producing the layer for the
/// given scale. The input is never mutated.
#[must_use]
pub fn apply(
    segments: &[StreetSegment],
    thresholds: FilterThresholds,
    policy: SentinelPolicy,
    scale: StyleScale,
) -> FilteredLayer {
    let kept: Vec<StreetSegment> = segments
        .iter()
        .filter(|seg| keeps(&seg.attributes, thresholds, policy))
        .cloned()
        .collect();

    log::debug!(
        "Filter kept {}/{} segments (shade >= {}%, comfort >= {})",
        kept.len(),
        segments.len(),
        thresholds.shade_min_percent,
        thresholds.comfort_min
    );

    FilteredLayer {
        segments: kept,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_map_street_models::IntensityBin;

    fn segment(exposure: f64, comfort: Option<f64>) -> StreetSegment {
        StreetSegment {
            geometry: geojson::Geometry::new(geojson::Value::LineString(vec![
                vec![0.0, 0.0],
                vec![1.0, 1.0],
            ])),
            attributes: StreetAttributes {
                avg_exposure: exposure,
                comfort_index: comfort,
                intensity_bin: IntensityBin::Bin4,
                final_score: Some(0.8),
                ..StreetAttributes::default()
            },
        }
    }

    fn thresholds(shade: f64, comfort: f64) -> FilterThresholds {
        FilterThresholds {
            shade_min_percent: shade,
            comfort_min: comfort,
        }
    }

    #[test]
    fn shade_boundary_is_inclusive() {
        let t = thresholds(42.0, 0.0);
        assert!(keeps(
            &segment(0.42, Some(30.0)).attributes,
            t,
            SentinelPolicy::Include
        ));
        assert!(!keeps(
            &segment(0.41, Some(30.0)).attributes,
            t,
            SentinelPolicy::Include
        ));
    }

    #[test]
    fn comfort_boundary_is_inclusive() {
        let t = thresholds(0.0, 30.0);
        assert!(keeps(
            &segment(1.0, Some(30.0)).attributes,
            t,
            SentinelPolicy::Include
        ));
        assert!(!keeps(
            &segment(1.0, Some(29.9)).attributes,
            t,
            SentinelPolicy::Include
        ));
    }

    #[test]
    fn sentinel_policy_include_passes_default_threshold() {
        let unmeasured = segment(1.0, None);
        assert!(keeps(
            &unmeasured.attributes,
            thresholds(0.0, 0.0),
            SentinelPolicy::Include
        ));
        // Any positive comfort threshold excludes the sentinel even
        // under Include, since it participates as 0.0.
        assert!(!keeps(
            &unmeasured.attributes,
            thresholds(0.0, 1.0),
            SentinelPolicy::Include
        ));
    }

    #[test]
    fn sentinel_policy_exclude_drops_unmeasured() {
        let unmeasured = segment(1.0, None);
        assert!(!keeps(
            &unmeasured.attributes,
            thresholds(0.0, 0.0),
            SentinelPolicy::Exclude
        ));
        assert!(keeps(
            &segment(1.0, Some(0.0)).attributes,
            thresholds(0.0, 0.0),
            SentinelPolicy::Exclude
        ));
    }

    #[test]
    fn filtering_is_idempotent_and_non_mutating() {
        let dataset = vec![
            segment(0.9, Some(35.0)),
            segment(0.1, Some(35.0)),
            segment(0.9, None),
        ];
        let before = dataset.clone();
        let t = thresholds(50.0, 0.0);

        let first = apply(&dataset, t, SentinelPolicy::Include, StyleScale::City);
        let second = apply(&first.segments, t, SentinelPolicy::Include, StyleScale::City);

        assert_eq!(dataset, before, "source dataset must not be mutated");
        assert_eq!(first.segments, second.segments);
        assert_eq!(first.segments.len(), 2);
    }

    #[test]
    fn layer_styles_follow_its_scale() {
        let seg = segment(1.0, Some(30.0));
        let city = apply(
            std::slice::from_ref(&seg),
            thresholds(0.0, 0.0),
            SentinelPolicy::Include,
            StyleScale::City,
        );
        assert_eq!(city.style_of(&seg).weight, 3);

        let neighborhood = apply(
            std::slice::from_ref(&seg),
            thresholds(0.0, 0.0),
            SentinelPolicy::Include,
            StyleScale::Neighborhood,
        );
        assert_eq!(neighborhood.style_of(&seg).weight, 7);
        assert_eq!(neighborhood.style_of(&seg).color, "#FF6200");
    }
}
