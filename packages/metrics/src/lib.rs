#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived-metrics projection for a selected street segment.
//!
//! Computes the structured payload consumed by the detail panel and the
//! chart collaborators: categorical levels, the hourly sun-exposure bar
//! series, the age-band proportions, the origin-neighborhood breakdown,
//! and the comfort-gauge reading. The projection is pure given the
//! segment attributes and the neighborhood lookup table; all drawing is
//! delegated to chart-sink collaborators.

pub mod gauge;
pub mod hourly;
pub mod origin;

use serde::Serialize;
use shade_map_classify::{FlowLevel, RiskLevel, ShadeLevel};
use shade_map_street_models::{NeighborhoodTable, StreetAttributes};

pub use gauge::GaugeReading;
pub use hourly::SunExposureBar;
pub use origin::OriginShare;

/// One age band of the estimated pedestrian age distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBand {
    /// Band label (`"<15"` or `">65"`).
    pub label: &'static str,
    /// Share in `[0, 100]`; `None` when the source has no estimate for
    /// this band (an exact `0` is the band's no-data sentinel).
    pub percent: Option<f64>,
}

impl AgeBand {
    /// Display text for the proportion bar tick label.
    #[must_use]
    pub fn display(&self) -> String {
        self.percent.map_or_else(
            || format!("{}: no data", self.label),
            |pct| format!("{}: {pct:.2}%", self.label),
        )
    }
}

/// Presentation payload for one selected segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentMetrics {
    /// Street display name.
    pub name: String,
    /// Heat-risk classification.
    pub risk: RiskLevel,
    /// Foot-traffic classification.
    pub flow: FlowLevel,
    /// Shade-coverage classification.
    pub shade: ShadeLevel,
    /// Raw combined score, for the headline next to the risk level.
    pub final_score: Option<f64>,
    /// Hourly sun-exposure bar series (23 half-hour slots).
    pub sun_exposure: Vec<SunExposureBar>,
    /// Age distribution: `<15` then `>65`.
    pub age_bands: [AgeBand; 2],
    /// Origin-neighborhood breakdown, descending by share; `None` when
    /// the segment carries no origin data.
    pub origin: Option<Vec<OriginShare>>,
    /// Comfort-gauge reading; `None` when no comfort measurement
    /// exists, rendering the gauge in its no-data state.
    pub gauge: Option<GaugeReading>,
}

/// Projects a segment's attributes into the detail-panel payload.
#[must_use]
pub fn project(attrs: &StreetAttributes, neighborhoods: &NeighborhoodTable) -> SegmentMetrics {
    SegmentMetrics {
        name: attrs.display_name().to_string(),
        risk: shade_map_classify::risk_level(attrs),
        flow: shade_map_classify::flow_level(attrs),
        shade: shade_map_classify::shade_level(attrs),
        final_score: attrs.final_score,
        sun_exposure: hourly::sun_exposure_series(&attrs.hourly_shade),
        age_bands: age_distribution(attrs),
        origin: origin::origin_breakdown(attrs, neighborhoods),
        gauge: gauge::comfort_gauge(attrs.comfort_index),
    }
}

/// Age-band proportions, with exact-zero mapped to the band's no-data
/// state.
#[must_use]
pub fn age_distribution(attrs: &StreetAttributes) -> [AgeBand; 2] {
    let band = |label, percent: f64| AgeBand {
        label,
        percent: (percent != 0.0).then_some(percent),
    };
    [
        band("<15", attrs.young_pop_pct),
        band(">65", attrs.old_pop_pct),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_map_street_models::IntensityBin;

    #[test]
    fn zero_age_band_is_no_data() {
        let attrs = StreetAttributes {
            young_pop_pct: 12.345,
            old_pop_pct: 0.0,
            ..StreetAttributes::default()
        };
        let [young, old] = age_distribution(&attrs);
        assert_eq!(young.display(), "<15: 12.35%");
        assert_eq!(old.display(), ">65: no data");
        assert!(old.percent.is_none());
    }

    #[test]
    fn projects_full_payload() {
        let attrs = StreetAttributes {
            final_score: Some(0.8),
            intensity_bin: IntensityBin::Bin4,
            comfort_index: Some(38.5),
            shade_sum_adjust: 13.0,
            name: Some("Damrak".into()),
            ..StreetAttributes::default()
        };
        let metrics = project(&attrs, &NeighborhoodTable::default());

        assert_eq!(metrics.name, "Damrak");
        assert_eq!(metrics.risk, RiskLevel::High);
        assert_eq!(metrics.flow, FlowLevel::High);
        assert_eq!(metrics.shade, ShadeLevel::Insufficient);
        assert_eq!(metrics.sun_exposure.len(), 23);
        assert!(metrics.origin.is_none());
        assert!((metrics.gauge.unwrap().value - 38.5).abs() < f64::EPSILON);
    }

    #[test]
    fn sentinel_comfort_yields_no_data_gauge_and_risk() {
        let attrs = StreetAttributes {
            final_score: Some(0.9),
            comfort_index: None,
            ..StreetAttributes::default()
        };
        let metrics = project(&attrs, &NeighborhoodTable::default());
        assert_eq!(metrics.risk, RiskLevel::NoData);
        assert!(metrics.gauge.is_none());
    }
}
