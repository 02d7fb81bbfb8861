#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure classification and styling functions for street segments.
//!
//! Every function here is total, deterministic, and side-effect-free:
//! missing or unrecognized attribute values fall back to the lowest /
//! lightest bucket instead of erroring, since partial source data is
//! expected. Map styling and the detail panel both consume these, so
//! the categorical levels and the style parameters live together.

use serde::{Deserialize, Serialize};
use shade_map_street_models::{IntensityBin, StreetAttributes};
use strum_macros::{AsRefStr, Display, EnumString};

/// Pedestrian heat-risk classification of a segment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// No comfort measurement exists for the segment, so no risk
    /// statement can be made regardless of the score.
    NoData,
    Low,
    Medium,
    High,
}

/// Modeled foot-traffic intensity classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowLevel {
    Low,
    Medium,
    High,
}

/// Shade-coverage classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ShadeLevel {
    Sufficient,
    Insufficient,
}

/// Which line-weight scale to style with. The city-wide view uses thin
/// lines (the whole network is visible); a zoomed-in neighborhood view
/// uses wider lines for visual emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleScale {
    City,
    Neighborhood,
}

/// Line style for one rendered segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetStyle {
    /// CSS hex color.
    pub color: &'static str,
    /// Line weight in pixels.
    pub weight: u32,
}

/// Shade-deficit score at or above which a segment is classified as
/// insufficiently shaded.
const SHADE_DEFICIT_THRESHOLD: f64 = 12.0;

/// Classifies a segment's pedestrian heat risk from its combined score.
///
/// A segment without a comfort measurement is [`RiskLevel::NoData`]
/// regardless of its score; a missing score classifies as low.
#[must_use]
pub fn risk_level(attrs: &StreetAttributes) -> RiskLevel {
    if attrs.comfort_index.is_none() {
        return RiskLevel::NoData;
    }
    match attrs.final_score {
        Some(score) if score >= 0.75 => RiskLevel::High,
        Some(score) if score >= 0.5 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Classifies a segment's foot-traffic intensity from its bin.
#[must_use]
pub const fn flow_level(attrs: &StreetAttributes) -> FlowLevel {
    match attrs.intensity_bin {
        IntensityBin::Bin3 | IntensityBin::Bin4 => FlowLevel::High,
        IntensityBin::Bin2 => FlowLevel::Medium,
        IntensityBin::Bin1 => FlowLevel::Low,
    }
}

/// Classifies a segment's shade coverage from its shade-deficit score.
#[must_use]
pub fn shade_level(attrs: &StreetAttributes) -> ShadeLevel {
    if attrs.shade_sum_adjust >= SHADE_DEFICIT_THRESHOLD {
        ShadeLevel::Insufficient
    } else {
        ShadeLevel::Sufficient
    }
}

/// Maps a final score to one of five discrete line colors, monotonic in
/// the score. An absent score renders neutral gray; a genuine zero
/// renders the palest risk hue.
#[must_use]
pub fn street_color(final_score: Option<f64>) -> &'static str {
    match final_score {
        None => "#ddd",
        Some(score) if score >= 0.75 => "#FF6200",
        Some(score) if score >= 0.5 => "#FFA200",
        Some(score) if score > 0.0 => "#FFC300",
        Some(_) => "#F1DDA0",
    }
}

/// Maps an intensity bin to a line weight on the given scale.
///
/// Both scales are monotonic in the bin; the neighborhood scale spans
/// 2..=7 against the city scale's 1..=3.
#[must_use]
pub const fn street_weight(bin: IntensityBin, scale: StyleScale) -> u32 {
    match scale {
        StyleScale::City => match bin {
            IntensityBin::Bin4 => 3,
            IntensityBin::Bin3 => 2,
            IntensityBin::Bin1 | IntensityBin::Bin2 => 1,
        },
        StyleScale::Neighborhood => match bin {
            IntensityBin::Bin4 => 7,
            IntensityBin::Bin3 => 5,
            IntensityBin::Bin2 => 4,
            IntensityBin::Bin1 => 2,
        },
    }
}

/// Complete line style for a segment under the given scale.
#[must_use]
pub fn street_style(attrs: &StreetAttributes, scale: StyleScale) -> StreetStyle {
    StreetStyle {
        color: street_color(attrs.final_score),
        weight: street_weight(attrs.intensity_bin, scale),
    }
}
