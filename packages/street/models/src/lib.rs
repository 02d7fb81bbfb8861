#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street segment and neighborhood domain types.
//!
//! Defines the normalized street-segment record (geometry plus precomputed
//! heat-risk attributes) and the neighborhood boundary type shared across
//! the shade map system. Source data overloads `0`/`null` as a "no data"
//! sentinel in several fields; normalization maps those to `Option` so
//! every consumer has to branch on presence before doing arithmetic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Discrete foot-traffic volume category, from a Jenks natural-breaks
/// binning of modeled pedestrian counts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBin {
    /// Lowest modeled foot traffic.
    #[default]
    Bin1,
    Bin2,
    Bin3,
    /// Highest modeled foot traffic.
    Bin4,
}

impl IntensityBin {
    /// Parses a source property value (`"bin_1"` .. `"bin_4"`).
    ///
    /// Unknown or missing values fall back to [`Self::Bin1`] so that
    /// downstream styling always has a defined bucket.
    #[must_use]
    pub fn from_source_key(key: Option<&str>) -> Self {
        match key {
            Some("bin_2") => Self::Bin2,
            Some("bin_3") => Self::Bin3,
            Some("bin_4") => Self::Bin4,
            _ => Self::Bin1,
        }
    }

    /// Returns the source property spelling for this bin.
    #[must_use]
    pub const fn as_source_key(self) -> &'static str {
        match self {
            Self::Bin1 => "bin_1",
            Self::Bin2 => "bin_2",
            Self::Bin3 => "bin_3",
            Self::Bin4 => "bin_4",
        }
    }
}

/// One of the 23 fixed half-hour slots between 09:00 and 20:00 for which
/// per-segment shade fractions are precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(u8);

impl TimeSlot {
    /// Number of half-hour slots (09:00 through 20:00 inclusive).
    pub const COUNT: usize = 23;

    /// All slots in chronological order.
    pub const ALL: [Self; Self::COUNT] = {
        let mut slots = [Self(0); Self::COUNT];
        let mut i: u8 = 0;
        while (i as usize) < Self::COUNT {
            slots[i as usize] = Self(i);
            i += 1;
        }
        slots
    };

    /// Creates a slot from its chronological index (0 = 09:00).
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|&i| usize::from(i) < Self::COUNT)
            .map(Self)
    }

    /// Chronological index of this slot (0 = 09:00, 22 = 20:00).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Hour component (9..=20).
    #[must_use]
    pub const fn hour(self) -> u8 {
        9 + self.0 / 2
    }

    /// Minute component (0 or 30).
    #[must_use]
    pub const fn minute(self) -> u8 {
        (self.0 % 2) * 30
    }

    /// Display label, e.g. `"09:30"`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// Source property key, e.g. `"0930"`.
    #[must_use]
    pub fn source_key(self) -> String {
        format!("{:02}{:02}", self.hour(), self.minute())
    }
}

/// Precomputed heat-risk attributes for a single street segment.
///
/// Sentinel conventions from the source data are resolved at
/// normalization time: a raw comfort index of `0` and a raw street name
/// of `"0"` both mean "no data" and arrive here as `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreetAttributes {
    /// Combined pedestrian-risk score in `[0, 1]`. `None` when the
    /// source carries no score for this segment.
    pub final_score: Option<f64>,
    /// Foot-traffic intensity bin.
    pub intensity_bin: IntensityBin,
    /// Thermal comfort index (a perceived-temperature-like score).
    /// `None` is the "no measurement" sentinel, distinct from a genuine
    /// zero reading.
    pub comfort_index: Option<f64>,
    /// Fraction of the segment exposed to direct sun across sampled
    /// daytime hours, in `[0, 1]`.
    pub avg_exposure: f64,
    /// Aggregate shade-deficit score used for the sufficient/insufficient
    /// shade classification.
    pub shade_sum_adjust: f64,
    /// Shaded fraction per half-hour slot, in `[0, 1]`.
    pub hourly_shade: BTreeMap<TimeSlot, f64>,
    /// Share of pedestrians younger than 15, in `[0, 100]`. Exactly `0`
    /// is displayed as "no data" for this band.
    pub young_pop_pct: f64,
    /// Share of pedestrians older than 65, in `[0, 100]`.
    pub old_pop_pct: f64,
    /// Modeled pedestrian counts by origin-neighborhood code. `None`
    /// when the source carries the `"0"` placeholder.
    pub origin_counts: Option<BTreeMap<String, u64>>,
    /// Total modeled pedestrian count for the segment.
    pub total_pop: u64,
    /// Street name, if the source has one.
    pub name: Option<String>,
}

impl StreetAttributes {
    /// Street name with the display fallback for unnamed segments.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed street")
    }
}

/// One street-network feature: a polyline with its precomputed
/// heat-risk attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetSegment {
    /// Segment geometry (`LineString` or `MultiLineString`).
    pub geometry: geojson::Geometry,
    /// Normalized attributes.
    pub attributes: StreetAttributes,
}

/// A neighborhood boundary polygon with its administrative code and
/// display name. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    /// Administrative neighborhood code (e.g. `"BU0363AB"`).
    pub code: String,
    /// Human-readable neighborhood name.
    pub name: String,
    /// Boundary polygon.
    pub geometry: geojson::Geometry,
}

impl Neighborhood {
    /// Short code with the municipality prefix stripped, as shown in
    /// detail panels (e.g. `"BU0363AB"` -> `"AB"`).
    #[must_use]
    pub fn short_code(&self) -> &str {
        self.code.strip_prefix("BU0363").unwrap_or(&self.code)
    }
}

/// Loaded neighborhood set, ordered alphabetically by name for the
/// selection UI, with code-based lookup for origin-breakdown resolution.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodTable {
    neighborhoods: Vec<Neighborhood>,
    by_code: BTreeMap<String, usize>,
}

impl NeighborhoodTable {
    /// Builds the table, sorting alphabetically by name
    /// (case-insensitive).
    #[must_use]
    pub fn new(mut neighborhoods: Vec<Neighborhood>) -> Self {
        neighborhoods.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        let by_code = neighborhoods
            .iter()
            .enumerate()
            .map(|(i, n)| (n.code.clone(), i))
            .collect();
        Self {
            neighborhoods,
            by_code,
        }
    }

    /// Neighborhoods in selection-UI order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Neighborhood> {
        self.neighborhoods.iter()
    }

    /// Neighborhood at the given selection index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Neighborhood> {
        self.neighborhoods.get(index)
    }

    /// Looks up a neighborhood by its administrative code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&Neighborhood> {
        self.by_code.get(code).map(|&i| &self.neighborhoods[i])
    }

    /// Number of loaded neighborhoods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }
}

impl<'a> IntoIterator for &'a NeighborhoodTable {
    type Item = &'a Neighborhood;
    type IntoIter = std::slice::Iter<'a, Neighborhood>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon() -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![4.88, 52.37],
            vec![4.89, 52.37],
            vec![4.89, 52.38],
            vec![4.88, 52.37],
        ]]))
    }

    #[test]
    fn intensity_bin_falls_back_to_lowest() {
        assert_eq!(IntensityBin::from_source_key(Some("bin_4")), IntensityBin::Bin4);
        assert_eq!(IntensityBin::from_source_key(Some("bin_9")), IntensityBin::Bin1);
        assert_eq!(IntensityBin::from_source_key(None), IntensityBin::Bin1);
    }

    #[test]
    fn time_slots_cover_nine_to_twenty() {
        assert_eq!(TimeSlot::ALL.len(), 23);
        assert_eq!(TimeSlot::ALL[0].label(), "09:00");
        assert_eq!(TimeSlot::ALL[1].label(), "09:30");
        assert_eq!(TimeSlot::ALL[22].label(), "20:00");
        assert_eq!(TimeSlot::ALL[5].source_key(), "1130");
        assert!(TimeSlot::from_index(23).is_none());
    }

    #[test]
    fn neighborhood_table_sorts_alphabetically() {
        let table = NeighborhoodTable::new(vec![
            Neighborhood {
                code: "BU0363ZC".into(),
                name: "Zeeburg".into(),
                geometry: polygon(),
            },
            Neighborhood {
                code: "BU0363AB".into(),
                name: "apollobuurt".into(),
                geometry: polygon(),
            },
            Neighborhood {
                code: "BU0363JD".into(),
                name: "Jordaan".into(),
                geometry: polygon(),
            },
        ]);

        let names: Vec<&str> = table.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["apollobuurt", "Jordaan", "Zeeburg"]);
        assert_eq!(table.by_code("BU0363JD").unwrap().name, "Jordaan");
        assert!(table.by_code("BU9999XX").is_none());
    }

    #[test]
    fn short_code_strips_municipality_prefix() {
        let n = Neighborhood {
            code: "BU0363AB".into(),
            name: "Apollobuurt".into(),
            geometry: polygon(),
        };
        assert_eq!(n.short_code(), "AB");
        let other = Neighborhood {
            code: "XX123".into(),
            name: "Other".into(),
            geometry: polygon(),
        };
        assert_eq!(other.short_code(), "XX123");
    }

    #[test]
    fn display_name_falls_back() {
        let attrs = StreetAttributes::default();
        assert_eq!(attrs.display_name(), "Unnamed street");
        let named = StreetAttributes {
            name: Some("Damrak".into()),
            ..StreetAttributes::default()
        };
        assert_eq!(named.display_name(), "Damrak");
    }
}
