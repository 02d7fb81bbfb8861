//! Normalizes raw `GeoJSON` features into domain types.
//!
//! Source properties overload `0`/`null`/`"0"` as "no data" in several
//! fields; this module is the single place where those sentinels are
//! resolved into `Option`s. Extraction is defensive throughout: a
//! malformed feature is skipped with a warning, a missing attribute
//! falls back to its neutral value, and neither aborts the load.

use std::collections::BTreeMap;

use geojson::JsonObject;
use shade_map_street_models::{
    IntensityBin, Neighborhood, StreetAttributes, StreetSegment, TimeSlot,
};

use crate::DatasetError;

/// Parses a `GeoJSON` document into a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`DatasetError::Json`] if the document is not a valid
/// feature collection.
pub fn parse_feature_collection(content: &str) -> Result<geojson::FeatureCollection, DatasetError> {
    Ok(serde_json::from_str(content)?)
}

/// Normalizes street features into segments.
///
/// Features without geometry are skipped with a warning.
#[must_use]
pub fn normalize_segments(collection: &geojson::FeatureCollection) -> Vec<StreetSegment> {
    let mut segments = Vec::with_capacity(collection.features.len());
    let mut skipped = 0_usize;

    for feature in &collection.features {
        let Some(geometry) = feature.geometry.clone() else {
            skipped += 1;
            continue;
        };
        let empty = JsonObject::new();
        let props = feature.properties.as_ref().unwrap_or(&empty);
        segments.push(StreetSegment {
            geometry,
            attributes: normalize_attributes(props),
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} street features without geometry");
    }
    segments
}

/// Normalizes neighborhood features into boundaries.
///
/// Features missing a code, a name, or geometry are skipped with a
/// warning.
#[must_use]
pub fn normalize_neighborhoods(collection: &geojson::FeatureCollection) -> Vec<Neighborhood> {
    collection
        .features
        .iter()
        .filter_map(|feature| {
            let geometry = feature.geometry.clone()?;
            let props = feature.properties.as_ref()?;
            let code = get_string(props, "CBS_Buurtcode")
                .or_else(|| get_string(props, "Buurtcode"))?;
            let Some(name) = get_string(props, "Buurt") else {
                log::warn!("Skipping neighborhood {code} without a name");
                return None;
            };
            Some(Neighborhood {
                code,
                name,
                geometry,
            })
        })
        .collect()
}

/// Extracts one segment's attributes from raw feature properties,
/// resolving the source's sentinel conventions.
fn normalize_attributes(props: &JsonObject) -> StreetAttributes {
    let mut hourly_shade = BTreeMap::new();
    for slot in TimeSlot::ALL {
        if let Some(fraction) = get_f64(props, &slot.source_key()) {
            hourly_shade.insert(slot, fraction);
        }
    }

    StreetAttributes {
        final_score: get_f64(props, "Final_score_all"),
        intensity_bin: IntensityBin::from_source_key(
            props.get("jenkins_bin").and_then(serde_json::Value::as_str),
        ),
        // A raw comfort index of 0 is the "no measurement" sentinel.
        comfort_index: get_f64(props, "PET").filter(|&pet| pet != 0.0),
        avg_exposure: get_f64(props, "avg_exposure_percent").unwrap_or(0.0),
        shade_sum_adjust: get_f64(props, "sum_adjust").unwrap_or(0.0),
        hourly_shade,
        young_pop_pct: get_f64(props, "young_pop_pct").unwrap_or(0.0),
        old_pop_pct: get_f64(props, "old_pop_pct").unwrap_or(0.0),
        origin_counts: get_origin_counts(props),
        total_pop: props
            .get("pop")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0),
        name: get_string(props, "name").filter(|name| name != "0"),
    }
}

/// Origin-neighborhood counts, or `None` for the `"0"` placeholder and
/// empty objects.
fn get_origin_counts(props: &JsonObject) -> Option<BTreeMap<String, u64>> {
    let counts: BTreeMap<String, u64> = props
        .get("buurtcode")?
        .as_object()?
        .iter()
        .filter_map(|(code, count)| count.as_u64().map(|c| (code.clone(), c)))
        .collect();

    if counts.is_empty() { None } else { Some(counts) }
}

fn get_f64(props: &JsonObject, key: &str) -> Option<f64> {
    props.get(key).and_then(serde_json::Value::as_f64)
}

fn get_string(props: &JsonObject, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(features: serde_json::Value) -> geojson::FeatureCollection {
        serde_json::from_value(serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        }))
        .unwrap()
    }

    #[test]
    fn normalizes_street_sentinels() {
        let fc = collection(serde_json::json!([{
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[4.9, 52.37], [4.91, 52.37]] },
            "properties": {
                "Final_score_all": 0.8,
                "jenkins_bin": "bin_4",
                "PET": 0.0,
                "avg_exposure_percent": 0.42,
                "sum_adjust": 13.5,
                "0900": 0.25,
                "2000": 0.75,
                "young_pop_pct": 12.5,
                "old_pop_pct": 0.0,
                "buurtcode": "0",
                "pop": 200,
                "name": "0"
            }
        }]));

        let segments = normalize_segments(&fc);
        assert_eq!(segments.len(), 1);
        let attrs = &segments[0].attributes;
        assert_eq!(attrs.final_score, Some(0.8));
        assert_eq!(attrs.intensity_bin, IntensityBin::Bin4);
        assert_eq!(attrs.comfort_index, None, "PET 0 is the no-data sentinel");
        assert!(attrs.origin_counts.is_none());
        assert!(attrs.name.is_none());
        assert_eq!(attrs.hourly_shade.len(), 2);
        assert_eq!(
            attrs.hourly_shade.get(&TimeSlot::ALL[0]).copied(),
            Some(0.25)
        );
    }

    #[test]
    fn keeps_genuine_comfort_measurements() {
        let fc = collection(serde_json::json!([{
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] },
            "properties": { "PET": 31.4, "name": "Damrak" }
        }]));

        let attrs = &normalize_segments(&fc)[0].attributes;
        assert_eq!(attrs.comfort_index, Some(31.4));
        assert_eq!(attrs.display_name(), "Damrak");
        assert_eq!(attrs.final_score, None);
    }

    #[test]
    fn skips_features_without_geometry() {
        let fc = collection(serde_json::json!([
            { "type": "Feature", "geometry": null, "properties": {} },
            {
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] },
                "properties": {}
            }
        ]));
        assert_eq!(normalize_segments(&fc).len(), 1);
    }

    #[test]
    fn parses_origin_counts_object() {
        let fc = collection(serde_json::json!([{
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] },
            "properties": {
                "buurtcode": { "BU0363N1": 150, "BU0363N2": 50 },
                "pop": 200
            }
        }]));

        let attrs = &normalize_segments(&fc)[0].attributes;
        let counts = attrs.origin_counts.as_ref().unwrap();
        assert_eq!(counts.get("BU0363N1"), Some(&150));
        assert_eq!(counts.get("BU0363N2"), Some(&50));
        assert_eq!(attrs.total_pop, 200);
    }

    #[test]
    fn normalizes_neighborhoods_with_code_fallback() {
        let fc = collection(serde_json::json!([
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] },
                "properties": { "Buurt": "Jordaan", "CBS_Buurtcode": "BU0363JD" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] },
                "properties": { "Buurt": "Zeeburg", "Buurtcode": "ZB" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] },
                "properties": { "CBS_Buurtcode": "BU0363XX" }
            }
        ]));

        let neighborhoods = normalize_neighborhoods(&fc);
        assert_eq!(neighborhoods.len(), 2);
        assert_eq!(neighborhoods[0].code, "BU0363JD");
        assert_eq!(neighborhoods[1].code, "ZB");
    }
}
