//! Origin-neighborhood breakdown for the detail panel.
//!
//! Converts a segment's modeled pedestrian counts per origin
//! neighborhood into percentages of the segment total, resolves each
//! code to its display name, and orders the entries descending by
//! share. A code absent from the neighborhood table means the datasets
//! are inconsistent: that is a logic error, loud in development and
//! degraded to omitting the entry in production.

use serde::Serialize;
use shade_map_street_models::{NeighborhoodTable, StreetAttributes};

/// One origin neighborhood's share of a segment's pedestrians.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginShare {
    /// Administrative neighborhood code.
    pub code: String,
    /// Resolved display name.
    pub name: String,
    /// Short code shown in parentheses after the name.
    pub short_code: String,
    /// Share of the segment total, in `[0, 100]`.
    pub percent: f64,
}

impl OriginShare {
    /// Display line, e.g. `"75.00% from Jordaan (JD)"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2}% from {} ({})", self.percent, self.name, self.short_code)
    }
}

/// Computes the origin breakdown, descending by share.
///
/// Returns `None` when the segment has no origin data (zero total or
/// absent counts). Entries whose code cannot be resolved against the
/// neighborhood table are dropped after logging.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn origin_breakdown(
    attrs: &StreetAttributes,
    neighborhoods: &NeighborhoodTable,
) -> Option<Vec<OriginShare>> {
    let counts = attrs.origin_counts.as_ref()?;
    if attrs.total_pop == 0 || counts.is_empty() {
        return None;
    }

    let total = attrs.total_pop as f64;
    let mut shares: Vec<OriginShare> = counts
        .iter()
        .filter_map(|(code, &count)| {
            let Some(neighborhood) = neighborhoods.by_code(code) else {
                debug_assert!(false, "origin code {code} missing from neighborhood table");
                log::error!("Unresolved origin neighborhood code {code}; entry omitted");
                return None;
            };
            Some(OriginShare {
                code: code.clone(),
                name: neighborhood.name.clone(),
                short_code: neighborhood.short_code().to_string(),
                percent: (count as f64 / total) * 100.0,
            })
        })
        .collect();

    shares.sort_by(|a, b| {
        b.percent
            .partial_cmp(&a.percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });

    if shares.is_empty() { None } else { Some(shares) }
}
