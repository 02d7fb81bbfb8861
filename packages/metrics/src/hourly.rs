//! Hourly sun-exposure bar series.
//!
//! The source stores the *shaded* fraction per half-hour slot; the bar
//! chart shows the inverse, the fraction of sky not shaded. Each bar
//! carries a fixed display opacity reflecting typical midday solar
//! intensity: full weight between 11:30 and 16:30, tapering to 0.3 at
//! the edges of the day. The weights are a static lookup, not derived
//! from data.

use std::collections::BTreeMap;

use serde::Serialize;
use shade_map_street_models::TimeSlot;

/// One bar of the hourly sun-exposure chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunExposureBar {
    /// Half-hour slot index (0 = 09:00).
    pub slot: usize,
    /// Fraction of the slot's sky not shaded, in `[0, 1]`.
    pub value: f64,
    /// Fixed display opacity for the bar fill.
    pub opacity: f64,
}

impl SunExposureBar {
    /// Slot display label, e.g. `"11:30"`.
    #[must_use]
    pub fn label(&self) -> String {
        TimeSlot::from_index(self.slot).map_or_else(String::new, TimeSlot::label)
    }
}

/// Fixed display opacity for a slot's bar.
#[must_use]
pub const fn display_opacity(slot: TimeSlot) -> f64 {
    match slot.index() {
        0 | 1 | 20..=22 => 0.3,     // 09:00-09:30, 19:00-20:00
        2..=4 | 16..=19 => 0.5,     // 10:00-11:00, 17:00-18:30
        _ => 1.0,                   // 11:30-16:30
    }
}

/// Builds the 23-bar series from a segment's shaded fractions.
///
/// A slot with no measurement renders as fully exposed (shaded
/// fraction 0), matching the source data where absent slots mean "no
/// shade computed".
#[must_use]
pub fn sun_exposure_series(hourly_shade: &BTreeMap<TimeSlot, f64>) -> Vec<SunExposureBar> {
    TimeSlot::ALL
        .iter()
        .map(|&slot| {
            let shaded = hourly_shade.get(&slot).copied().unwrap_or(0.0);
            SunExposureBar {
                slot: slot.index(),
                value: 1.0 - shaded,
                opacity: display_opacity(slot),
            }
        })
        .collect()
}
