//! Comfort-index gauge reading.
//!
//! The circular gauge renders a half dial over the fixed domain
//! `[25, 50]` with tick breakpoints at 29, 35, 41, and 46 separating
//! its five intensity bands. The projector passes the raw comfort
//! value through; only the pointer position is clamped to the dial.

use serde::Serialize;

/// Lower edge of the gauge dial.
pub const DOMAIN_MIN: f64 = 25.0;
/// Upper edge of the gauge dial.
pub const DOMAIN_MAX: f64 = 50.0;
/// Tick values separating the five gauge bands.
pub const BREAKPOINTS: [f64; 4] = [29.0, 35.0, 41.0, 46.0];

/// A comfort measurement positioned on the gauge dial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeReading {
    /// Raw comfort-index value (unclamped).
    pub value: f64,
}

impl GaugeReading {
    /// Pointer position along the dial in `[0, 1]`, clamped to the
    /// domain edges.
    #[must_use]
    pub fn pointer_fraction(&self) -> f64 {
        ((self.value - DOMAIN_MIN) / (DOMAIN_MAX - DOMAIN_MIN)).clamp(0.0, 1.0)
    }

    /// Index of the intensity band the value falls in (0..=4).
    #[must_use]
    pub fn band_index(&self) -> usize {
        BREAKPOINTS.iter().filter(|&&b| self.value >= b).count()
    }
}

/// Builds the gauge reading, or `None` for the no-measurement state.
#[must_use]
pub const fn comfort_gauge(comfort_index: Option<f64>) -> Option<GaugeReading> {
    match comfort_index {
        Some(value) => Some(GaugeReading { value }),
        None => None,
    }
}
