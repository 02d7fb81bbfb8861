//! User-controlled dashboard state types.
//!
//! Thresholds and scope selection are exclusively owned by the
//! [`Dashboard`](crate::Dashboard); the filter engine reads them but
//! never mutates them. None of this state persists across sessions.

use serde::{Deserialize, Serialize};

/// Live slider thresholds. Every mutation re-triggers the filter
/// engine synchronously; there is no debounce. The defaults keep
/// every segment (both sliders at zero).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterThresholds {
    /// Minimum sun-exposure percentage, in `[0, 100]`. Compared
    /// inclusively against `avg_exposure * 100`.
    pub shade_min_percent: f64,
    /// Minimum comfort-index value. Compared inclusively.
    pub comfort_min: f64,
}

/// Whether segments without a comfort measurement pass the comfort
/// threshold.
///
/// The source data's sentinel value naturally passes a `>= 0` default
/// threshold, so [`Self::Include`] reproduces the historically observed
/// behavior (the sentinel participates as `0.0`). [`Self::Exclude`]
/// drops unmeasured segments as soon as any comfort filtering applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SentinelPolicy {
    /// Unmeasured segments compare as `0.0`.
    #[default]
    Include,
    /// Unmeasured segments never pass the comfort threshold.
    Exclude,
}

/// The geographic extent currently filtered and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeSelection {
    /// All segments, city-wide.
    City,
    /// One neighborhood's segment subset.
    Neighborhood(String),
}

impl ScopeSelection {
    /// Code of the selected neighborhood, if any.
    #[must_use]
    pub fn neighborhood_code(&self) -> Option<&str> {
        match self {
            Self::City => None,
            Self::Neighborhood(code) => Some(code),
        }
    }
}
