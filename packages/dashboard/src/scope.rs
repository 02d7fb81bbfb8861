//! Neighborhood scope resolver.
//!
//! An explicit state machine over the active geographic scope:
//! `City -> LoadingNeighborhood(code) -> Neighborhood(code, data)`, with
//! reset back to `City` and direct `Neighborhood(A) -> Loading(B)`
//! switches that discard A's data (the session cache lives in the
//! dataset store, not here). Fetches cannot be cancelled, so every
//! transition bumps an epoch and a completed load is applied only if
//! its ticket still matches — a stale, late-arriving response never
//! overwrites a newer selection.

use shade_map_street_models::StreetSegment;

use crate::state::ScopeSelection;

/// Resolver state. `Loading` suspends only the scope transition;
/// thresholds remain readable while a fetch is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeState {
    /// City-wide scope, using the full street network.
    City,
    /// A neighborhood was selected and its subset fetch is in flight.
    LoadingNeighborhood {
        /// Code of the neighborhood being loaded.
        code: String,
    },
    /// A neighborhood subset is loaded and active.
    Neighborhood {
        /// Code of the active neighborhood.
        code: String,
        /// Its street subset.
        segments: Vec<StreetSegment>,
    },
}

/// Ticket identifying one load transition. A completion with a stale
/// ticket is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    code: String,
    epoch: u64,
}

impl LoadTicket {
    /// Neighborhood code this ticket loads.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Outcome of completing a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The load matched the current transition and is now active.
    Current,
    /// A newer selection superseded this load; nothing changed.
    Stale,
}

/// The scope state machine.
#[derive(Debug)]
pub struct ScopeResolver {
    state: ScopeState,
    epoch: u64,
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeResolver {
    /// Starts at city scope.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ScopeState::City,
            epoch: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ScopeState {
        &self.state
    }

    /// Current selection as seen by the filter engine. A loading scope
    /// already counts as the selected neighborhood; filtering for it
    /// simply cannot proceed until the fetch resolves.
    #[must_use]
    pub fn selection(&self) -> ScopeSelection {
        match &self.state {
            ScopeState::City => ScopeSelection::City,
            ScopeState::LoadingNeighborhood { code }
            | ScopeState::Neighborhood { code, .. } => {
                ScopeSelection::Neighborhood(code.clone())
            }
        }
    }

    /// Active neighborhood subset, when one is loaded.
    #[must_use]
    pub fn neighborhood_segments(&self) -> Option<&[StreetSegment]> {
        match &self.state {
            ScopeState::Neighborhood { segments, .. } => Some(segments),
            _ => None,
        }
    }

    /// Begins a neighborhood selection, entering the loading state and
    /// invalidating any in-flight load.
    pub fn begin_select(&mut self, code: &str) -> LoadTicket {
        self.epoch += 1;
        self.state = ScopeState::LoadingNeighborhood {
            code: code.to_string(),
        };
        log::debug!("Scope transition to loading {code} (epoch {})", self.epoch);
        LoadTicket {
            code: code.to_string(),
            epoch: self.epoch,
        }
    }

    /// Applies a completed subset load if its ticket is still current.
    pub fn complete_load(&mut self, ticket: &LoadTicket, segments: Vec<StreetSegment>) -> Applied {
        if ticket.epoch != self.epoch {
            log::debug!(
                "Discarding stale load for {} (epoch {} != {})",
                ticket.code,
                ticket.epoch,
                self.epoch
            );
            return Applied::Stale;
        }
        self.state = ScopeState::Neighborhood {
            code: ticket.code.clone(),
            segments,
        };
        Applied::Current
    }

    /// Records a failed subset load. If the ticket is still current the
    /// resolver falls back to city scope; the caller surfaces the error
    /// to the user.
    pub fn fail_load(&mut self, ticket: &LoadTicket) -> Applied {
        if ticket.epoch != self.epoch {
            return Applied::Stale;
        }
        log::warn!("Subset load failed for {}; reverting to city scope", ticket.code);
        self.epoch += 1;
        self.state = ScopeState::City;
        Applied::Current
    }

    /// Resets to city scope, invalidating any in-flight load.
    pub fn reset_to_city(&mut self) {
        self.epoch += 1;
        self.state = ScopeState::City;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(n: u32) -> Vec<StreetSegment> {
        (0..n)
            .map(|i| StreetSegment {
                geometry: geojson::Geometry::new(geojson::Value::LineString(vec![
                    vec![0.0, 0.0],
                    vec![f64::from(i), 1.0],
                ])),
                attributes: shade_map_street_models::StreetAttributes::default(),
            })
            .collect()
    }

    #[test]
    fn load_round_trip() {
        let mut resolver = ScopeResolver::new();
        assert_eq!(resolver.selection(), ScopeSelection::City);

        let ticket = resolver.begin_select("BU0363AB");
        assert!(matches!(
            resolver.state(),
            ScopeState::LoadingNeighborhood { .. }
        ));
        assert_eq!(
            resolver.selection(),
            ScopeSelection::Neighborhood("BU0363AB".into())
        );

        assert_eq!(resolver.complete_load(&ticket, segments(3)), Applied::Current);
        assert_eq!(resolver.neighborhood_segments().unwrap().len(), 3);

        resolver.reset_to_city();
        assert_eq!(resolver.selection(), ScopeSelection::City);
        assert!(resolver.neighborhood_segments().is_none());
    }

    #[test]
    fn stale_load_never_overwrites_newer_selection() {
        let mut resolver = ScopeResolver::new();
        let ticket_a = resolver.begin_select("BU0363AA");
        let ticket_b = resolver.begin_select("BU0363BB");

        // A's response arrives after B was selected.
        assert_eq!(resolver.complete_load(&ticket_a, segments(5)), Applied::Stale);
        assert!(matches!(
            resolver.state(),
            ScopeState::LoadingNeighborhood { code } if code == "BU0363BB"
        ));

        assert_eq!(resolver.complete_load(&ticket_b, segments(2)), Applied::Current);
        assert_eq!(resolver.neighborhood_segments().unwrap().len(), 2);
    }

    #[test]
    fn stale_load_after_reset_is_discarded() {
        let mut resolver = ScopeResolver::new();
        let ticket = resolver.begin_select("BU0363AA");
        resolver.reset_to_city();

        assert_eq!(resolver.complete_load(&ticket, segments(5)), Applied::Stale);
        assert_eq!(resolver.selection(), ScopeSelection::City);
    }

    #[test]
    fn switching_neighborhoods_discards_loaded_data() {
        let mut resolver = ScopeResolver::new();
        let ticket_a = resolver.begin_select("BU0363AA");
        resolver.complete_load(&ticket_a, segments(5));

        let _ticket_b = resolver.begin_select("BU0363BB");
        assert!(resolver.neighborhood_segments().is_none());
    }

    #[test]
    fn failed_load_reverts_to_city() {
        let mut resolver = ScopeResolver::new();
        let ticket = resolver.begin_select("BU0363AA");
        assert_eq!(resolver.fail_load(&ticket), Applied::Current);
        assert_eq!(resolver.selection(), ScopeSelection::City);

        // A failure for an already superseded ticket changes nothing.
        let ticket_b = resolver.begin_select("BU0363BB");
        let stale = resolver.begin_select("BU0363CC");
        assert_eq!(resolver.fail_load(&ticket_b), Applied::Stale);
        assert_eq!(
            resolver.selection(),
            ScopeSelection::Neighborhood("BU0363CC".into())
        );
        drop(stale);
    }
}
