//! # Navigation Info Poller
//!
//! Periodically recomputes the route from the live position purely to refresh
//! the remaining-distance/ETA display. Runs on its own cadence (the session
//! schedules it through the timer registry), independent of the off-route
//! check. Failures here never touch the state machine; they only produce an
//! [`NavEvent::EtaUnavailable`] for the error label.

use crate::events::NavEvent;
use crate::providers::{DirectionsProvider, TransportMode};
use crate::GeoPoint;
use log::debug;

/// Refreshes arrival estimates from the directions provider.
pub struct InfoPoller {
    consecutive_failures: u32,
}

impl InfoPoller {
    pub fn new() -> Self {
        Self { consecutive_failures: 0 }
    }

    /// Recompute the route from `origin` and produce the event to publish.
    ///
    /// A fresh route from the live position gives the remaining distance
    /// directly as its total distance.
    pub fn refresh(
        &mut self,
        provider: &mut dyn DirectionsProvider,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> NavEvent {
        match provider.compute_route(origin, destination, mode) {
            Ok(route) => {
                self.consecutive_failures = 0;
                debug!(
                    "eta refresh: {:.0}m remaining",
                    route.total_distance_m
                );
                NavEvent::EtaUpdated {
                    remaining_distance_m: route.total_distance_m,
                    expected_duration: route.expected_duration,
                }
            }
            Err(err) => {
                self.consecutive_failures += 1;
                debug!(
                    "eta refresh failed ({} in a row): {err}",
                    self.consecutive_failures
                );
                NavEvent::EtaUnavailable { message: err.to_string() }
            }
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

impl Default for InfoPoller {
    fn default() -> Self {
        Self::new()
    }
}
