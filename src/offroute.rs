//! # Off-Route Detector
//!
//! Periodic corridor check: on a fixed cadence, the last known fix is compared
//! against every segment of the route polyline. If the minimum point-to-segment
//! distance exceeds the corridor threshold, the fix is off the path and a reroute
//! should be considered.
//!
//! This is a poll, not an event: it runs on its own cadence independent of the
//! region monitor, so a user standing still off the path is still detected.

use crate::config::TrackerConfig;
use crate::geo_utils;
use crate::GeoPoint;
use log::debug;
use std::time::Duration;

/// Result of one due corridor check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorridorCheck {
    /// The fix is within the corridor; `deviation_m` is its distance to the path.
    OnPath { deviation_m: f64 },
    /// The fix is beyond the corridor from every segment.
    OffPath { deviation_m: f64 },
}

/// Polling off-route detector.
pub struct OffRouteDetector {
    interval: Duration,
    threshold_m: f64,
    last_check: Option<Duration>,
}

impl OffRouteDetector {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            interval: config.off_route_interval,
            threshold_m: config.corridor_m,
            last_check: None,
        }
    }

    /// Forget the polling phase, e.g. when a new route arrives.
    pub fn reset(&mut self) {
        self.last_check = None;
    }

    /// Run the corridor check if the polling interval has elapsed.
    ///
    /// Returns `None` when the check is not yet due or the polyline is too
    /// short to define a corridor. `now` is the session-relative timestamp.
    pub fn poll(
        &mut self,
        now: Duration,
        fix: &GeoPoint,
        polyline: &[GeoPoint],
    ) -> Option<CorridorCheck> {
        if let Some(last) = self.last_check {
            if now < last + self.interval {
                return None;
            }
        }
        self.last_check = Some(now);

        if polyline.len() < 2 {
            return None;
        }

        let deviation_m = geo_utils::min_distance_to_polyline(fix, polyline);
        if deviation_m > self.threshold_m {
            debug!("off path: {:.1}m from nearest segment", deviation_m);
            Some(CorridorCheck::OffPath { deviation_m })
        } else {
            Some(CorridorCheck::OnPath { deviation_m })
        }
    }
}
