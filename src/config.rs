//! Tracker configuration.
//!
//! Every distance and timing threshold the guidance core uses is carried here as a
//! documented field rather than a buried constant, so hosts can tune them per
//! transport mode (walking vs. driving) without forking the core.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for route tracking and guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Minimum number of steps for a route to be considered navigable.
    /// A route passes validity if it meets this OR `min_route_distance_m`.
    /// Default: 4
    pub min_step_count: usize,

    /// Minimum total route distance (meters) for validity.
    /// Default: 100.0
    pub min_route_distance_m: f64,

    /// Corridor half-width (meters): a fix farther than this from every
    /// segment of the route polyline is off-route. Also gates early
    /// first-step confirmation. Default: 34.0
    pub corridor_m: f64,

    /// Radius (meters) around the destination that counts as arrival.
    /// Default: 10.0
    pub arrival_radius_m: f64,

    /// Minimum geofence radius (meters), used for a step's last polyline
    /// vertex where there is no next vertex to derive a radius from.
    /// Default: 20.0
    pub min_fence_radius_m: f64,

    /// Cadence of the off-route corridor check. Default: 5s
    pub off_route_interval: Duration,

    /// Cooldown after a reroute completes before another reroute may be
    /// requested. Default: 15s
    pub reroute_cooldown: Duration,

    /// Cadence of the ETA/remaining-distance refresh. Default: 30s
    pub eta_refresh_interval: Duration,

    /// Delay before retrying a directions request that failed because no
    /// position fix was available yet. Default: 1s
    pub directions_retry_delay: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_step_count: 4,
            min_route_distance_m: 100.0,
            corridor_m: 34.0,
            arrival_radius_m: 10.0,
            min_fence_radius_m: 20.0,
            off_route_interval: Duration::from_secs(5),
            reroute_cooldown: Duration::from_secs(15),
            eta_refresh_interval: Duration::from_secs(30),
            directions_retry_delay: Duration::from_secs(1),
        }
    }
}
