//! # Route Tracker
//!
//! Turn-by-turn guidance core for walking and driving navigation.
//!
//! This library provides:
//! - Route progress tracking with monotonic step advancement
//! - Per-vertex geofence monitoring backed by an R-tree
//! - Corridor-based off-route detection with reroute rate limiting
//! - Arrival detection, ETA polling, and pluggable guidance views
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel corridor distance checks with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use route_tracker::{GeoPoint, Route, RouteStep, TrackerConfig};
//!
//! let route = Route::new(vec![
//!     RouteStep::new("", vec![
//!         GeoPoint::new(51.5074, -0.1278),
//!         GeoPoint::new(51.5080, -0.1278),
//!     ]),
//!     RouteStep::new("turn left", vec![
//!         GeoPoint::new(51.5080, -0.1278),
//!         GeoPoint::new(51.5080, -0.1290),
//!     ]),
//! ]);
//!
//! let config = TrackerConfig::default();
//! if route.is_navigable(&config) {
//!     println!("{} steps, {:.0}m", route.step_count(), route.total_distance_m);
//! }
//! ```
//!
//! The engine is host-driven and deterministic: the host feeds position fixes
//! through [`NavigationSession::on_position`] and advances the clock with
//! [`NavigationSession::tick`], both stamped with a [`std::time::Duration`]
//! since session start. Platform services (directions, speech, persistence)
//! are injected as trait objects, so the same core runs on any platform and
//! under test without network or timers.

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod events;
pub mod geo_utils;
pub mod geofence;
pub mod offroute;
pub mod poller;
pub mod prefs;
pub mod progress;
pub mod providers;
pub mod route;
pub mod session;
pub mod timers;
pub mod views;

pub use config::TrackerConfig;
pub use error::{NavError, Result};
pub use events::{EventBus, NavEvent, NavObserver};
pub use geofence::{FenceEvent, FenceEventKind, RegionMonitor, StepFence};
pub use offroute::{CorridorCheck, OffRouteDetector};
pub use poller::InfoPoller;
pub use prefs::UserPrefs;
pub use progress::{NavPhase, ProgressTracker, RouteDecision};
pub use providers::{
    DirectionsProvider, KeyValueStore, MemoryStore, SoundCue, TransportMode, VoiceOutput,
};
pub use route::{Route, RouteStep};
pub use session::NavigationSession;
pub use timers::{TaskHandle, TimerRegistry};
pub use views::{ArAnchor, ArView, GuidanceView, MapView};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use route_tracker::GeoPoint;
/// let point = GeoPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Axis-aligned bounding box around a set of points, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Whether a point lies inside the box (inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }

    /// Center of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}
