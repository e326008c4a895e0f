//! Error types for the guidance core.

use thiserror::Error;

/// Errors surfaced by the guidance core.
///
/// None of these are fatal to a navigation session: directions and location
/// failures surface to the UI as events while the tracker holds its last known
/// state, and `RouteInvalid` is terminal only for the offending route.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    /// The directions provider failed or returned no usable route.
    #[error("directions provider failed: {0}")]
    Directions(String),

    /// The provider responded but produced no route for the request.
    #[error("no route found to destination")]
    NoRoute,

    /// The computed route fails the minimum step-count and distance thresholds.
    #[error("route too short to navigate: {step_count} steps, {distance_m:.0}m")]
    RouteInvalid { step_count: usize, distance_m: f64 },

    /// No position fix is available yet. Retried on a short timer rather
    /// than surfaced to the user.
    #[error("no position fix available")]
    LocationUnavailable,
}

pub type Result<T> = std::result::Result<T, NavError>;
