//! Route and step model.
//!
//! A [`Route`] is an ordered sequence of [`RouteStep`]s from start to destination.
//! Each step carries the spoken instruction for its maneuver and the polyline the
//! user travels while executing it. The first and last steps are distinguished for
//! start/arrival messaging.

use crate::config::TrackerConfig;
use crate::geo_utils;
use crate::GeoPoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One instruction-bearing segment of a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    /// Maneuver instruction ("turn left onto High Street"). May be empty
    /// for the departure step.
    pub instruction: String,
    /// Ordered coordinates describing the path of this step.
    pub polyline: Vec<GeoPoint>,
    /// Length of this step in meters.
    pub distance_m: f64,
}

impl RouteStep {
    /// Build a step, deriving the distance from the polyline.
    pub fn new(instruction: impl Into<String>, polyline: Vec<GeoPoint>) -> Self {
        let distance_m = geo_utils::polyline_length(&polyline);
        Self { instruction: instruction.into(), polyline, distance_m }
    }
}

/// A computed route: ordered steps from start to destination.
///
/// Routes are created when directions are computed, replaced wholesale on
/// reroute, and dropped when the session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Steps in travel order.
    pub steps: Vec<RouteStep>,
    /// Total route distance in meters.
    pub total_distance_m: f64,
    /// Provider's expected travel time, when it supplies one.
    pub expected_duration: Option<Duration>,
}

impl Route {
    /// Build a route from steps, deriving the total distance.
    pub fn new(steps: Vec<RouteStep>) -> Self {
        let total_distance_m = steps.iter().map(|s| s.distance_m).sum();
        Self { steps, total_distance_m, expected_duration: None }
    }

    /// Build a route with a provider-supplied travel time estimate.
    pub fn with_duration(steps: Vec<RouteStep>, expected_duration: Duration) -> Self {
        let mut route = Self::new(steps);
        route.expected_duration = Some(expected_duration);
        route
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// The destination coordinate: the last vertex of the last step.
    pub fn destination(&self) -> Option<GeoPoint> {
        self.steps.last().and_then(|s| s.polyline.last()).copied()
    }

    /// The full polyline across all steps, in travel order.
    pub fn full_polyline(&self) -> Vec<GeoPoint> {
        self.steps.iter().flat_map(|s| s.polyline.iter().copied()).collect()
    }

    /// Whether this route meets the minimum thresholds for navigation.
    ///
    /// A route is navigable when it has at least `min_step_count` steps OR
    /// spans at least `min_route_distance_m` meters. Routes failing both are
    /// rejected before any monitoring starts.
    pub fn is_navigable(&self, config: &TrackerConfig) -> bool {
        self.step_count() >= config.min_step_count
            || self.total_distance_m >= config.min_route_distance_m
    }

    /// Remaining distance in meters from `current_step` onward, measured from
    /// the given fix to the end of the route.
    pub fn remaining_distance_from(&self, fix: &GeoPoint, current_step: usize) -> f64 {
        let mut remaining: f64 = self
            .steps
            .iter()
            .skip(current_step + 1)
            .map(|s| s.distance_m)
            .sum();

        // Within the current step, measure from the fix to the step's end.
        if let Some(step) = self.steps.get(current_step) {
            if let Some(end) = step.polyline.last() {
                remaining += geo_utils::haversine_distance(fix, end);
            }
        }

        remaining
    }
}
