//! # Region Monitor
//!
//! Converts raw position fixes into geofence transitions for route steps.
//!
//! One circular fence is registered per polyline vertex per step, tagged with
//! `(step_index, vertex_index)`. The fence radius is the distance to the step's
//! next vertex, so fences tile the step's path; a step's last vertex gets the
//! configured minimum radius instead.
//!
//! ## Replace-all semantics
//!
//! When a new route arrives the live fence set is replaced entirely (stop-all,
//! then re-register) rather than edited incrementally. This mirrors how region
//! monitoring must be handled on mobile location services, where stale regions
//! leak if the old set isn't torn down first, and it makes restart reproducible:
//! stopping and restarting the monitor for the same route yields the identical
//! fence set.
//!
//! Candidate fences for each fix are found through an R-tree over the fences'
//! bounding boxes; exact containment uses haversine distance to the center.

use crate::config::TrackerConfig;
use crate::geo_utils;
use crate::route::Route;
use crate::GeoPoint;
use log::{debug, info};
use rstar::{RTree, RTreeObject, AABB};

/// Kind of geofence transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceEventKind {
    /// The fix moved from outside the fence to inside.
    Entered,
    /// The fix moved from inside the fence to outside.
    Exited,
    /// The fix was already inside the fence when monitoring started.
    DeterminedInside,
}

/// A geofence transition for one step fence.
#[derive(Debug, Clone, PartialEq)]
pub struct FenceEvent {
    pub step_index: usize,
    pub vertex_index: usize,
    pub step_count: usize,
    pub kind: FenceEventKind,
    /// Distance in meters from the fix to the fence center at event time.
    pub distance_m: f64,
}

/// A circular monitored region anchored at a step polyline vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFence {
    pub step_index: usize,
    pub vertex_index: usize,
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl StepFence {
    fn contains(&self, fix: &GeoPoint) -> (bool, f64) {
        let dist = geo_utils::haversine_distance(fix, &self.center);
        (dist <= self.radius_m, dist)
    }
}

/// R-tree entry: index into the fence list plus the fence circle's bounding box.
struct IndexedFence {
    fence_idx: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for IndexedFence {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Monitors the live set of step fences and emits transitions.
pub struct RegionMonitor {
    fences: Vec<StepFence>,
    inside: Vec<bool>,
    tree: RTree<IndexedFence>,
    step_count: usize,
    active: bool,
}

impl RegionMonitor {
    pub fn new() -> Self {
        Self {
            fences: Vec::new(),
            inside: Vec::new(),
            tree: RTree::new(),
            step_count: 0,
            active: false,
        }
    }

    /// Replace the monitored fence set with fences for `route`.
    ///
    /// Any previously registered fences are torn down first. Monitoring is
    /// left stopped; call [`start`](Self::start) to begin emitting events.
    pub fn set_route(&mut self, route: &Route, config: &TrackerConfig) {
        self.stop();
        self.fences = build_fences(route, config);
        self.inside = vec![false; self.fences.len()];
        self.step_count = route.step_count();
        self.tree = RTree::bulk_load(
            self.fences
                .iter()
                .enumerate()
                .map(|(i, f)| indexed(i, f))
                .collect(),
        );
        info!(
            "registered {} fences across {} steps",
            self.fences.len(),
            self.step_count
        );
    }

    /// Remove all fences and stop monitoring.
    pub fn clear(&mut self) {
        self.stop();
        self.fences.clear();
        self.inside.clear();
        self.tree = RTree::new();
        self.step_count = 0;
    }

    /// Begin monitoring. If a fix is available, fences already containing it
    /// produce `DeterminedInside` events, ordered by (step, vertex).
    pub fn start(&mut self, fix: Option<&GeoPoint>) -> Vec<FenceEvent> {
        self.active = true;
        for state in &mut self.inside {
            *state = false;
        }

        let Some(fix) = fix else { return Vec::new() };

        let mut events = Vec::new();
        for idx in self.candidates(fix) {
            let (contains, dist) = self.fences[idx].contains(fix);
            if contains {
                self.inside[idx] = true;
                events.push(self.event(idx, FenceEventKind::DeterminedInside, dist));
            }
        }
        sort_events(&mut events);
        debug!("monitor start: {} fences already containing fix", events.len());
        events
    }

    /// Stop monitoring and forget containment states. The fence set itself
    /// is kept, so a later [`start`](Self::start) resumes with identical regions.
    pub fn stop(&mut self) {
        self.active = false;
        for state in &mut self.inside {
            *state = false;
        }
    }

    /// Whether the monitor is currently emitting events.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The registered fences, in (step, vertex) order.
    pub fn fences(&self) -> &[StepFence] {
        &self.fences
    }

    /// Process a fix and return the fence transitions it caused, ordered by
    /// (step, vertex). Returns nothing while stopped.
    pub fn update(&mut self, fix: &GeoPoint) -> Vec<FenceEvent> {
        if !self.active {
            return Vec::new();
        }

        let mut events = Vec::new();

        // Entries: candidates from the spatial index that now contain the fix.
        for idx in self.candidates(fix) {
            let (contains, dist) = self.fences[idx].contains(fix);
            if contains && !self.inside[idx] {
                self.inside[idx] = true;
                events.push(self.event(idx, FenceEventKind::Entered, dist));
            }
        }

        // Exits: any fence we were inside that no longer contains the fix.
        for idx in 0..self.fences.len() {
            if !self.inside[idx] {
                continue;
            }
            let (contains, dist) = self.fences[idx].contains(fix);
            if !contains {
                self.inside[idx] = false;
                events.push(self.event(idx, FenceEventKind::Exited, dist));
            }
        }

        sort_events(&mut events);
        events
    }

    fn candidates(&self, fix: &GeoPoint) -> Vec<usize> {
        let point = AABB::from_point([fix.longitude, fix.latitude]);
        self.tree
            .locate_in_envelope_intersecting(&point)
            .map(|f| f.fence_idx)
            .collect()
    }

    fn event(&self, idx: usize, kind: FenceEventKind, distance_m: f64) -> FenceEvent {
        let fence = &self.fences[idx];
        FenceEvent {
            step_index: fence.step_index,
            vertex_index: fence.vertex_index,
            step_count: self.step_count,
            kind,
            distance_m,
        }
    }
}

impl Default for RegionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_events(events: &mut [FenceEvent]) {
    events.sort_by_key(|e| (e.step_index, e.vertex_index));
}

fn indexed(idx: usize, fence: &StepFence) -> IndexedFence {
    let dlat = fence.radius_m / 110_574.0;
    let dlng = geo_utils::meters_to_degrees(fence.radius_m, fence.center.latitude);
    IndexedFence {
        fence_idx: idx,
        min: [fence.center.longitude - dlng, fence.center.latitude - dlat],
        max: [fence.center.longitude + dlng, fence.center.latitude + dlat],
    }
}

/// Build the fence set for a route: one fence per vertex per step.
fn build_fences(route: &Route, config: &TrackerConfig) -> Vec<StepFence> {
    let mut fences = Vec::new();
    for (step_index, step) in route.steps.iter().enumerate() {
        for (vertex_index, vertex) in step.polyline.iter().enumerate() {
            let radius_m = match step.polyline.get(vertex_index + 1) {
                Some(next) => geo_utils::haversine_distance(vertex, next)
                    .max(config.min_fence_radius_m),
                None => config.min_fence_radius_m,
            };
            fences.push(StepFence {
                step_index,
                vertex_index,
                center: *vertex,
                radius_m,
            });
        }
    }
    fences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteStep;

    fn test_route() -> Route {
        // Two steps heading north, vertices ~111m apart
        Route::new(vec![
            RouteStep::new(
                "",
                vec![
                    GeoPoint::new(51.5000, -0.1278),
                    GeoPoint::new(51.5010, -0.1278),
                ],
            ),
            RouteStep::new(
                "turn left",
                vec![
                    GeoPoint::new(51.5010, -0.1278),
                    GeoPoint::new(51.5020, -0.1278),
                ],
            ),
        ])
    }

    fn monitor_for(route: &Route) -> RegionMonitor {
        let mut monitor = RegionMonitor::new();
        monitor.set_route(route, &TrackerConfig::default());
        monitor
    }

    #[test]
    fn test_one_fence_per_vertex_per_step() {
        let route = test_route();
        let monitor = monitor_for(&route);
        assert_eq!(monitor.fences().len(), 4);
        assert_eq!(monitor.fences()[0].step_index, 0);
        assert_eq!(monitor.fences()[3].step_index, 1);
        assert_eq!(monitor.fences()[3].vertex_index, 1);
    }

    #[test]
    fn test_last_vertex_gets_minimum_radius() {
        let cfg = TrackerConfig::default();
        let route = test_route();
        let monitor = monitor_for(&route);
        // Interior vertices: radius = distance to next vertex (~111m)
        assert!(monitor.fences()[0].radius_m > 100.0);
        // Step-final vertices: minimum radius
        assert_eq!(monitor.fences()[1].radius_m, cfg.min_fence_radius_m);
        assert_eq!(monitor.fences()[3].radius_m, cfg.min_fence_radius_m);
    }

    #[test]
    fn test_enter_then_exit() {
        let route = test_route();
        let mut monitor = monitor_for(&route);
        // Start well away from every fence
        monitor.start(Some(&GeoPoint::new(51.6000, -0.1278)));

        // Move into step 1's final fence (radius 20m around 51.5020)
        let events = monitor.update(&GeoPoint::new(51.50200, -0.1278));
        assert!(events
            .iter()
            .any(|e| e.kind == FenceEventKind::Entered && e.step_index == 1 && e.vertex_index == 1));

        // Move far away again
        let events = monitor.update(&GeoPoint::new(51.6000, -0.1278));
        assert!(events
            .iter()
            .all(|e| e.kind == FenceEventKind::Exited));
        assert!(!events.is_empty());
    }

    #[test]
    fn test_no_repeat_enter_while_inside() {
        let route = test_route();
        let mut monitor = monitor_for(&route);
        monitor.start(Some(&GeoPoint::new(51.6000, -0.1278)));

        let fix = GeoPoint::new(51.5020, -0.1278);
        let first = monitor.update(&fix);
        assert!(!first.is_empty());
        let second = monitor.update(&fix);
        assert!(second.is_empty());
    }

    #[test]
    fn test_determine_inside_on_start() {
        let route = test_route();
        let mut monitor = monitor_for(&route);
        // Start right on the route origin: inside step 0's first fence
        let events = monitor.start(Some(&GeoPoint::new(51.5000, -0.1278)));
        assert!(events
            .iter()
            .any(|e| e.kind == FenceEventKind::DeterminedInside && e.step_index == 0));
    }

    #[test]
    fn test_no_events_while_stopped() {
        let route = test_route();
        let mut monitor = monitor_for(&route);
        let events = monitor.update(&GeoPoint::new(51.5020, -0.1278));
        assert!(events.is_empty());
    }

    #[test]
    fn test_stop_and_restart_reproduces_fence_set() {
        let route = test_route();
        let mut monitor = monitor_for(&route);
        monitor.start(None);
        let before: Vec<StepFence> = monitor.fences().to_vec();

        monitor.stop();
        monitor.start(None);
        assert_eq!(monitor.fences(), before.as_slice());

        // Re-registering the same route is also identical: no leaks, no dupes
        monitor.set_route(&route, &TrackerConfig::default());
        assert_eq!(monitor.fences(), before.as_slice());
    }

    #[test]
    fn test_new_route_replaces_fences_entirely() {
        let route = test_route();
        let mut monitor = monitor_for(&route);
        monitor.start(Some(&GeoPoint::new(51.5020, -0.1278)));

        let other = Route::new(vec![RouteStep::new(
            "head south",
            vec![GeoPoint::new(48.85, 2.35), GeoPoint::new(48.84, 2.35)],
        )]);
        monitor.set_route(&other, &TrackerConfig::default());

        assert_eq!(monitor.fences().len(), 2);
        assert!(!monitor.is_active());
        assert!(monitor
            .fences()
            .iter()
            .all(|f| f.center.latitude < 50.0));
    }

    #[test]
    fn test_events_ordered_by_step_then_vertex() {
        // Overlapping fences: a fix inside several at once must report them
        // in (step, vertex) order.
        let route = Route::new(vec![RouteStep::new(
            "",
            vec![
                GeoPoint::new(51.5000, -0.1278),
                GeoPoint::new(51.50005, -0.1278),
                GeoPoint::new(51.50010, -0.1278),
            ],
        )]);
        let mut monitor = monitor_for(&route);
        monitor.start(Some(&GeoPoint::new(51.6, -0.1278)));

        let events = monitor.update(&GeoPoint::new(51.50005, -0.1278));
        assert!(events.len() >= 2);
        for pair in events.windows(2) {
            assert!(
                (pair[0].step_index, pair[0].vertex_index)
                    <= (pair[1].step_index, pair[1].vertex_index)
            );
        }
    }
}
