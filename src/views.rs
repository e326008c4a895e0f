//! Guidance view adapters.
//!
//! Guidance renders twice: on a 2D map and in an AR camera overlay,
//! switchable by tab. Both consume the same route/step stream, so the
//! contract is a single trait with two implementations rather than an
//! inheritance hierarchy. Views own nothing but rendering caches; all
//! navigation state lives in the tracker.
//!
//! Redraws must be idempotent: the session may tell a view to show a step it
//! is already showing (e.g. after a resume), and that must not re-render.

use crate::geo_utils;
use crate::route::Route;
use crate::{Bounds, GeoPoint};
use std::cell::RefCell;
use std::rc::Rc;

/// Rendering contract shared by the map and AR presentations.
pub trait GuidanceView {
    /// A new route was accepted; rebuild rendering caches.
    fn set_route(&mut self, route: &Route);
    /// The destination changed (set before the route is computed).
    fn set_destination(&mut self, destination: GeoPoint);
    /// The current step changed; highlight/focus it.
    fn go_to_step(&mut self, step_index: usize);
    /// Re-center the presentation on the user's position.
    fn recenter(&mut self, position: GeoPoint);
}

/// Lets the host keep a handle to a view it also registers with the session.
impl<V: GuidanceView> GuidanceView for Rc<RefCell<V>> {
    fn set_route(&mut self, route: &Route) {
        self.borrow_mut().set_route(route);
    }

    fn set_destination(&mut self, destination: GeoPoint) {
        self.borrow_mut().set_destination(destination);
    }

    fn go_to_step(&mut self, step_index: usize) {
        self.borrow_mut().go_to_step(step_index);
    }

    fn recenter(&mut self, position: GeoPoint) {
        self.borrow_mut().recenter(position);
    }
}

// =============================================================================
// Map View
// =============================================================================

/// 2D map presentation: cached route polyline, camera region, highlighted row.
#[derive(Debug, Default)]
pub struct MapView {
    polyline: Vec<GeoPoint>,
    route_bounds: Option<Bounds>,
    destination: Option<GeoPoint>,
    camera_center: Option<GeoPoint>,
    highlighted_step: Option<usize>,
    /// Number of actual redraws performed (idempotence is observable here).
    pub redraw_count: u32,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polyline(&self) -> &[GeoPoint] {
        &self.polyline
    }

    pub fn route_bounds(&self) -> Option<&Bounds> {
        self.route_bounds.as_ref()
    }

    pub fn camera_center(&self) -> Option<GeoPoint> {
        self.camera_center
    }

    pub fn highlighted_step(&self) -> Option<usize> {
        self.highlighted_step
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        self.destination
    }
}

impl GuidanceView for MapView {
    fn set_route(&mut self, route: &Route) {
        self.polyline = route.full_polyline();
        self.route_bounds = if self.polyline.is_empty() {
            None
        } else {
            Some(geo_utils::compute_bounds(&self.polyline))
        };
        self.highlighted_step = Some(0);
        self.redraw_count += 1;
    }

    fn set_destination(&mut self, destination: GeoPoint) {
        self.destination = Some(destination);
    }

    fn go_to_step(&mut self, step_index: usize) {
        if self.highlighted_step == Some(step_index) {
            return;
        }
        self.highlighted_step = Some(step_index);
        self.redraw_count += 1;
    }

    fn recenter(&mut self, position: GeoPoint) {
        self.camera_center = Some(position);
    }
}

// =============================================================================
// AR View
// =============================================================================

/// One placed AR node: a guidance marker anchored at a route vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ArAnchor {
    pub step_index: usize,
    pub vertex_index: usize,
    pub position: GeoPoint,
}

/// AR camera presentation: guidance nodes along the path, one active at a time.
#[derive(Debug, Default)]
pub struct ArView {
    anchors: Vec<ArAnchor>,
    destination: Option<GeoPoint>,
    active_step: Option<usize>,
    user_position: Option<GeoPoint>,
    /// Number of anchor-set rebuilds performed.
    pub refresh_count: u32,
}

impl ArView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchors(&self) -> &[ArAnchor] {
        &self.anchors
    }

    pub fn active_step(&self) -> Option<usize> {
        self.active_step
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        self.destination
    }

    pub fn user_position(&self) -> Option<GeoPoint> {
        self.user_position
    }

    /// Anchors belonging to the active step, in vertex order.
    pub fn active_anchors(&self) -> impl Iterator<Item = &ArAnchor> {
        let active = self.active_step;
        self.anchors
            .iter()
            .filter(move |a| Some(a.step_index) == active)
    }
}

impl GuidanceView for ArView {
    fn set_route(&mut self, route: &Route) {
        self.anchors.clear();
        for (step_index, step) in route.steps.iter().enumerate() {
            for (vertex_index, vertex) in step.polyline.iter().enumerate() {
                self.anchors.push(ArAnchor {
                    step_index,
                    vertex_index,
                    position: *vertex,
                });
            }
        }
        self.active_step = Some(0);
        self.refresh_count += 1;
    }

    fn set_destination(&mut self, destination: GeoPoint) {
        self.destination = Some(destination);
    }

    fn go_to_step(&mut self, step_index: usize) {
        if self.active_step == Some(step_index) {
            return;
        }
        self.active_step = Some(step_index);
        self.refresh_count += 1;
    }

    fn recenter(&mut self, position: GeoPoint) {
        self.user_position = Some(position);
    }
}
