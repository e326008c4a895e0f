//! # Route-Progress State Machine
//!
//! Owns the navigation phase and the current step, reconciling geofence and
//! off-route signals into confirmed transitions. Every mutation of
//! `current_step` goes through here, and reroute permission flags apply
//! hysteresis so a noisy fix cannot cause a reroute storm.
//!
//! ## Phases
//!
//! ```text
//! Idle → RouteLoading → RouteValid ⇄ Rerouting
//!              │             │
//!              ▼             ▼
//!        RouteInvalid     Arrived
//! ```
//!
//! `RouteInvalid` is absorbing for the offending route: only a fresh
//! destination restarts the machine. `Arrived` fires its side effects exactly
//! once; later fixes near the destination are ignored.
//!
//! The tracker is a pure state machine: it consumes signals and returns
//! decisions, and the session executes the side effects (events, voice,
//! view updates, timers). That keeps every transition deterministic under test.

use crate::config::TrackerConfig;
use crate::geofence::{FenceEvent, FenceEventKind};
use crate::offroute::CorridorCheck;
use crate::route::Route;
use log::{debug, info, warn};

/// Navigation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    /// No destination set.
    Idle,
    /// Directions requested, awaiting a route.
    RouteLoading,
    /// Tracking a navigable route.
    RouteValid,
    /// Off-route confirmed; awaiting fresh directions.
    Rerouting,
    /// Destination reached.
    Arrived,
    /// Route failed validity thresholds. Absorbing for this route.
    RouteInvalid,
}

/// Outcome of feeding a computed route to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    /// Route accepted; tracking (re)starts from step 0.
    Accepted {
        /// True only for the first accepted route of the session.
        first_route: bool,
        /// True when this route replaced one during a reroute.
        rerouted: bool,
    },
    /// Route failed thresholds while loading. The machine is now `RouteInvalid`.
    Rejected { step_count: usize, distance_m: f64 },
    /// A reroute produced a too-short route; the previous route stays in
    /// effect and tracking resumes where it left off.
    KeptPrevious,
}

/// Tracks navigation phase and step progression.
pub struct ProgressTracker {
    config: TrackerConfig,
    phase: NavPhase,
    current_step: usize,
    selected_step: Option<usize>,
    reroute_allowed: bool,
    start_reroute_allowed: bool,
    monitoring_settled: bool,
    had_first_route: bool,
    arrived: bool,
}

impl ProgressTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            phase: NavPhase::Idle,
            current_step: 0,
            selected_step: None,
            reroute_allowed: true,
            start_reroute_allowed: true,
            monitoring_settled: false,
            had_first_route: false,
            arrived: false,
        }
    }

    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    /// Index of the step the user is currently executing.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Step the user selected in a list UI, if any. Selection is a preview;
    /// it never changes `current_step`.
    pub fn selected_step(&self) -> Option<usize> {
        self.selected_step
    }

    pub fn select_step(&mut self, index: usize) {
        self.selected_step = Some(index);
    }

    /// A new destination was set and directions were requested.
    pub fn begin_loading(&mut self) {
        self.phase = NavPhase::RouteLoading;
        self.current_step = 0;
        self.selected_step = None;
        self.monitoring_settled = false;
        self.arrived = false;
    }

    /// Feed a freshly computed route.
    ///
    /// While loading, a route failing both validity thresholds moves the
    /// machine to `RouteInvalid`. During a reroute the previous route is kept
    /// instead, since the user is already driving it.
    pub fn route_computed(&mut self, route: &Route) -> RouteDecision {
        if !route.is_navigable(&self.config) {
            return match self.phase {
                NavPhase::Rerouting => {
                    warn!(
                        "reroute returned non-navigable route ({} steps, {:.0}m); keeping previous",
                        route.step_count(),
                        route.total_distance_m
                    );
                    self.phase = NavPhase::RouteValid;
                    RouteDecision::KeptPrevious
                }
                _ => {
                    info!(
                        "route rejected: {} steps, {:.0}m",
                        route.step_count(),
                        route.total_distance_m
                    );
                    self.phase = NavPhase::RouteInvalid;
                    RouteDecision::Rejected {
                        step_count: route.step_count(),
                        distance_m: route.total_distance_m,
                    }
                }
            };
        }

        let rerouted = self.phase == NavPhase::Rerouting;
        let first_route = !self.had_first_route;
        self.had_first_route = true;
        self.phase = NavPhase::RouteValid;
        self.current_step = 0;
        self.selected_step = None;
        self.monitoring_settled = false;
        self.arrived = false;
        info!(
            "route accepted: {} steps, {:.0}m{}",
            route.step_count(),
            route.total_distance_m,
            if rerouted { " (reroute)" } else { "" }
        );
        RouteDecision::Accepted { first_route, rerouted }
    }

    /// Feed a geofence transition. Returns the new step index when the event
    /// confirms an advancement.
    ///
    /// Advancement is monotonic non-decreasing: stale or backward events are
    /// ignored, and re-entering the current step's fences never re-fires.
    /// A `DeterminedInside` for step 0 arriving before monitoring has settled
    /// is only honored within the corridor distance of the fence anchor, to
    /// avoid premature advancement from a coarse initial fix.
    pub fn on_fence_event(&mut self, event: &FenceEvent) -> Option<usize> {
        if !matches!(self.phase, NavPhase::RouteValid | NavPhase::Rerouting) {
            return None;
        }

        let qualifies = match event.kind {
            FenceEventKind::Entered => {
                self.monitoring_settled = true;
                true
            }
            FenceEventKind::DeterminedInside => {
                let tight_enough = if !self.monitoring_settled && event.step_index == 0 {
                    event.distance_m <= self.config.corridor_m
                } else {
                    true
                };
                if tight_enough {
                    self.monitoring_settled = true;
                }
                tight_enough
            }
            FenceEventKind::Exited => false,
        };
        if !qualifies {
            debug!(
                "ignored {:?} for step {} (unsettled, {:.0}m from anchor)",
                event.kind, event.step_index, event.distance_m
            );
            return None;
        }

        if event.step_index <= self.current_step {
            // Step 0 confirmation keeps index 0 but counts as settling.
            return None;
        }

        self.current_step = event.step_index;
        info!("advanced to step {}/{}", event.step_index, event.step_count);
        Some(event.step_index)
    }

    /// Feed a corridor check result. Returns true when a reroute should be
    /// requested: the fix is off the path and the cooldown gate is open.
    /// Triggering closes the gate, so at most one reroute is in flight.
    pub fn on_corridor_check(&mut self, check: CorridorCheck) -> bool {
        if self.phase != NavPhase::RouteValid {
            return false;
        }
        let CorridorCheck::OffPath { deviation_m } = check else {
            return false;
        };
        if !(self.reroute_allowed && self.start_reroute_allowed) {
            debug!("off path ({:.0}m) but reroute cooling down", deviation_m);
            return false;
        }

        self.reroute_allowed = false;
        self.start_reroute_allowed = false;
        self.phase = NavPhase::Rerouting;
        info!("off path by {:.0}m, requesting reroute", deviation_m);
        true
    }

    /// A directions request made during `Rerouting` failed. The previous
    /// route stays in effect.
    pub fn reroute_failed(&mut self) {
        if self.phase == NavPhase::Rerouting {
            self.phase = NavPhase::RouteValid;
        }
    }

    /// The reroute cooldown elapsed; both permission flags re-arm.
    pub fn cooldown_elapsed(&mut self) {
        self.reroute_allowed = true;
        self.start_reroute_allowed = true;
        debug!("reroute cooldown elapsed");
    }

    /// Whether a reroute may currently be requested.
    pub fn reroute_gate_open(&self) -> bool {
        self.reroute_allowed && self.start_reroute_allowed
    }

    /// Feed the distance from the live fix to the destination. Returns true
    /// exactly once, when the fix first comes within the arrival radius.
    pub fn check_arrival(&mut self, distance_to_destination_m: f64) -> bool {
        if self.phase != NavPhase::RouteValid || self.arrived {
            return false;
        }
        if distance_to_destination_m > self.config.arrival_radius_m {
            return false;
        }
        self.arrived = true;
        self.phase = NavPhase::Arrived;
        info!("arrived ({:.1}m from destination)", distance_to_destination_m);
        true
    }

    /// End the navigation session.
    pub fn reset(&mut self) {
        self.phase = NavPhase::Idle;
        self.current_step = 0;
        self.selected_step = None;
        self.reroute_allowed = true;
        self.start_reroute_allowed = true;
        self.monitoring_settled = false;
        self.had_first_route = false;
        self.arrived = false;
    }
}
