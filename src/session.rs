//! # Navigation Session
//!
//! Wires the tracker, region monitor, off-route detector, info poller, timers,
//! views, and host services into one guidance engine. The host drives the
//! session from its UI queue with three calls:
//!
//! - [`set_destination`](NavigationSession::set_destination) when the user picks a place
//! - [`on_position`](NavigationSession::on_position) for every location fix
//! - [`tick`](NavigationSession::tick) from its run-loop timer
//!
//! All timestamps are [`Duration`] offsets from session start supplied by the
//! host, so the whole engine is deterministic: feeding the same fixes and
//! ticks always produces the same events.
//!
//! Only one reroute is in flight at a time; the tracker's cooldown flags are
//! the lock. Teardown ([`pause`](NavigationSession::pause)) stops region
//! monitoring and cancels every timer; [`resume`](NavigationSession::resume)
//! re-arms them against the same route.

use crate::config::TrackerConfig;
use crate::error::NavError;
use crate::events::{EventBus, NavEvent, NavObserver};
use crate::geo_utils;
use crate::geofence::{FenceEvent, RegionMonitor};
use crate::offroute::{CorridorCheck, OffRouteDetector};
use crate::poller::InfoPoller;
use crate::prefs::UserPrefs;
use crate::progress::{NavPhase, ProgressTracker, RouteDecision};
use crate::providers::{DirectionsProvider, SoundCue, TransportMode, VoiceOutput};
use crate::route::Route;
use crate::timers::TimerRegistry;
use crate::views::GuidanceView;
use crate::GeoPoint;
use log::{debug, info, warn};
use std::time::Duration;

// Logical timer task names.
const TASK_REROUTE_COOLDOWN: &str = "reroute-cooldown";
const TASK_DIRECTIONS_RETRY: &str = "directions-retry";
const TASK_ETA_REFRESH: &str = "eta-refresh";

/// A turn-by-turn guidance session.
pub struct NavigationSession {
    config: TrackerConfig,
    tracker: ProgressTracker,
    monitor: RegionMonitor,
    detector: OffRouteDetector,
    poller: InfoPoller,
    timers: TimerRegistry,
    bus: EventBus,
    views: Vec<Box<dyn GuidanceView>>,
    directions: Box<dyn DirectionsProvider>,
    voice: Box<dyn VoiceOutput>,
    prefs: UserPrefs,
    route: Option<Route>,
    destination: Option<GeoPoint>,
    mode: TransportMode,
    last_fix: Option<GeoPoint>,
    paused: bool,
}

impl NavigationSession {
    pub fn new(
        config: TrackerConfig,
        directions: Box<dyn DirectionsProvider>,
        voice: Box<dyn VoiceOutput>,
        prefs: UserPrefs,
    ) -> Self {
        Self {
            tracker: ProgressTracker::new(config.clone()),
            detector: OffRouteDetector::new(&config),
            monitor: RegionMonitor::new(),
            poller: InfoPoller::new(),
            timers: TimerRegistry::new(),
            bus: EventBus::new(),
            views: Vec::new(),
            directions,
            voice,
            prefs,
            route: None,
            destination: None,
            mode: TransportMode::Walking,
            last_fix: None,
            paused: false,
            config,
        }
    }

    /// Register a guidance view (map, AR). Views receive route and step
    /// updates until the session ends.
    pub fn add_view(&mut self, view: Box<dyn GuidanceView>) {
        self.views.push(view);
    }

    /// Register an event observer.
    pub fn add_observer(&mut self, observer: Box<dyn NavObserver>) {
        self.bus.subscribe(observer);
    }

    pub fn phase(&self) -> NavPhase {
        self.tracker.phase()
    }

    pub fn current_step(&self) -> usize {
        self.tracker.current_step()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn prefs(&self) -> &UserPrefs {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut UserPrefs {
        &mut self.prefs
    }

    // =========================================================================
    // Host entry points
    // =========================================================================

    /// Set a fresh destination and request directions. Clears any previous
    /// route, including an absorbing `RouteInvalid` from an earlier attempt.
    pub fn set_destination(&mut self, destination: GeoPoint, mode: TransportMode, now: Duration) {
        info!(
            "destination set ({:.5}, {:.5}), {:?}",
            destination.latitude, destination.longitude, mode
        );
        self.destination = Some(destination);
        self.mode = mode;
        self.route = None;
        self.monitor.clear();
        self.timers.cancel_all();
        self.tracker.begin_loading();
        for view in &mut self.views {
            view.set_destination(destination);
        }
        self.request_directions(now);
    }

    /// Feed a position fix from the location provider.
    pub fn on_position(&mut self, fix: GeoPoint, now: Duration) {
        self.last_fix = Some(fix);
        if self.paused {
            return;
        }

        for view in &mut self.views {
            view.recenter(fix);
        }

        let fence_events = self.monitor.update(&fix);
        self.handle_fence_events(fence_events);

        self.check_arrival(fix);
        self.run_off_route_check(now);
    }

    /// Advance the session clock: fires due timers and the periodic
    /// off-route poll against the last known fix.
    pub fn tick(&mut self, now: Duration) {
        if self.paused {
            return;
        }

        for task in self.timers.tick(now) {
            match task.as_str() {
                TASK_REROUTE_COOLDOWN => self.tracker.cooldown_elapsed(),
                TASK_DIRECTIONS_RETRY => self.request_directions(now),
                TASK_ETA_REFRESH => self.refresh_eta(),
                other => warn!("unknown timer task fired: {other}"),
            }
        }

        self.run_off_route_check(now);
    }

    /// Preview a step from the list UI. Never changes the current step.
    pub fn select_step(&mut self, step_index: usize) {
        self.tracker.select_step(step_index);
        for view in &mut self.views {
            view.go_to_step(step_index);
        }
    }

    /// Teardown path for session end or app backgrounding: stop region
    /// monitoring and invalidate every timer.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.monitor.stop();
        self.timers.cancel_all();
        info!("session paused");
    }

    /// Re-arm monitoring and timers on foreground resume. The fence set is
    /// unchanged, so monitoring resumes against the identical regions. A
    /// directions request that was pending when the session paused is
    /// reissued, so a session backgrounded while loading still gets a route.
    pub fn resume(&mut self, now: Duration) {
        if !self.paused {
            return;
        }
        self.paused = false;
        let initial = self.monitor.start(self.last_fix.as_ref());
        self.handle_fence_events(initial);
        if self.route.is_some() {
            self.timers.schedule_repeating(
                TASK_ETA_REFRESH,
                now + self.config.eta_refresh_interval,
                self.config.eta_refresh_interval,
            );
        } else if self.tracker.phase() == NavPhase::RouteLoading {
            // pause() cancelled any pending directions-retry timer
            self.request_directions(now);
        }
        // If the gate was closed when we went to background, restart the
        // full cooldown rather than guessing how much had elapsed.
        if !self.tracker.reroute_gate_open() {
            self.timers
                .schedule_once(TASK_REROUTE_COOLDOWN, now + self.config.reroute_cooldown);
        }
        self.detector.reset();
        info!("session resumed");
    }

    /// End the navigation session and drop the route.
    pub fn end(&mut self) {
        self.tracker.reset();
        self.monitor.clear();
        self.timers.cancel_all();
        self.route = None;
        self.destination = None;
        self.paused = false;
        info!("session ended");
    }

    // =========================================================================
    // Internal plumbing
    // =========================================================================

    fn request_directions(&mut self, now: Duration) {
        let Some(destination) = self.destination else {
            return;
        };
        let Some(origin) = self.last_fix else {
            debug!("no fix yet, retrying directions shortly");
            self.timers.schedule_once(
                TASK_DIRECTIONS_RETRY,
                now + self.config.directions_retry_delay,
            );
            return;
        };

        match self.directions.compute_route(origin, destination, self.mode) {
            Ok(route) => self.accept_route(route, now),
            Err(NavError::LocationUnavailable) => {
                self.timers.schedule_once(
                    TASK_DIRECTIONS_RETRY,
                    now + self.config.directions_retry_delay,
                );
            }
            Err(err) => {
                warn!("directions request failed: {err}");
                if self.tracker.phase() == NavPhase::Rerouting {
                    self.tracker.reroute_failed();
                    self.timers.schedule_once(
                        TASK_REROUTE_COOLDOWN,
                        now + self.config.reroute_cooldown,
                    );
                }
                self.voice.play_sound(SoundCue::Error);
                self.bus
                    .publish(NavEvent::GuidanceError { message: err.to_string() });
            }
        }
    }

    fn accept_route(&mut self, route: Route, now: Duration) {
        match self.tracker.route_computed(&route) {
            RouteDecision::Accepted { first_route, rerouted } => {
                let step_count = route.step_count();
                let total_distance_m = route.total_distance_m;
                let departure = route
                    .steps
                    .first()
                    .map(|s| s.instruction.clone())
                    .unwrap_or_default();

                self.monitor.set_route(&route, &self.config);
                for view in &mut self.views {
                    view.set_route(&route);
                }
                self.route = Some(route);
                self.detector.reset();

                self.bus.publish(NavEvent::RouteAccepted {
                    first_route,
                    step_count,
                    total_distance_m,
                });
                if !self.prefs.muted && !departure.is_empty() {
                    self.voice.speak(&departure);
                }

                if rerouted {
                    self.timers.schedule_once(
                        TASK_REROUTE_COOLDOWN,
                        now + self.config.reroute_cooldown,
                    );
                }
                self.timers.schedule_repeating(
                    TASK_ETA_REFRESH,
                    now + self.config.eta_refresh_interval,
                    self.config.eta_refresh_interval,
                );

                let initial = self.monitor.start(self.last_fix.as_ref());
                self.handle_fence_events(initial);
            }
            RouteDecision::Rejected { step_count, distance_m } => {
                self.route = None;
                self.voice.play_sound(SoundCue::Error);
                self.bus
                    .publish(NavEvent::RouteRejected { step_count, distance_m });
            }
            RouteDecision::KeptPrevious => {
                self.timers.schedule_once(
                    TASK_REROUTE_COOLDOWN,
                    now + self.config.reroute_cooldown,
                );
                self.bus.publish(NavEvent::GuidanceError {
                    message: "recalculated route unusable, keeping current route".to_string(),
                });
            }
        }
    }

    fn handle_fence_events(&mut self, events: Vec<FenceEvent>) {
        for event in events {
            let Some(step_index) = self.tracker.on_fence_event(&event) else {
                continue;
            };
            let (instruction, step_count) = match &self.route {
                Some(route) => (
                    route
                        .steps
                        .get(step_index)
                        .map(|s| s.instruction.clone())
                        .unwrap_or_default(),
                    route.step_count(),
                ),
                None => continue,
            };

            for view in &mut self.views {
                view.go_to_step(step_index);
            }
            if !self.prefs.muted && !instruction.is_empty() {
                self.voice.speak(&instruction);
            }
            self.bus.publish(NavEvent::StepChanged {
                step_index,
                step_count,
                instruction,
            });
        }
    }

    fn check_arrival(&mut self, fix: GeoPoint) {
        let Some(destination) = self.route.as_ref().and_then(|r| r.destination()) else {
            return;
        };
        let distance = geo_utils::haversine_distance(&fix, &destination);
        if self.tracker.check_arrival(distance) {
            self.monitor.stop();
            self.timers.cancel_named(TASK_ETA_REFRESH);
            self.voice.play_sound(SoundCue::Arrival);
            self.bus.publish(NavEvent::Arrived);
        }
    }

    fn run_off_route_check(&mut self, now: Duration) {
        let Some(fix) = self.last_fix else { return };
        let Some(route) = &self.route else { return };
        if self.tracker.phase() != NavPhase::RouteValid {
            return;
        }

        let polyline = route.full_polyline();
        let Some(check) = self.detector.poll(now, &fix, &polyline) else {
            return;
        };
        if let CorridorCheck::OffPath { .. } = check {
            if self.tracker.on_corridor_check(check) {
                self.voice.play_sound(SoundCue::Reroute);
                self.bus.publish(NavEvent::RerouteRequested { from: fix });
                self.request_directions(now);
            }
        }
    }

    fn refresh_eta(&mut self) {
        let (Some(fix), Some(destination)) = (self.last_fix, self.destination) else {
            return;
        };
        let event = self
            .poller
            .refresh(&mut *self.directions, fix, destination, self.mode);
        self.bus.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::recording::EventLog;
    use crate::providers::doubles::{RecordingVoice, ScriptedDirections};
    use crate::route::RouteStep;

    const LNG: f64 = -0.1278;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn step(instruction: &str, from_lat: f64, to_lat: f64, lng: f64) -> RouteStep {
        RouteStep::new(
            instruction,
            vec![GeoPoint::new(from_lat, lng), GeoPoint::new(to_lat, lng)],
        )
    }

    /// Three steps heading north, ~111m each: A(""), B("turn left"), C("arrive").
    fn scenario_route() -> Route {
        Route::new(vec![
            step("", 51.5000, 51.5010, LNG),
            step("turn left", 51.5010, 51.5020, LNG),
            step("arrive", 51.5020, 51.5030, LNG),
        ])
    }

    /// Reroute result starting at the off-path position, rejoining the path.
    fn rerouted_route(from: GeoPoint) -> Route {
        Route::new(vec![
            RouteStep::new(
                "",
                vec![from, GeoPoint::new(51.5020, from.longitude)],
            ),
            RouteStep::new(
                "continue north",
                vec![
                    GeoPoint::new(51.5020, from.longitude),
                    GeoPoint::new(51.5021, from.longitude),
                    GeoPoint::new(51.5030, from.longitude),
                ],
            ),
        ])
    }

    fn short_route() -> Route {
        let p = vec![GeoPoint::new(51.5, LNG), GeoPoint::new(51.50001, LNG)];
        Route::new(vec![
            RouteStep::new("a", p.clone()),
            RouteStep::new("b", p.clone()),
            RouteStep::new("c", p),
        ])
    }

    struct Harness {
        session: NavigationSession,
        events: EventLog,
        voice: RecordingVoice,
        calls: std::rc::Rc<std::cell::RefCell<u32>>,
    }

    fn harness_with(responses: Vec<crate::error::Result<Route>>, prefs: UserPrefs) -> Harness {
        let provider = ScriptedDirections::new(responses);
        let calls = provider.call_counter();
        let voice = RecordingVoice::new();
        let events = EventLog::new();
        let mut session = NavigationSession::new(
            TrackerConfig::default(),
            Box::new(provider),
            Box::new(voice.clone()),
            prefs,
        );
        session.add_observer(Box::new(events.clone()));
        Harness { session, events, voice, calls }
    }

    fn harness(responses: Vec<crate::error::Result<Route>>) -> Harness {
        harness_with(responses, UserPrefs::default())
    }

    fn start_fix() -> GeoPoint {
        // 11m south of the route origin: inside step 0's first fence only
        GeoPoint::new(51.49990, LNG)
    }

    fn destination() -> GeoPoint {
        GeoPoint::new(51.5030, LNG)
    }

    fn off_path_fix() -> GeoPoint {
        // ~50m east of the corridor
        GeoPoint::new(51.5011, LNG + 0.00072)
    }

    #[test]
    fn test_guidance_scenario_end_to_end() {
        let off = off_path_fix();
        let mut h = harness(vec![Ok(scenario_route()), Ok(rerouted_route(off))]);

        // Fix arrives, then the destination is set: route loads and validates
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
        assert_eq!(
            h.events.count_matching(|e| matches!(e, NavEvent::RouteAccepted { first_route: true, .. })),
            1
        );

        // Entering B's geofence advances to step 1 and speaks its instruction
        h.session.on_position(GeoPoint::new(51.5011, LNG), secs(1));
        assert_eq!(h.session.current_step(), 1);
        assert_eq!(h.voice.spoken.borrow().as_slice(), ["turn left"]);

        // Drifting ~50m off the path triggers exactly one reroute
        h.session.on_position(off, secs(6));
        assert_eq!(
            h.events.count_matching(|e| matches!(e, NavEvent::RerouteRequested { .. })),
            1
        );
        assert_eq!(*h.calls.borrow(), 2);

        // Fresh route accepted: step index reset, cooldown holds the gate
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
        assert_eq!(h.session.current_step(), 0);

        // A second off-route fix inside the cooldown window does nothing
        h.session.on_position(GeoPoint::new(51.5011, LNG - 0.0010), secs(12));
        assert_eq!(
            h.events.count_matching(|e| matches!(e, NavEvent::RerouteRequested { .. })),
            1
        );
        assert_eq!(*h.calls.borrow(), 2);
    }

    #[test]
    fn test_cooldown_reopens_reroute_gate() {
        let off = off_path_fix();
        let mut h = harness(vec![
            Ok(scenario_route()),
            Ok(rerouted_route(off)),
            Ok(scenario_route()),
        ]);

        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        h.session.on_position(off, secs(6));
        assert_eq!(*h.calls.borrow(), 2);

        // Cooldown (15s) elapses at t=21; the next off-path poll reroutes again
        h.session.tick(secs(21));
        h.session.on_position(GeoPoint::new(51.5011, LNG - 0.0010), secs(27));
        assert_eq!(
            h.events.count_matching(|e| matches!(e, NavEvent::RerouteRequested { .. })),
            2
        );
        assert_eq!(*h.calls.borrow(), 3);
    }

    #[test]
    fn test_invalid_route_is_rejected_and_absorbing() {
        let mut h = harness(vec![Ok(short_route())]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));

        assert_eq!(h.session.phase(), NavPhase::RouteInvalid);
        assert_eq!(
            h.events.count_matching(|e| matches!(e, NavEvent::RouteRejected { step_count: 3, .. })),
            1
        );
        assert!(h.session.route().is_none());
        // Error cue played, nothing spoken
        assert_eq!(h.voice.sounds.borrow().as_slice(), [SoundCue::Error]);

        // Position updates in the absorbing state change nothing
        h.session.on_position(GeoPoint::new(51.5011, LNG), secs(5));
        assert_eq!(h.session.phase(), NavPhase::RouteInvalid);
    }

    #[test]
    fn test_fresh_destination_escapes_route_invalid() {
        let mut h = harness(vec![Ok(short_route()), Ok(scenario_route())]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        assert_eq!(h.session.phase(), NavPhase::RouteInvalid);

        h.session.set_destination(destination(), TransportMode::Walking, secs(5));
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
    }

    #[test]
    fn test_missing_fix_retries_instead_of_surfacing() {
        let mut h = harness(vec![Ok(scenario_route())]);
        // No position fix yet
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        assert_eq!(h.session.phase(), NavPhase::RouteLoading);
        assert_eq!(*h.calls.borrow(), 0);
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::GuidanceError { .. })), 0);

        // Fix arrives, retry timer fires, directions succeed
        h.session.on_position(start_fix(), secs(1));
        h.session.tick(secs(1));
        assert_eq!(*h.calls.borrow(), 1);
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
    }

    #[test]
    fn test_directions_error_surfaces_but_keeps_tracking() {
        let off = off_path_fix();
        let mut h = harness(vec![
            Ok(scenario_route()),
            Err(NavError::Directions("server unreachable".into())),
        ]);

        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        h.session.on_position(GeoPoint::new(51.5011, LNG), secs(1));
        assert_eq!(h.session.current_step(), 1);

        // Reroute attempt fails: error surfaced, last known step preserved
        h.session.on_position(off, secs(6));
        assert_eq!(
            h.events.count_matching(|e| matches!(e, NavEvent::GuidanceError { .. })),
            1
        );
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
        assert_eq!(h.session.current_step(), 1);
        assert!(h.voice.sounds.borrow().contains(&SoundCue::Error));
    }

    #[test]
    fn test_arrival_fires_once_with_sound() {
        let mut h = harness(vec![Ok(scenario_route())]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));

        // Within 10m of the destination
        h.session.on_position(GeoPoint::new(51.50295, LNG), secs(10));
        assert_eq!(h.session.phase(), NavPhase::Arrived);
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::Arrived)), 1);

        // Later fixes at the destination never re-fire arrival
        h.session.on_position(GeoPoint::new(51.5030, LNG), secs(15));
        h.session.on_position(GeoPoint::new(51.5030, LNG), secs(20));
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::Arrived)), 1);
        let arrival_sounds = h
            .voice
            .sounds
            .borrow()
            .iter()
            .filter(|c| **c == SoundCue::Arrival)
            .count();
        assert_eq!(arrival_sounds, 1);
    }

    #[test]
    fn test_muted_sessions_never_speak() {
        let prefs = UserPrefs { muted: true, ..UserPrefs::default() };
        let mut h = harness_with(vec![Ok(scenario_route())], prefs);

        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        h.session.on_position(GeoPoint::new(51.5011, LNG), secs(1));

        assert_eq!(h.session.current_step(), 1);
        assert!(h.voice.spoken.borrow().is_empty());
        // Step change event still flows to the UI
        assert_eq!(
            h.events.count_matching(|e| matches!(e, NavEvent::StepChanged { step_index: 1, .. })),
            1
        );
    }

    #[test]
    fn test_eta_refresh_on_its_own_cadence() {
        let mut h = harness(vec![
            Ok(scenario_route()),
            Ok(rerouted_route(start_fix())),
        ]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));

        // Before the refresh interval nothing is published
        h.session.tick(secs(10));
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::EtaUpdated { .. })), 0);

        h.session.tick(secs(30));
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::EtaUpdated { .. })), 1);
    }

    #[test]
    fn test_eta_failure_only_updates_label() {
        let mut h = harness(vec![
            Ok(scenario_route()),
            Err(NavError::Directions("offline".into())),
        ]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));

        h.session.tick(secs(30));
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::EtaUnavailable { .. })), 1);
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
    }

    #[test]
    fn test_pause_silences_resume_rearms() {
        let mut h = harness(vec![
            Ok(scenario_route()),
            Ok(rerouted_route(start_fix())),
        ]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));

        h.session.pause();
        assert!(h.session.is_paused());

        // While paused: no step advancement, no timers
        h.session.on_position(GeoPoint::new(51.5011, LNG), secs(5));
        h.session.tick(secs(40));
        assert_eq!(h.session.current_step(), 0);
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::EtaUpdated { .. })), 0);

        // Resume re-arms monitoring and the ETA cadence
        h.session.resume(secs(41));
        h.session.on_position(GeoPoint::new(51.5011, LNG), secs(42));
        assert_eq!(h.session.current_step(), 1);
        h.session.tick(secs(71));
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::EtaUpdated { .. })), 1);
    }

    #[test]
    fn test_resume_while_loading_retries_directions() {
        let mut h = harness(vec![Ok(scenario_route())]);
        // Destination set before the first fix, then backgrounded while the
        // retry timer is pending
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        h.session.pause();
        h.session.resume(secs(2));
        assert_eq!(h.session.phase(), NavPhase::RouteLoading);

        // A fix arrives and the reissued retry fires
        h.session.on_position(start_fix(), secs(3));
        h.session.tick(secs(3));
        assert_eq!(*h.calls.borrow(), 1);
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
    }

    #[test]
    fn test_resume_requests_immediately_when_fix_is_known() {
        let mut h = harness(vec![
            Err(NavError::LocationUnavailable),
            Ok(scenario_route()),
        ]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        assert_eq!(h.session.phase(), NavPhase::RouteLoading);

        // Paused while the provider's location warm-up retry was pending
        h.session.pause();
        h.session.resume(secs(2));
        assert_eq!(*h.calls.borrow(), 2);
        assert_eq!(h.session.phase(), NavPhase::RouteValid);
    }

    #[test]
    fn test_resume_never_retries_rejected_route() {
        let mut h = harness(vec![Ok(short_route())]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        assert_eq!(h.session.phase(), NavPhase::RouteInvalid);

        // Backgrounding and resuming must not resurrect the rejected route
        h.session.pause();
        h.session.resume(secs(5));
        h.session.tick(secs(10));
        assert_eq!(*h.calls.borrow(), 1);
        assert_eq!(h.session.phase(), NavPhase::RouteInvalid);
    }

    #[test]
    fn test_end_returns_to_idle() {
        let mut h = harness(vec![Ok(scenario_route())]);
        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        h.session.end();

        assert_eq!(h.session.phase(), NavPhase::Idle);
        assert!(h.session.route().is_none());

        // Nothing fires after teardown
        h.session.tick(secs(60));
        assert_eq!(h.events.count_matching(|e| matches!(e, NavEvent::EtaUpdated { .. })), 0);
    }

    #[test]
    fn test_views_follow_route_and_steps() {
        use crate::views::{ArView, MapView};
        use std::cell::RefCell;
        use std::rc::Rc;

        let map = Rc::new(RefCell::new(MapView::new()));
        let ar = Rc::new(RefCell::new(ArView::new()));

        let mut h = harness(vec![Ok(scenario_route())]);
        h.session.add_view(Box::new(Rc::clone(&map)));
        h.session.add_view(Box::new(Rc::clone(&ar)));

        h.session.on_position(start_fix(), secs(0));
        h.session.set_destination(destination(), TransportMode::Walking, secs(0));
        assert_eq!(map.borrow().polyline().len(), 6);
        assert_eq!(ar.borrow().anchors().len(), 6);

        h.session.on_position(GeoPoint::new(51.5011, LNG), secs(1));
        assert_eq!(map.borrow().highlighted_step(), Some(1));
        assert_eq!(ar.borrow().active_step(), Some(1));
    }
}
