//! Simulate a user drifting off the route and the reroute rate limiting
//! that follows.
//!
//! Run with: cargo run --example reroute_simulation

use route_tracker::{
    DirectionsProvider, GeoPoint, NavEvent, NavigationSession, NavObserver, Result, Route,
    RouteStep, SoundCue, TrackerConfig, TransportMode, UserPrefs, VoiceOutput,
};
use std::time::Duration;

/// Directions that always route straight north from the requested origin.
struct NorthboundDirections {
    requests: u32,
}

impl DirectionsProvider for NorthboundDirections {
    fn compute_route(
        &mut self,
        origin: GeoPoint,
        destination: GeoPoint,
        _mode: TransportMode,
    ) -> Result<Route> {
        self.requests += 1;
        println!("  [directions] request #{} from ({:.4}, {:.4})",
            self.requests, origin.latitude, origin.longitude);
        let mid = GeoPoint::new(
            (origin.latitude + destination.latitude) / 2.0,
            origin.longitude,
        );
        Ok(Route::new(vec![
            RouteStep::new("head north", vec![origin, mid]),
            RouteStep::new("continue to destination", vec![mid, destination]),
        ]))
    }
}

struct SilentVoice;

impl VoiceOutput for SilentVoice {
    fn speak(&mut self, _text: &str) {}
    fn play_sound(&mut self, _cue: SoundCue) {}
}

struct RerouteLogger;

impl NavObserver for RerouteLogger {
    fn on_event(&mut self, event: &NavEvent) {
        match event {
            NavEvent::RouteAccepted { first_route, total_distance_m, .. } => {
                println!("  [event] route accepted (first: {first_route}, {total_distance_m:.0}m)");
            }
            NavEvent::RerouteRequested { from } => {
                println!("  [event] reroute from ({:.4}, {:.4})", from.latitude, from.longitude);
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let config = TrackerConfig::default();
    println!("Reroute Simulation");
    println!(
        "corridor: {}m, poll every {:?}, cooldown {:?}\n",
        config.corridor_m, config.off_route_interval, config.reroute_cooldown
    );

    let mut session = NavigationSession::new(
        config,
        Box::new(NorthboundDirections { requests: 0 }),
        Box::new(SilentVoice),
        UserPrefs::default(),
    );
    session.add_observer(Box::new(RerouteLogger));

    session.on_position(GeoPoint::new(51.5000, -0.1278), Duration::from_secs(0));
    session.set_destination(
        GeoPoint::new(51.5040, -0.1278),
        TransportMode::Walking,
        Duration::from_secs(0),
    );

    // Drift steadily east, away from the northbound corridor. Each fix is
    // five seconds apart so every one is eligible for an off-route poll,
    // but the cooldown allows at most one reroute per fifteen seconds.
    for i in 1..=8u64 {
        let now = Duration::from_secs(i * 5);
        let fix = GeoPoint::new(51.5005, -0.1278 + 0.0002 * i as f64);
        println!("t={:>2}s fix ({:.4}, {:.4})", now.as_secs(), fix.latitude, fix.longitude);
        session.on_position(fix, now);
        session.tick(now);
    }

    println!("\nfinal phase: {:?}", session.phase());
}
