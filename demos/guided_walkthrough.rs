//! Walk a simulated user along a three-step route and print guidance output.
//!
//! Run with: cargo run --example guided_walkthrough

use route_tracker::{
    DirectionsProvider, GeoPoint, NavEvent, NavigationSession, NavObserver, Result, Route,
    RouteStep, SoundCue, TrackerConfig, TransportMode, UserPrefs, VoiceOutput,
};
use std::time::Duration;

/// Canned directions: a straight walk north through central London.
struct FixedDirections;

impl DirectionsProvider for FixedDirections {
    fn compute_route(
        &mut self,
        _origin: GeoPoint,
        _destination: GeoPoint,
        _mode: TransportMode,
    ) -> Result<Route> {
        Ok(Route::new(vec![
            RouteStep::new(
                "head north on Whitehall",
                vec![
                    GeoPoint::new(51.5030, -0.1260),
                    GeoPoint::new(51.5040, -0.1260),
                ],
            ),
            RouteStep::new(
                "turn left onto Horse Guards",
                vec![
                    GeoPoint::new(51.5040, -0.1260),
                    GeoPoint::new(51.5050, -0.1260),
                ],
            ),
            RouteStep::new(
                "arrive at the park",
                vec![
                    GeoPoint::new(51.5050, -0.1260),
                    GeoPoint::new(51.5060, -0.1260),
                ],
            ),
        ]))
    }
}

struct ConsoleVoice;

impl VoiceOutput for ConsoleVoice {
    fn speak(&mut self, text: &str) {
        println!("  [voice] \"{text}\"");
    }

    fn play_sound(&mut self, cue: SoundCue) {
        println!("  [sound] {cue:?}");
    }
}

struct ConsoleObserver;

impl NavObserver for ConsoleObserver {
    fn on_event(&mut self, event: &NavEvent) {
        println!("  [event] {event:?}");
    }
}

fn main() {
    env_logger::init();

    let mut session = NavigationSession::new(
        TrackerConfig::default(),
        Box::new(FixedDirections),
        Box::new(ConsoleVoice),
        UserPrefs::default(),
    );
    session.add_observer(Box::new(ConsoleObserver));

    println!("Guided Walkthrough\n");

    // GPS comes up, then the user picks a destination
    session.on_position(GeoPoint::new(51.5029, -0.1260), Duration::from_secs(0));
    session.set_destination(
        GeoPoint::new(51.5060, -0.1260),
        TransportMode::Walking,
        Duration::from_secs(0),
    );
    println!("phase after route: {:?}\n", session.phase());

    // Walk north; each fix is one second apart
    let track = [
        51.5032, 51.5036, 51.5041, 51.5045, 51.5051, 51.5055, 51.5059, 51.5060,
    ];
    for (i, lat) in track.iter().enumerate() {
        let now = Duration::from_secs(1 + i as u64);
        session.on_position(GeoPoint::new(*lat, -0.1260), now);
        session.tick(now);
    }

    println!("\nfinal phase: {:?}", session.phase());
    println!("final step:  {}", session.current_step());
}
