//! Host-supplied service traits.
//!
//! The core never talks to the network, the speaker, or disk itself. The host app
//! hands in implementations of these traits when it builds a session; the core
//! calls them at well-defined points. No global service singletons: every
//! dependency is an explicitly passed handle, swappable in tests.

use crate::error::Result;
use crate::route::Route;
use crate::GeoPoint;
use serde::{Deserialize, Serialize};

/// How the user is traveling. Forwarded to the directions provider, which may
/// use it to pick road networks and speed models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    Walking,
    Driving,
}

/// Computes routes. Implemented by the host over its map/directions service.
///
/// Calls are synchronous from the core's point of view; a host bridging an
/// async SDK resolves the future on its own queue before resuming the core.
pub trait DirectionsProvider {
    /// Compute a route from `origin` to `destination`.
    fn compute_route(
        &mut self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Route>;
}

/// Audio cues the core requests alongside voice prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Played when a reroute begins ("recalculating").
    Reroute,
    /// Played on arrival.
    Arrival,
    /// Played when a directions error is surfaced.
    Error,
}

/// Speech and sound output. Fire-and-forget: the core never waits on playback.
pub trait VoiceOutput {
    fn speak(&mut self, text: &str);
    fn play_sound(&mut self, cue: SoundCue);
}

/// Minimal key-value persistence for user preference flags.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory [`KeyValueStore`], for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Test doubles shared by session and tracker tests.
#[cfg(test)]
pub(crate) mod doubles {
    use super::*;
    use crate::error::NavError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Directions provider that replays a script of responses and records
    /// how many times it was called.
    pub struct ScriptedDirections {
        pub responses: VecDeque<Result<Route>>,
        pub calls: Rc<RefCell<u32>>,
    }

    impl ScriptedDirections {
        pub fn new(responses: Vec<Result<Route>>) -> Self {
            Self {
                responses: responses.into(),
                calls: Rc::new(RefCell::new(0)),
            }
        }

        pub fn call_counter(&self) -> Rc<RefCell<u32>> {
            Rc::clone(&self.calls)
        }
    }

    impl DirectionsProvider for ScriptedDirections {
        fn compute_route(
            &mut self,
            _origin: GeoPoint,
            _destination: GeoPoint,
            _mode: TransportMode,
        ) -> Result<Route> {
            *self.calls.borrow_mut() += 1;
            self.responses
                .pop_front()
                .unwrap_or(Err(NavError::NoRoute))
        }
    }

    /// Voice output that records everything spoken and played.
    #[derive(Clone, Default)]
    pub struct RecordingVoice {
        pub spoken: Rc<RefCell<Vec<String>>>,
        pub sounds: Rc<RefCell<Vec<SoundCue>>>,
    }

    impl RecordingVoice {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl VoiceOutput for RecordingVoice {
        fn speak(&mut self, text: &str) {
            self.spoken.borrow_mut().push(text.to_string());
        }

        fn play_sound(&mut self, cue: SoundCue) {
            self.sounds.borrow_mut().push(cue);
        }
    }
}
