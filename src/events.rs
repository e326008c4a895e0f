//! Navigation events and observer registration.
//!
//! The guidance core communicates with its host through [`NavEvent`]s delivered to
//! registered [`NavObserver`]s. Delivery is synchronous and strictly FIFO: events
//! published while another event is being dispatched queue behind it, so observers
//! always see events for the same source in time order.
//!
//! Lifecycle milestones (first accepted route, arrival) are plain events here; the
//! host maps them onto whatever it does at those moments (interstitials, review
//! prompts). The core carries no logic for those concerns.

use crate::GeoPoint;
use std::collections::VecDeque;
use std::time::Duration;

/// An event emitted by the guidance core.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// A route passed validity checks and monitoring started.
    /// `first_route` is true only for the first accepted route of a session.
    RouteAccepted {
        first_route: bool,
        step_count: usize,
        total_distance_m: f64,
    },
    /// A computed route failed the minimum step/distance thresholds.
    /// Terminal for that route; a fresh destination is required.
    RouteRejected {
        step_count: usize,
        distance_m: f64,
    },
    /// The current step advanced. Drives list highlight and scroll-to-row.
    StepChanged {
        step_index: usize,
        step_count: usize,
        instruction: String,
    },
    /// The user strayed beyond the corridor and a reroute was requested.
    RerouteRequested { from: GeoPoint },
    /// The user reached the destination. Emitted exactly once per route.
    Arrived,
    /// Fresh remaining-distance/ETA figures from the info poller.
    EtaUpdated {
        remaining_distance_m: f64,
        expected_duration: Option<Duration>,
    },
    /// The info poller failed; only the ETA label should reflect this.
    EtaUnavailable { message: String },
    /// A directions or location failure surfaced to the UI. The tracker
    /// keeps its last known state.
    GuidanceError { message: String },
}

/// Receives navigation events. Implemented by host UI layers.
pub trait NavObserver {
    fn on_event(&mut self, event: &NavEvent);
}

/// FIFO event dispatcher.
///
/// Publishing during dispatch enqueues rather than recursing, preserving
/// time order even when an observer's reaction causes further events.
pub struct EventBus {
    observers: Vec<Box<dyn NavObserver>>,
    queue: VecDeque<NavEvent>,
    dispatching: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            queue: VecDeque::new(),
            dispatching: false,
        }
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn subscribe(&mut self, observer: Box<dyn NavObserver>) {
        self.observers.push(observer);
    }

    /// Publish an event to all observers, draining any events queued
    /// during dispatch before returning.
    pub fn publish(&mut self, event: NavEvent) {
        self.queue.push_back(event);
        if self.dispatching {
            return;
        }

        self.dispatching = true;
        while let Some(next) = self.queue.pop_front() {
            for observer in &mut self.observers {
                observer.on_event(&next);
            }
        }
        self.dispatching = false;
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
