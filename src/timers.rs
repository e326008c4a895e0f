//! Named, cancellable scheduled tasks.
//!
//! The session schedules its periodic work (off-route polling, ETA refresh) and
//! one-shots (reroute cooldown, directions retry) here under logical names, and
//! drives the registry with an explicit `tick(now)` from the host's run loop.
//! Scheduling a name again supersedes the previous entry, and a [`TaskHandle`]
//! from a superseded registration is inert, so a stale cancellation can never
//! kill a newer timer.

use std::collections::HashMap;
use std::time::Duration;

/// Cancellation token for one scheduled task registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    name: String,
    generation: u64,
}

struct Scheduled {
    deadline: Duration,
    period: Option<Duration>,
    generation: u64,
}

/// Registry of scheduled tasks keyed by logical name.
pub struct TimerRegistry {
    tasks: HashMap<String, Scheduled>,
    next_generation: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Schedule a one-shot task to fire at `deadline` (session-relative).
    /// Replaces any task already registered under `name`.
    pub fn schedule_once(&mut self, name: &str, deadline: Duration) -> TaskHandle {
        self.insert(name, deadline, None)
    }

    /// Schedule a repeating task firing first at `deadline`, then every
    /// `period` after each firing. Replaces any task under `name`.
    pub fn schedule_repeating(
        &mut self,
        name: &str,
        deadline: Duration,
        period: Duration,
    ) -> TaskHandle {
        self.insert(name, deadline, Some(period))
    }

    fn insert(&mut self, name: &str, deadline: Duration, period: Option<Duration>) -> TaskHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.tasks.insert(
            name.to_string(),
            Scheduled { deadline, period, generation },
        );
        TaskHandle { name: name.to_string(), generation }
    }

    /// Cancel the registration this handle refers to. Returns false if the
    /// task already fired, was cancelled, or was superseded.
    pub fn cancel(&mut self, handle: &TaskHandle) -> bool {
        match self.tasks.get(&handle.name) {
            Some(task) if task.generation == handle.generation => {
                self.tasks.remove(&handle.name);
                true
            }
            _ => false,
        }
    }

    /// Cancel whatever is registered under `name`.
    pub fn cancel_named(&mut self, name: &str) -> bool {
        self.tasks.remove(name).is_some()
    }

    /// Cancel everything. Used on session teardown and backgrounding.
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Whether a task is currently registered under `name`.
    pub fn is_scheduled(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Fire every task whose deadline has passed. One-shots are removed;
    /// repeating tasks are re-armed `period` after the firing tick. Returns
    /// fired names ordered by deadline (ties by name) for deterministic
    /// dispatch.
    pub fn tick(&mut self, now: Duration) -> Vec<String> {
        let mut due: Vec<(Duration, String)> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.deadline <= now)
            .map(|(name, task)| (task.deadline, name.clone()))
            .collect();
        due.sort();

        let mut fired = Vec::with_capacity(due.len());
        for (_, name) in due {
            let rearm = self.tasks.get(&name).and_then(|t| t.period);
            match rearm {
                Some(period) => {
                    if let Some(task) = self.tasks.get_mut(&name) {
                        task.deadline = now + period;
                    }
                }
                None => {
                    self.tasks.remove(&name);
                }
            }
            fired.push(name);
        }
        fired
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
