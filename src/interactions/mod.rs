//! Interaction behaviors for the companion
//!
//! Each behavior is an independent module sharing the companion's media
//! player and asset lookup. The orchestrator registers the ones a variant
//! enables and dispatches host events to them in registration order.
//!
//! Behaviors spawn their completion continuations on the Tokio runtime that
//! was current when the companion was built, so hosts may deliver events from
//! their own threads. Without any runtime a behavior declines to start.

mod click;
mod flashlight;
mod inactivity;

pub use click::ClickHandler;
pub use flashlight::FlashlightHandler;
pub use inactivity::{InactivityMonitor, SleepState};

use crate::scheme::ColorScheme;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use log::warn;

/// Host events a companion reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionEvent {
    /// The container was clicked
    Click,

    /// The pointer entered the container
    MouseEnter,

    /// The page was hidden or shown
    VisibilityChanged { hidden: bool },

    /// The resolved color scheme flipped
    ColorSchemeChanged { new: ColorScheme, old: ColorScheme },
}

/// Whether later behaviors still see an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Continue,
    Consumed,
}

/// Behavior identity, matching the variant's interaction switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    Click,
    Sleep,
    Flashlight,
}

/// Capability shared by every interaction behavior
pub trait Behavior: Send + Sync {
    /// Which interaction switch this behavior implements
    fn kind(&self) -> BehaviorKind;

    /// Start reacting to events
    fn setup(&self);

    /// Stop reacting and restore anything the behavior changed; idempotent
    fn teardown(&self);

    /// Whether the behavior is interested in `event`
    fn handles(&self, event: &CompanionEvent) -> bool;

    /// React to an event the behavior handles
    fn handle(&self, event: &CompanionEvent) -> EventDisposition;
}

/// Runtime that behavior continuations are spawned on
#[derive(Debug, Clone, Default)]
pub struct TaskSpawner {
    handle: Option<Handle>,
}

impl TaskSpawner {
    /// Capture the runtime the caller is running on, if any
    pub fn current() -> Self {
        Self {
            handle: Handle::try_current().ok(),
        }
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self { handle: Some(handle) }
    }

    /// The captured runtime, else the caller's; `None` when neither exists
    pub fn runtime(&self, action: &str) -> Option<Handle> {
        let handle = self.handle.clone().or_else(|| Handle::try_current().ok());
        if handle.is_none() {
            warn!("No Tokio runtime available, skipping {}", action);
        }
        handle
    }
}

/// Leading-edge throttle: accepts a call, then rejects calls for `interval`
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a call at `now` may run
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle() {
        let mut throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();

        assert!(throttle.try_acquire(start));
        assert!(!throttle.try_acquire(start + Duration::from_millis(500)));
        assert!(throttle.try_acquire(start + Duration::from_millis(1000)));
        assert!(!throttle.try_acquire(start + Duration::from_millis(1999)));

        throttle.reset();
        assert!(throttle.try_acquire(start + Duration::from_millis(1999)));
    }

    #[test]
    fn test_spawner_without_runtime() {
        assert!(TaskSpawner::current().runtime("test").is_none());
        assert!(TaskSpawner::default().runtime("test").is_none());
    }

    #[test]
    fn test_spawner_keeps_captured_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let spawner = {
            let _guard = runtime.enter();
            TaskSpawner::current()
        };

        let handle = spawner.runtime("test").unwrap();
        let joined = runtime.block_on(handle.spawn(async { 7 })).unwrap();
        assert_eq!(joined, 7);
    }
}
