//! Sleep and wake behavior
//!
//! The companion falls asleep when the page comes back after being hidden for
//! longer than the sleep threshold, and wakes on the next pointer activity by
//! playing its wake-up transitions before returning to the idle loop.

use crate::companion::{video_type, SourceLookup};
use crate::interactions::{
    Behavior, BehaviorKind, CompanionEvent, EventDisposition, TaskSpawner, Throttle,
};
use crate::media::MediaPlayer;
use crate::utils::config::InactivitySettings;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use log::{debug, info};

/// Where the companion is in its sleep cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepState {
    Idle,
    Sleep,
    TransitionFromSleep,
}

#[derive(Debug)]
struct MonitorState {
    active: bool,
    state: SleepState,
    hidden_since: Option<Instant>,
    throttle: Throttle,
    /// Bumped on every transition so a stale wake completion is dropped
    run: u64,
}

/// Puts the companion to sleep after long absences and wakes it on activity
pub struct InactivityMonitor {
    player: MediaPlayer,
    lookup: Arc<dyn SourceLookup>,
    sleep_after: Duration,
    spawner: TaskSpawner,
    state: Arc<Mutex<MonitorState>>,
}

impl InactivityMonitor {
    pub fn new(player: MediaPlayer, lookup: Arc<dyn SourceLookup>, settings: &InactivitySettings) -> Self {
        Self {
            player,
            lookup,
            sleep_after: settings.sleep_after(),
            spawner: TaskSpawner::current(),
            state: Arc::new(Mutex::new(MonitorState {
                active: false,
                state: SleepState::Idle,
                hidden_since: None,
                throttle: Throttle::new(settings.activity_throttle()),
                run: 0,
            })),
        }
    }

    pub fn with_spawner(mut self, spawner: TaskSpawner) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn state(&self) -> SleepState {
        self.state.lock().state
    }

    pub fn is_asleep(&self) -> bool {
        self.state() == SleepState::Sleep
    }

    /// The page was hidden or shown
    pub fn handle_visibility_change(&self, hidden: bool) {
        let now = Instant::now();
        let sleep_src = {
            let mut state = self.state.lock();
            if !state.active {
                return;
            }

            if hidden {
                state.hidden_since = Some(now);
                return;
            }

            let away = state
                .hidden_since
                .take()
                .map(|since| now.saturating_duration_since(since))
                .unwrap_or_default();
            if away < self.sleep_after || state.state == SleepState::Sleep {
                return;
            }
            let Some(sleep_src) = self.lookup.video_src(video_type::SLEEP_LOOP) else {
                return;
            };

            info!("Falling asleep after {:?} away", away);
            state.state = SleepState::Sleep;
            state.run += 1;
            sleep_src
        };

        self.player.play_loop(&sleep_src);
    }

    /// Pointer activity over the companion; throttled
    pub fn handle_activity(&self) {
        let (run, sequence, runtime) = {
            let mut state = self.state.lock();
            if !state.active || !state.throttle.try_acquire(Instant::now()) {
                return;
            }
            if state.state != SleepState::Sleep {
                return;
            }

            let sequence = self.wake_sequence();
            if sequence.is_empty() {
                return;
            }
            let Some(runtime) = self.spawner.runtime("wake sequence") else {
                return;
            };

            info!("Waking up");
            state.state = SleepState::TransitionFromSleep;
            state.run += 1;
            (state.run, sequence, runtime)
        };

        let wake = self.player.play_sequence(sequence);
        let state = Arc::clone(&self.state);
        runtime.spawn(async move {
            let outcome = wake.await;
            debug!("Wake sequence settled: {:?}", outcome);

            let mut state = state.lock();
            if state.run == run {
                state.state = SleepState::Idle;
            }
        });
    }

    /// Swap the sleep loop to the current scheme; returns whether the companion is asleep
    pub fn handle_scheme_change(&self) -> bool {
        if !self.is_asleep() {
            return false;
        }

        if let Some(sleep_src) = self.lookup.video_src(video_type::SLEEP_LOOP) {
            self.player.play_loop(&sleep_src);
        }
        true
    }

    /// Configured wake-up clips, ending in the idle loop
    fn wake_sequence(&self) -> Vec<String> {
        [
            video_type::SLEEP_TRANSITION_OUT,
            video_type::TRANSITION_FROM_SLEEP,
            video_type::IDLE,
        ]
        .into_iter()
        .filter_map(|video_type| self.lookup.video_src(video_type))
        .collect()
    }
}

impl Behavior for InactivityMonitor {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Sleep
    }

    fn setup(&self) {
        self.state.lock().active = true;
    }

    fn teardown(&self) {
        let mut state = self.state.lock();
        state.active = false;
        state.state = SleepState::Idle;
        state.hidden_since = None;
        state.throttle.reset();
        state.run += 1;
    }

    fn handles(&self, event: &CompanionEvent) -> bool {
        matches!(
            event,
            CompanionEvent::Click | CompanionEvent::MouseEnter | CompanionEvent::VisibilityChanged { .. }
        )
    }

    fn handle(&self, event: &CompanionEvent) -> EventDisposition {
        match *event {
            CompanionEvent::VisibilityChanged { hidden } => {
                self.handle_visibility_change(hidden);
                EventDisposition::Continue
            }
            _ => {
                let before = self.state();
                self.handle_activity();
                if before == SleepState::Idle {
                    EventDisposition::Continue
                } else {
                    EventDisposition::Consumed
                }
            }
        }
    }
}
