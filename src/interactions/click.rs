//! Click interaction
//!
//! Turns a click on the container into a one-shot click clip followed by the
//! idle loop. Clicks arriving while the clip plays are ignored.

use crate::companion::{video_type, SourceLookup};
use crate::interactions::{Behavior, BehaviorKind, CompanionEvent, EventDisposition, TaskSpawner};
use crate::media::MediaPlayer;
use crate::placement::{CompanionSignal, ContainerElement, Cursor};

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use log::debug;

#[derive(Debug, Default)]
struct ClickState {
    active: bool,
    playing: bool,
    /// Bumped per animation so a superseded run cannot clear the flag
    run: u64,
}

/// Plays the click clip when the companion is clicked
pub struct ClickHandler {
    container: Arc<dyn ContainerElement>,
    player: MediaPlayer,
    lookup: Arc<dyn SourceLookup>,
    spawner: TaskSpawner,
    state: Arc<Mutex<ClickState>>,
}

impl ClickHandler {
    /// Create a handler spawning on the caller's runtime
    pub fn new(
        container: Arc<dyn ContainerElement>,
        player: MediaPlayer,
        lookup: Arc<dyn SourceLookup>,
    ) -> Self {
        Self {
            container,
            player,
            lookup,
            spawner: TaskSpawner::current(),
            state: Arc::new(Mutex::new(ClickState::default())),
        }
    }

    pub fn with_spawner(mut self, spawner: TaskSpawner) -> Self {
        self.spawner = spawner;
        self
    }

    /// Whether a click clip is currently playing
    pub fn is_playing_animation(&self) -> bool {
        self.state.lock().playing
    }

    /// Handle a click; returns whether an animation started
    pub fn handle_click(&self) -> bool {
        let run = {
            let mut state = self.state.lock();
            if !state.active || state.playing {
                return false;
            }
            state.playing = true;
            state.run += 1;
            state.run
        };

        let claimed = self
            .lookup
            .video_src(video_type::CLICK)
            .and_then(|src| self.spawner.runtime("click animation").map(|rt| (src, rt)));
        let Some((click_src, runtime)) = claimed else {
            let mut state = self.state.lock();
            if state.run == run {
                state.playing = false;
            }
            return false;
        };

        self.container.emit(CompanionSignal::Click);
        self.start_animation(run, &click_src, &runtime);
        true
    }

    /// Replay the click clip for the current scheme if one is in progress
    ///
    /// The in-progress flag stays set until the replacement clip finishes.
    pub fn restart_animation(&self) -> bool {
        if !self.is_playing_animation() {
            return false;
        }

        let Some(click_src) = self.lookup.video_src(video_type::CLICK) else {
            return false;
        };
        let Some(runtime) = self.spawner.runtime("click animation") else {
            return false;
        };

        let run = {
            let mut state = self.state.lock();
            if !state.playing {
                return false;
            }
            state.run += 1;
            state.run
        };

        debug!("Restarting click animation with {}", click_src);
        self.start_animation(run, &click_src, &runtime);
        true
    }

    fn start_animation(&self, run: u64, click_src: &str, runtime: &Handle) {
        self.container.set_cursor(Cursor::Default);

        let completion = self.player.play_once(click_src, None);
        let state = Arc::clone(&self.state);
        let container = Arc::clone(&self.container);
        let player = self.player.clone();
        let lookup = Arc::clone(&self.lookup);

        runtime.spawn(async move {
            let finished = completion.await.is_ok();

            let active = {
                let mut state = state.lock();
                if state.run != run {
                    return;
                }
                state.playing = false;
                state.active
            };

            if active {
                container.set_cursor(Cursor::Pointer);
            }

            if finished {
                if let Some(idle_src) = lookup.video_src(video_type::IDLE) {
                    player.play_loop(&idle_src);
                }
            } else {
                debug!("Click animation was interrupted");
            }
        });
    }
}

impl Behavior for ClickHandler {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Click
    }

    fn setup(&self) {
        self.state.lock().active = true;
        self.container.set_cursor(Cursor::Pointer);
    }

    fn teardown(&self) {
        let was_active = std::mem::replace(&mut self.state.lock().active, false);
        if was_active {
            self.container.set_cursor(Cursor::Unset);
        }
    }

    fn handles(&self, event: &CompanionEvent) -> bool {
        matches!(event, CompanionEvent::Click)
    }

    fn handle(&self, _event: &CompanionEvent) -> EventDisposition {
        if self.handle_click() {
            EventDisposition::Consumed
        } else {
            EventDisposition::Continue
        }
    }
}
