//! Flashlight reaction to the page going dark

use crate::companion::{video_type, SourceLookup};
use crate::interactions::{Behavior, BehaviorKind, CompanionEvent, EventDisposition, TaskSpawner};
use crate::media::MediaPlayer;
use crate::scheme::ColorScheme;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use log::debug;

/// Plays the flashlight clip once when the scheme flips from light to dark
pub struct FlashlightHandler {
    player: MediaPlayer,
    lookup: Arc<dyn SourceLookup>,
    spawner: TaskSpawner,
    active: AtomicBool,
}

impl FlashlightHandler {
    pub fn new(player: MediaPlayer, lookup: Arc<dyn SourceLookup>) -> Self {
        Self {
            player,
            lookup,
            spawner: TaskSpawner::current(),
            active: AtomicBool::new(false),
        }
    }

    pub fn with_spawner(mut self, spawner: TaskSpawner) -> Self {
        self.spawner = spawner;
        self
    }

    /// React to a scheme flip; returns whether the flashlight clip started
    ///
    /// The clip plays once and hands over to the idle loop of the new scheme.
    pub fn handle_scheme_change(&self, new: ColorScheme, old: ColorScheme) -> bool {
        if !self.active.load(Ordering::Acquire) {
            return false;
        }
        if !(old == ColorScheme::Light && new == ColorScheme::Dark) {
            return false;
        }

        let Some(flashlight_src) = self.lookup.video_src(video_type::FLASHLIGHT) else {
            return false;
        };
        let Some(runtime) = self.spawner.runtime("flashlight clip") else {
            return false;
        };

        debug!("Lights out, playing {}", flashlight_src);
        match self.lookup.video_src(video_type::IDLE) {
            Some(idle_src) => {
                runtime.spawn(self.player.play_sequence(vec![flashlight_src, idle_src]));
            }
            None => {
                runtime.spawn(self.player.play_once(&flashlight_src, None));
            }
        }
        true
    }
}

impl Behavior for FlashlightHandler {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Flashlight
    }

    fn setup(&self) {
        self.active.store(true, Ordering::Release);
    }

    fn teardown(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn handles(&self, event: &CompanionEvent) -> bool {
        matches!(event, CompanionEvent::ColorSchemeChanged { .. })
    }

    fn handle(&self, event: &CompanionEvent) -> EventDisposition {
        match *event {
            CompanionEvent::ColorSchemeChanged { new, old } if self.handle_scheme_change(new, old) => {
                EventDisposition::Consumed
            }
            _ => EventDisposition::Continue,
        }
    }
}
