//! Companion orchestrator
//!
//! A [`Companion`] owns the container, the single media player and the
//! interaction behaviors its configuration enables. It decides what plays
//! when triggers compete: a color scheme flip, the sleep cycle and an
//! in-progress click animation all go through the same player.

mod assets;
mod config;

pub use assets::{AssetResolver, SourceLookup};
#[cfg(test)]
pub use assets::MockSourceLookup;
pub use config::{
    video_type, CompanionConfig, CompanionConfigBuilder, Interactions, VariantCatalog,
    VideoVariant,
};

use crate::interactions::{
    Behavior, ClickHandler, CompanionEvent, EventDisposition, FlashlightHandler,
    InactivityMonitor, SleepState, TaskSpawner,
};
use crate::media::{MediaElement, MediaPlayer};
use crate::placement::{ContainerElement, PlacementController};
use crate::scheme::{ColorScheme, ColorSchemeResolver, SchemeChangeCallback, SchemeProvider};
use crate::utils::config::SiteConfig;

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Active,
    CleanedUp,
}

struct CompanionInner {
    config: Arc<CompanionConfig>,
    assets: AssetResolver,
    player: MediaPlayer,
    placement: PlacementController,
    resolver: ColorSchemeResolver,
    click: Option<Arc<ClickHandler>>,
    flashlight: Option<Arc<FlashlightHandler>>,
    inactivity: Option<Arc<InactivityMonitor>>,
    /// Event dispatch order; inactivity sees activity before click
    behaviors: Vec<Arc<dyn Behavior>>,
    phase: Mutex<Phase>,
}

impl CompanionInner {
    fn is_active(&self) -> bool {
        *self.phase.lock() == Phase::Active
    }

    fn play_idle_video(&self) -> bool {
        match self.assets.video_src(video_type::IDLE) {
            Some(idle_src) => {
                self.player.play_loop(&idle_src);
                true
            }
            None => false,
        }
    }

    fn handle_color_scheme_change(&self, new: ColorScheme, old: ColorScheme) {
        if !self.is_active() {
            return;
        }
        info!("Color scheme changed from {} to {}", old, new);

        if self.inactivity.as_ref().is_some_and(|m| m.handle_scheme_change()) {
            debug!("Asleep, swapped the sleep loop");
            return;
        }

        let event = CompanionEvent::ColorSchemeChanged { new, old };
        if let Some(flashlight) = &self.flashlight {
            if flashlight.handle(&event) == EventDisposition::Consumed {
                return;
            }
        }

        if self.click.as_ref().is_some_and(|c| c.restart_animation()) {
            return;
        }

        self.play_idle_video();
    }

    fn handle_event(&self, event: CompanionEvent) {
        if !self.is_active() {
            return;
        }

        if let CompanionEvent::ColorSchemeChanged { new, old } = event {
            self.handle_color_scheme_change(new, old);
            return;
        }

        for behavior in &self.behaviors {
            if !behavior.handles(&event) {
                continue;
            }
            if behavior.handle(&event) == EventDisposition::Consumed {
                debug!("{:?} consumed by {:?}", event, behavior.kind());
                break;
            }
        }
    }
}

/// One companion instance on one page
pub struct Companion {
    inner: Arc<CompanionInner>,
}

impl Companion {
    /// Create a companion with default runtime settings
    pub fn new(
        config: CompanionConfig,
        element: Arc<dyn MediaElement>,
        container: Arc<dyn ContainerElement>,
        provider: Arc<SchemeProvider>,
    ) -> Self {
        Self::with_settings(config, element, container, provider, &SiteConfig::default())
    }

    /// Create a companion using the runtime settings of a site configuration
    ///
    /// Nothing is mounted or played until [`Companion::setup`]. The Tokio
    /// runtime current at this point, if any, runs the behaviors'
    /// continuations, whichever thread later delivers events.
    pub fn with_settings(
        config: CompanionConfig,
        element: Arc<dyn MediaElement>,
        container: Arc<dyn ContainerElement>,
        provider: Arc<SchemeProvider>,
        settings: &SiteConfig,
    ) -> Self {
        if element.kind() != config.media_kind() {
            warn!(
                "Companion '{}' expects a {:?} element but got {:?}",
                config.name(),
                config.media_kind(),
                element.kind()
            );
        }

        let config = Arc::new(config);
        let assets = AssetResolver::new(Arc::clone(&config), Arc::clone(&provider));
        let lookup: Arc<dyn SourceLookup> = Arc::new(assets.clone());
        let player = MediaPlayer::new(element, settings.player);
        let placement = PlacementController::new(Arc::clone(&container), settings.placement);
        let interactions = config.interactions();
        let spawner = TaskSpawner::current();

        let inactivity = interactions.sleep.then(|| {
            Arc::new(
                InactivityMonitor::new(player.clone(), Arc::clone(&lookup), &settings.inactivity)
                    .with_spawner(spawner.clone()),
            )
        });
        let click = interactions.click.then(|| {
            Arc::new(
                ClickHandler::new(Arc::clone(&container), player.clone(), Arc::clone(&lookup))
                    .with_spawner(spawner.clone()),
            )
        });
        let flashlight = interactions.flashlight.then(|| {
            Arc::new(
                FlashlightHandler::new(player.clone(), Arc::clone(&lookup))
                    .with_spawner(spawner.clone()),
            )
        });

        let mut behaviors: Vec<Arc<dyn Behavior>> = Vec::new();
        if let Some(monitor) = &inactivity {
            behaviors.push(monitor.clone());
        }
        if let Some(handler) = &click {
            behaviors.push(handler.clone());
        }
        if let Some(handler) = &flashlight {
            behaviors.push(handler.clone());
        }

        let inner = Arc::new_cyclic(|weak: &Weak<CompanionInner>| {
            let weak = weak.clone();
            let on_change: SchemeChangeCallback = Arc::new(move |new, old| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_color_scheme_change(new, old);
                }
            });

            CompanionInner {
                config,
                assets,
                player,
                placement,
                resolver: ColorSchemeResolver::new(provider, on_change),
                click,
                flashlight,
                inactivity,
                behaviors,
                phase: Mutex::new(Phase::Created),
            }
        });

        Self { inner }
    }

    /// Mount the container, start the idle loop, reveal and activate behaviors
    ///
    /// The container stays hidden until the idle loop has been requested.
    pub fn setup(&self, viewport_width: u32) {
        {
            let mut phase = self.inner.phase.lock();
            if *phase != Phase::Created {
                debug!("Ignoring setup of companion in phase {:?}", *phase);
                return;
            }
            *phase = Phase::Active;
        }

        info!("Setting up companion '{}'", self.inner.config.name());
        self.inner.placement.setup(viewport_width);
        if !self.inner.play_idle_video() {
            debug!("No idle asset configured for '{}'", self.inner.config.name());
        }
        if self.container().parent().is_some() {
            self.inner.placement.show();
        }
        self.inner.resolver.setup();

        for behavior in &self.inner.behaviors {
            behavior.setup();
        }
    }

    /// URL for a clip type in the current color scheme
    pub fn get_video_src(&self, video_type: &str) -> Option<String> {
        self.inner.assets.video_src(video_type)
    }

    /// Loop the idle clip; false when no idle asset is configured
    pub fn play_idle_video(&self) -> bool {
        self.inner.play_idle_video()
    }

    /// React to a color scheme flip, first matching rule wins:
    /// asleep, flashlight on light to dark, click in progress, idle
    pub fn handle_color_scheme_change(&self, new: ColorScheme, old: ColorScheme) {
        self.inner.handle_color_scheme_change(new, old);
    }

    /// Deliver a host event; ignored unless the companion is set up
    pub fn handle_event(&self, event: CompanionEvent) {
        self.inner.handle_event(event);
    }

    /// The stored theme preference changed
    pub fn handle_skin_theme_change(&self, value: &str) {
        if self.inner.is_active() {
            self.inner.resolver.handle_skin_color_scheme_change(value);
        }
    }

    /// The OS color scheme changed
    pub fn handle_os_color_scheme_change(&self, is_dark: bool) {
        if self.inner.is_active() {
            self.inner.resolver.handle_os_color_scheme_change(is_dark);
        }
    }

    /// The viewport was resized
    pub fn handle_viewport_change(&self, viewport_width: u32) {
        if self.inner.is_active() {
            self.inner.placement.handle_viewport_change(viewport_width);
        }
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.inner.config
    }

    /// The shared player, for hosts delivering media notifications
    pub fn player(&self) -> &MediaPlayer {
        &self.inner.player
    }

    pub fn container(&self) -> &Arc<dyn ContainerElement> {
        self.inner.placement.container()
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Sleep state, when the sleep interaction is enabled
    pub fn sleep_state(&self) -> Option<SleepState> {
        self.inner.inactivity.as_ref().map(|m| m.state())
    }

    pub fn is_playing_animation(&self) -> bool {
        self.inner
            .click
            .as_ref()
            .is_some_and(|c| c.is_playing_animation())
    }

    /// Last scheme reported by the resolver; `None` after cleanup
    pub fn color_scheme(&self) -> Option<ColorScheme> {
        self.inner.resolver.current_color_scheme()
    }

    /// Tear everything down; idempotent
    ///
    /// Order: interaction handlers, inactivity monitor, scheme resolver,
    /// media player, container.
    pub fn cleanup(&self) {
        {
            let mut phase = self.inner.phase.lock();
            if *phase == Phase::CleanedUp {
                return;
            }
            *phase = Phase::CleanedUp;
        }

        info!("Cleaning up companion '{}'", self.inner.config.name());
        if let Some(click) = &self.inner.click {
            click.teardown();
        }
        if let Some(flashlight) = &self.inner.flashlight {
            flashlight.teardown();
        }
        if let Some(monitor) = &self.inner.inactivity {
            monitor.teardown();
        }
        self.inner.resolver.cleanup();
        self.inner.player.cleanup();
        self.inner.placement.hide();
        self.inner.placement.cleanup();
    }
}

impl Drop for Companion {
    fn drop(&mut self) {
        self.cleanup();
    }
}
