//! Shared color scheme state
//!
//! One provider is created per page and handed by `Arc` to every companion
//! and resolver, so they all observe the same OS and user preference without
//! each registering its own OS listener.

use crate::scheme::{resolve_color_scheme, ColorScheme, SkinSetting};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use log::{debug, info};

/// Where the provider reads its initial state from
pub trait SchemeSource: Send + Sync {
    /// Whether the OS currently prefers a dark scheme, if that can be queried
    fn os_prefers_dark(&self) -> Option<bool>;

    /// The stored theme preference value, if any
    fn stored_skin_theme(&self) -> Option<String>;
}

type OsListener = Arc<dyn Fn(ColorScheme) + Send + Sync>;

/// Handle returned by [`SchemeProvider::subscribe_os`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsSubscription(u64);

#[derive(Debug, Default)]
struct SchemeState {
    os: Option<ColorScheme>,
    skin: SkinSetting,
}

/// Single source of truth for the ambient color scheme
pub struct SchemeProvider {
    state: RwLock<SchemeState>,
    source: Option<Box<dyn SchemeSource>>,
    os_listeners: Mutex<Vec<(OsSubscription, OsListener)>>,
    next_id: AtomicU64,
}

impl SchemeProvider {
    /// Create a provider with no lazy source; state comes from `init` and setters
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SchemeState::default()),
            source: None,
            os_listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a provider that initialises itself from `source` on first query
    pub fn with_source(source: Box<dyn SchemeSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::new()
        }
    }

    /// Set both signals explicitly
    pub fn init(&self, os_dark: Option<bool>, skin: Option<&str>) {
        let mut state = self.state.write();
        state.os = os_dark.map(ColorScheme::from_dark);
        state.skin = skin.map(SkinSetting::from_value).unwrap_or_default();
        info!("Color scheme state initialised: os={:?} skin={:?}", state.os, state.skin);
    }

    /// Forget both signals; the next query re-reads the source
    pub fn reset(&self) {
        *self.state.write() = SchemeState::default();
    }

    /// Resolved scheme for the current state
    pub fn current_color_scheme(&self) -> ColorScheme {
        self.ensure_initialized();
        let state = self.state.read();
        resolve_color_scheme(&state.skin, state.os)
    }

    /// OS scheme, if known
    pub fn os_scheme(&self) -> Option<ColorScheme> {
        self.ensure_initialized();
        self.state.read().os
    }

    /// Stored preference as understood by the provider
    pub fn skin_setting(&self) -> SkinSetting {
        self.ensure_initialized();
        self.state.read().skin.clone()
    }

    /// Record an OS scheme change and notify OS listeners
    pub fn set_os_dark(&self, is_dark: bool) {
        let scheme = ColorScheme::from_dark(is_dark);
        self.ensure_initialized();
        self.state.write().os = Some(scheme);
        debug!("OS color scheme is now {}", scheme);

        let listeners: Vec<OsListener> = self
            .os_listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(scheme);
        }
    }

    /// Record a stored preference change
    pub fn set_skin_theme(&self, value: &str) {
        self.ensure_initialized();
        let skin = SkinSetting::from_value(value);
        debug!("Skin theme preference is now {:?}", skin);
        self.state.write().skin = skin;
    }

    /// Register a listener for OS scheme changes
    pub fn subscribe_os<F>(&self, listener: F) -> OsSubscription
    where
        F: Fn(ColorScheme) + Send + Sync + 'static,
    {
        let id = OsSubscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.os_listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; unknown handles are ignored
    pub fn unsubscribe_os(&self, subscription: OsSubscription) {
        self.os_listeners.lock().retain(|(id, _)| *id != subscription);
    }

    /// Number of registered OS listeners
    pub fn os_listener_count(&self) -> usize {
        self.os_listeners.lock().len()
    }

    fn ensure_initialized(&self) {
        let Some(source) = &self.source else {
            return;
        };

        {
            let state = self.state.read();
            if state.os.is_some() || state.skin != SkinSetting::Unset {
                return;
            }
        }

        let os = source.os_prefers_dark().map(ColorScheme::from_dark);
        let skin = source
            .stored_skin_theme()
            .map(|v| SkinSetting::from_value(&v))
            .unwrap_or_default();

        let mut state = self.state.write();
        if state.os.is_none() && state.skin == SkinSetting::Unset {
            debug!("Lazily initialised color scheme state: os={:?} skin={:?}", os, skin);
            state.os = os;
            state.skin = skin;
        }
    }
}

impl Default for SchemeProvider {
    fn default() -> Self {
        Self::new()
    }
}
