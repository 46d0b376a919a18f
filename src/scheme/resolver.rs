//! Color scheme change detection
//!
//! A resolver re-derives the scheme from the shared provider whenever the OS
//! signal or the user preference changes, and calls its callback only when
//! the derived value differs from the one it last reported.

use crate::scheme::{ColorScheme, OsSubscription, SchemeProvider};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use log::debug;

/// Called with `(new_scheme, old_scheme)`
pub type SchemeChangeCallback = Arc<dyn Fn(ColorScheme, ColorScheme) + Send + Sync>;

struct ResolverInner {
    provider: Arc<SchemeProvider>,
    on_change: SchemeChangeCallback,
    /// `None` after cleanup
    current: Mutex<Option<ColorScheme>>,
    subscription: Mutex<Option<OsSubscription>>,
}

impl ResolverInner {
    fn handle_os_change(&self) {
        if self.provider.skin_setting().is_os() {
            self.update_color_scheme();
        }
    }

    fn update_color_scheme(&self) {
        let new_scheme = self.provider.current_color_scheme();
        let old_scheme = {
            let mut current = self.current.lock();
            match *current {
                None => return,
                Some(old) if old == new_scheme => return,
                Some(old) => {
                    *current = Some(new_scheme);
                    old
                }
            }
        };

        debug!("Color scheme changed {} -> {}", old_scheme, new_scheme);
        (self.on_change)(new_scheme, old_scheme);
    }
}

/// Notifies a callback when the resolved color scheme changes
pub struct ColorSchemeResolver {
    inner: Arc<ResolverInner>,
}

impl ColorSchemeResolver {
    /// Create a resolver; the current scheme is captured immediately
    pub fn new(provider: Arc<SchemeProvider>, on_change: SchemeChangeCallback) -> Self {
        let current = provider.current_color_scheme();
        Self {
            inner: Arc::new(ResolverInner {
                provider,
                on_change,
                current: Mutex::new(Some(current)),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Start listening for OS scheme changes
    ///
    /// The reported scheme is re-read here, so provider changes made between
    /// construction and setup never surface as a flip.
    pub fn setup(&self) {
        let mut subscription = self.inner.subscription.lock();
        if subscription.is_some() {
            return;
        }
        *self.inner.current.lock() = Some(self.inner.provider.current_color_scheme());

        let weak: Weak<ResolverInner> = Arc::downgrade(&self.inner);
        *subscription = Some(self.inner.provider.subscribe_os(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_os_change();
            }
        }));
    }

    /// The OS preference changed
    pub fn handle_os_color_scheme_change(&self, is_dark: bool) {
        // Subscribed resolvers hear this through the provider as well;
        // the second derivation finds no change.
        self.inner.provider.set_os_dark(is_dark);
        self.inner.handle_os_change();
    }

    /// The stored user preference changed
    pub fn handle_skin_color_scheme_change(&self, value: &str) {
        self.inner.provider.set_skin_theme(value);
        self.inner.update_color_scheme();
    }

    /// Last reported scheme; `None` after cleanup
    pub fn current_color_scheme(&self) -> Option<ColorScheme> {
        *self.inner.current.lock()
    }

    /// Stop listening; safe without a prior `setup`
    pub fn cleanup(&self) {
        if let Some(subscription) = self.inner.subscription.lock().take() {
            self.inner.provider.unsubscribe_os(subscription);
        }
        *self.inner.current.lock() = None;
    }
}
