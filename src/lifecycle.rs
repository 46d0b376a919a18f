//! Companion lifecycle driven by the user's on/off preference
//!
//! The preference arrives either as a stored value (`"1"` / `"0"`) when the
//! page loads, or as a change of the document class list afterwards. Turning
//! it on builds a fresh companion and sets it up; turning it off cleans the
//! companion up and drops it.

use crate::companion::Companion;
use parking_lot::Mutex;
use std::sync::Arc;
use log::{debug, info};

/// Class present while the preference is on
pub const PREFERENCE_ENABLED_CLASS: &str = "companion-enable-clientpref-1";

/// Class present while the preference is off
pub const PREFERENCE_DISABLED_CLASS: &str = "companion-enable-clientpref-0";

/// A change of the on/off preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceChange {
    Enabled,
    Disabled,
}

impl PreferenceChange {
    /// Parse a stored preference value
    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(Self::Enabled),
            "0" => Some(Self::Disabled),
            _ => None,
        }
    }

    /// Read the preference from a document class list; the enabled class wins
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut change = None;
        for class in classes {
            match class {
                PREFERENCE_ENABLED_CLASS => return Some(Self::Enabled),
                PREFERENCE_DISABLED_CLASS => change = Some(Self::Disabled),
                _ => {}
            }
        }
        change
    }
}

/// Builds a fresh companion, or `None` when the page has none to show
pub type CompanionFactory = Box<dyn FnMut() -> Option<Companion> + Send>;

struct LifecycleState {
    factory: CompanionFactory,
    viewport_width: u32,
    current: Option<Arc<Companion>>,
}

/// Owns the companion across preference changes
pub struct CompanionLifecycle {
    state: Mutex<LifecycleState>,
}

impl CompanionLifecycle {
    pub fn new(factory: CompanionFactory, viewport_width: u32) -> Self {
        Self {
            state: Mutex::new(LifecycleState {
                factory,
                viewport_width,
                current: None,
            }),
        }
    }

    /// Apply the stored preference at page load
    pub fn setup(&self, stored_value: Option<&str>) {
        if stored_value.and_then(PreferenceChange::from_value) == Some(PreferenceChange::Enabled) {
            self.apply(PreferenceChange::Enabled);
        }
    }

    /// The document class list changed
    pub fn handle_class_change<'a>(&self, classes: impl IntoIterator<Item = &'a str>) -> bool {
        match PreferenceChange::from_classes(classes) {
            Some(change) => self.apply(change),
            None => false,
        }
    }

    /// Show or hide the companion; returns whether anything changed
    pub fn apply(&self, change: PreferenceChange) -> bool {
        let mut state = self.state.lock();
        match change {
            PreferenceChange::Enabled => {
                if state.current.is_some() {
                    debug!("Companion already shown");
                    return false;
                }
                let Some(companion) = (state.factory)() else {
                    debug!("No companion for this page");
                    return false;
                };

                info!("Showing companion '{}'", companion.config().name());
                companion.setup(state.viewport_width);
                state.current = Some(Arc::new(companion));
                true
            }
            PreferenceChange::Disabled => match state.current.take() {
                Some(companion) => {
                    info!("Hiding companion '{}'", companion.config().name());
                    companion.cleanup();
                    true
                }
                None => false,
            },
        }
    }

    /// The viewport was resized
    pub fn handle_viewport_change(&self, viewport_width: u32) {
        let companion = {
            let mut state = self.state.lock();
            state.viewport_width = viewport_width;
            state.current.clone()
        };
        if let Some(companion) = companion {
            companion.handle_viewport_change(viewport_width);
        }
    }

    /// The companion currently shown
    pub fn companion(&self) -> Option<Arc<Companion>> {
        self.state.lock().current.clone()
    }

    pub fn is_shown(&self) -> bool {
        self.state.lock().current.is_some()
    }
}
