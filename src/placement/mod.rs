//! Placement module for the companion
//!
//! The companion container is mounted into one of a few layout landmarks,
//! chosen by viewport breakpoint. Moving the container never touches the
//! media element inside it, so playback continues across a relocation.

mod headless;

pub use headless::HeadlessContainer;

use crate::utils::config::PlacementSettings;
use std::sync::Arc;
use parking_lot::Mutex;
use log::{debug, info};

/// Layout slot the container can be mounted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Landmark {
    /// Side column, used on large viewports when the layout has one
    ColumnEnd,

    /// Above the content, used everywhere else
    SiteNotice,
}

/// Pointer affordance of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Nothing set; the host default applies
    Unset,

    /// Clickable
    Pointer,

    /// Not clickable right now
    Default,
}

/// Signals the companion emits on its container for other collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionSignal {
    /// A click animation started
    Click,
}

/// Host container element trait
pub trait ContainerElement: Send + Sync {
    /// Whether the landmark exists in the current page
    fn landmark_available(&self, landmark: Landmark) -> bool;

    /// Append the container to a landmark, moving it if already mounted
    fn attach_to(&self, landmark: Landmark);

    /// Remove the container from the page
    fn detach(&self);

    /// Landmark the container is mounted in, if any
    fn parent(&self) -> Option<Landmark>;

    /// Show or hide the container
    fn set_visible(&self, visible: bool);

    /// Change the pointer affordance
    fn set_cursor(&self, cursor: Cursor);

    /// Emit a companion signal on the container
    fn emit(&self, signal: CompanionSignal);
}

/// Tracks which side of the large-layout breakpoint the viewport is on
#[derive(Debug)]
pub struct BreakpointResolver {
    threshold_px: u32,
    is_large: Option<bool>,
}

impl BreakpointResolver {
    pub fn new(threshold_px: u32) -> Self {
        Self {
            threshold_px,
            is_large: None,
        }
    }

    /// Record the initial viewport width
    pub fn setup(&mut self, viewport_width: u32) {
        self.is_large = Some(viewport_width >= self.threshold_px);
    }

    /// Record a new viewport width; returns the new state if it crossed the breakpoint
    pub fn handle_resize(&mut self, viewport_width: u32) -> Option<bool> {
        let is_large = viewport_width >= self.threshold_px;
        if self.is_large == Some(is_large) {
            return None;
        }
        self.is_large = Some(is_large);
        Some(is_large)
    }

    /// `None` before setup and after cleanup
    pub fn is_large(&self) -> Option<bool> {
        self.is_large
    }

    pub fn cleanup(&mut self) {
        self.is_large = None;
    }
}

/// Places the companion container into the right landmark
pub struct PlacementController {
    container: Arc<dyn ContainerElement>,
    breakpoint: Mutex<BreakpointResolver>,
}

impl PlacementController {
    /// Wrap a container; it starts hidden
    pub fn new(container: Arc<dyn ContainerElement>, settings: PlacementSettings) -> Self {
        container.set_visible(false);
        Self {
            container,
            breakpoint: Mutex::new(BreakpointResolver::new(settings.large_breakpoint_px)),
        }
    }

    /// The wrapped container
    pub fn container(&self) -> &Arc<dyn ContainerElement> {
        &self.container
    }

    /// Read the breakpoint and mount the container
    pub fn setup(&self, viewport_width: u32) {
        self.breakpoint.lock().setup(viewport_width);
        self.update_placement();
    }

    /// The viewport was resized
    pub fn handle_viewport_change(&self, viewport_width: u32) {
        let crossed = self.breakpoint.lock().handle_resize(viewport_width);
        if let Some(is_large) = crossed {
            debug!("Viewport crossed breakpoint (large: {})", is_large);
            self.update_placement();
        }
    }

    /// Pick the landmark for the current breakpoint
    pub fn update_placement(&self) {
        let is_large = self.breakpoint.lock().is_large().unwrap_or(false);
        if is_large && self.container.landmark_available(Landmark::ColumnEnd) {
            self.move_container(Landmark::ColumnEnd);
        } else {
            self.move_container(Landmark::SiteNotice);
        }
    }

    /// Mount the container into `landmark`, or hide and detach it if the landmark is missing
    pub fn move_container(&self, landmark: Landmark) {
        if !self.container.landmark_available(landmark) {
            debug!("Landmark {:?} missing, hiding companion", landmark);
            self.hide();
            if self.container.parent().is_some() {
                self.container.detach();
            }
            return;
        }

        if self.container.parent() != Some(landmark) {
            info!("Mounting companion into {:?}", landmark);
            self.container.attach_to(landmark);
        }
    }

    pub fn show(&self) {
        self.container.set_visible(true);
    }

    pub fn hide(&self) {
        self.container.set_visible(false);
    }

    /// Forget the breakpoint and detach the container
    pub fn cleanup(&self) {
        self.breakpoint.lock().cleanup();
        if self.container.parent().is_some() {
            self.container.detach();
        }
    }
}
