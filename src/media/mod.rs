//! Media playback module for the companion
//!
//! This module owns the single media element a companion renders into and
//! sequences clips on it. The element itself lives on the host side (a DOM
//! node, a native view, or the in-memory [`HeadlessElement`]); hosts implement
//! [`MediaElement`] and push asynchronous notifications (clip ended, late
//! playback failure) back into the [`MediaPlayer`].

mod headless;
mod player;

pub use headless::{ElementCall, HeadlessElement};
pub use player::{MediaPlayer, PlaybackToken};

use crate::utils::error::Result;
use std::fmt;

/// Asset family a media element renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Animated clips; one-shots complete on the element's ended notification
    Video,

    /// Still images for reduced motion; one-shots complete after a timer
    Image,
}

impl MediaKind {
    /// Asset family for a reduced-motion preference
    pub fn for_reduced_motion(reduced_motion: bool) -> Self {
        if reduced_motion {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }

    /// Directory name assets of this family live under
    pub fn asset_dir(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    /// File extension assets of this family use
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Video => "webm",
            MediaKind::Image => "webp",
        }
    }
}

/// Host media element trait
///
/// Implementations wrap exactly one element mounted inside the companion
/// container. All methods are synchronous requests; completion of a
/// non-looping video is reported through [`MediaPlayer::notify_ended`].
pub trait MediaElement: Send + Sync {
    /// Asset family this element renders
    fn kind(&self) -> MediaKind;

    /// Point the element at a new source
    ///
    /// # Arguments
    ///
    /// * `src` - Opaque asset URL
    /// * `looping` - Whether playback should repeat forever
    fn set_source(&self, src: &str, looping: bool);

    /// Request playback of the current source
    ///
    /// # Returns
    ///
    /// Returns an error when playback cannot start (autoplay blocked,
    /// decode failure). The player treats that as a completed clip.
    fn play(&self) -> Result<()>;

    /// Pause playback
    fn pause(&self);

    /// Drop the current source
    fn clear_source(&self);

    /// Remove the element from its container
    fn detach(&self);

    /// Currently assigned source, if any
    fn source(&self) -> Option<String>;
}

/// A one-shot was cancelled before it completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCancelled;

impl fmt::Display for PlaybackCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback cancelled")
    }
}

impl std::error::Error for PlaybackCancelled {}

/// How a sequence settled; sequences never fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every one-shot finished and the final clip is looping
    Completed,

    /// A newer play operation or an explicit cancel stopped the chain
    Cancelled,
}
