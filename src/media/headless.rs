//! In-memory media element
//!
//! Records every request made by the player. Used by the command-line driver
//! and by tests to observe exactly what would have been played.

use crate::media::{MediaElement, MediaKind};
use crate::utils::error::{CompanionError, Result};
use parking_lot::Mutex;
use log::debug;

/// A single request received by a [`HeadlessElement`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementCall {
    SetSource { src: String, looping: bool },
    Play,
    Pause,
    ClearSource,
    Detach,
}

#[derive(Debug, Default)]
struct ElementState {
    source: Option<String>,
    looping: bool,
    attached: bool,
    blocked_plays: usize,
    calls: Vec<ElementCall>,
}

/// Media element that lives only in memory
#[derive(Debug)]
pub struct HeadlessElement {
    kind: MediaKind,
    state: Mutex<ElementState>,
}

impl HeadlessElement {
    /// Create an attached element of the given kind
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            state: Mutex::new(ElementState {
                attached: true,
                ..Default::default()
            }),
        }
    }

    /// Make the next `count` play requests fail, as a browser blocking autoplay would
    pub fn block_next_plays(&self, count: usize) {
        self.state.lock().blocked_plays = count;
    }

    /// All requests received so far, in order
    pub fn calls(&self) -> Vec<ElementCall> {
        self.state.lock().calls.clone()
    }

    /// Sources assigned so far, with their looping flag
    pub fn sources(&self) -> Vec<(String, bool)> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ElementCall::SetSource { src, looping } => Some((src.clone(), *looping)),
                _ => None,
            })
            .collect()
    }

    /// Whether the current source repeats
    pub fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    /// Whether the element is still inside its container
    pub fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    /// Forget recorded requests
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

impl MediaElement for HeadlessElement {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn set_source(&self, src: &str, looping: bool) {
        debug!("{:?} element source -> {} (loop: {})", self.kind, src, looping);
        let mut state = self.state.lock();
        state.source = Some(src.to_string());
        state.looping = looping;
        state.calls.push(ElementCall::SetSource {
            src: src.to_string(),
            looping,
        });
    }

    fn play(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(ElementCall::Play);
        if state.blocked_plays > 0 {
            state.blocked_plays -= 1;
            return Err(CompanionError::playback_error("play request was blocked"));
        }
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().calls.push(ElementCall::Pause);
    }

    fn clear_source(&self) {
        let mut state = self.state.lock();
        state.source = None;
        state.looping = false;
        state.calls.push(ElementCall::ClearSource);
    }

    fn detach(&self) {
        let mut state = self.state.lock();
        state.attached = false;
        state.calls.push(ElementCall::Detach);
    }

    fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }
}
