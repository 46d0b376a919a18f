//! In-memory container element

use crate::placement::{CompanionSignal, ContainerElement, Cursor, Landmark};
use parking_lot::Mutex;
use std::collections::HashSet;
use log::debug;

#[derive(Debug)]
struct ContainerState {
    landmarks: HashSet<Landmark>,
    parent: Option<Landmark>,
    visible: bool,
    cursor: Cursor,
    signals: Vec<CompanionSignal>,
    detaches: usize,
}

/// Container element that lives only in memory
#[derive(Debug)]
pub struct HeadlessContainer {
    state: Mutex<ContainerState>,
}

impl HeadlessContainer {
    /// A page offering every landmark
    pub fn new() -> Self {
        Self::with_landmarks(&[Landmark::ColumnEnd, Landmark::SiteNotice])
    }

    /// A page offering only the given landmarks
    pub fn with_landmarks(landmarks: &[Landmark]) -> Self {
        Self {
            state: Mutex::new(ContainerState {
                landmarks: landmarks.iter().copied().collect(),
                parent: None,
                visible: true,
                cursor: Cursor::Unset,
                signals: Vec::new(),
                detaches: 0,
            }),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    pub fn cursor(&self) -> Cursor {
        self.state.lock().cursor
    }

    /// Signals emitted so far
    pub fn signals(&self) -> Vec<CompanionSignal> {
        self.state.lock().signals.clone()
    }

    /// How many times the container was removed from the page
    pub fn detach_count(&self) -> usize {
        self.state.lock().detaches
    }
}

impl Default for HeadlessContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerElement for HeadlessContainer {
    fn landmark_available(&self, landmark: Landmark) -> bool {
        self.state.lock().landmarks.contains(&landmark)
    }

    fn attach_to(&self, landmark: Landmark) {
        debug!("Container attached to {:?}", landmark);
        self.state.lock().parent = Some(landmark);
    }

    fn detach(&self) {
        let mut state = self.state.lock();
        state.parent = None;
        state.detaches += 1;
    }

    fn parent(&self) -> Option<Landmark> {
        self.state.lock().parent
    }

    fn set_visible(&self, visible: bool) {
        self.state.lock().visible = visible;
    }

    fn set_cursor(&self, cursor: Cursor) {
        self.state.lock().cursor = cursor;
    }

    fn emit(&self, signal: CompanionSignal) {
        debug!("Container emitted {:?}", signal);
        self.state.lock().signals.push(signal);
    }
}
