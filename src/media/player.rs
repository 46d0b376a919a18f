//! Media player implementation for the companion
//!
//! The [`MediaPlayer`] plays one source at a time on a shared host element,
//! either as a forever-loop or as a one-shot, and strings one-shots into
//! sequences whose last clip loops. Starting any play operation cancels the
//! previous one first; that cancel-then-start barrier is the only mutual
//! exclusion between the behaviors sharing the player.

use crate::media::{MediaElement, MediaKind, PlaybackCancelled, SequenceOutcome};
use crate::utils::config::PlayerSettings;
use crate::utils::error::CompanionError;

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use log::{debug, error, info, warn};

/// Identifies one play operation
///
/// Every play request and every cancel moves the player to a new epoch, so a
/// token stays current only until someone else touches the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackToken {
    epoch: u64,
}

/// The one outstanding completion listener
struct Pending {
    token: PlaybackToken,
    done: oneshot::Sender<()>,
}

struct PlayerInner {
    /// `None` once the player has been cleaned up
    element: Option<Arc<dyn MediaElement>>,
    epoch: u64,
    pending: Option<Pending>,
}

impl PlayerInner {
    /// Drop the pending listener, which settles its one-shot as cancelled
    fn cancel(&mut self) -> bool {
        self.epoch += 1;
        match self.pending.take() {
            Some(pending) => {
                debug!("Cancelled pending playback (epoch {})", pending.token.epoch);
                true
            }
            None => false,
        }
    }
}

/// Player driving a single media element
#[derive(Clone)]
pub struct MediaPlayer {
    inner: Arc<Mutex<PlayerInner>>,
    kind: MediaKind,
    settings: PlayerSettings,
}

impl MediaPlayer {
    /// Create a player for an element already mounted in the container
    pub fn new(element: Arc<dyn MediaElement>, settings: PlayerSettings) -> Self {
        let kind = element.kind();
        Self {
            inner: Arc::new(Mutex::new(PlayerInner {
                element: Some(element),
                epoch: 0,
                pending: None,
            })),
            kind,
            settings,
        }
    }

    /// Asset family of the underlying element
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Token for the current epoch
    pub fn token(&self) -> PlaybackToken {
        PlaybackToken {
            epoch: self.inner.lock().epoch,
        }
    }

    /// Whether nothing has touched the player since `token` was taken
    pub fn is_current(&self, token: PlaybackToken) -> bool {
        self.inner.lock().epoch == token.epoch
    }

    /// Whether a one-shot is waiting for completion
    pub fn has_pending_playback(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// Whether `cleanup` has run
    pub fn is_disposed(&self) -> bool {
        self.inner.lock().element.is_none()
    }

    /// Source currently assigned to the element
    pub fn current_source(&self) -> Option<String> {
        let element = self.inner.lock().element.clone();
        element.and_then(|e| e.source())
    }

    /// Play a source in a loop
    ///
    /// Cancels any pending operation and returns once playback has been
    /// requested. A refused play request is logged and otherwise ignored.
    pub fn play_loop(&self, src: &str) {
        let element = {
            let mut inner = self.inner.lock();
            inner.cancel();
            inner.element.clone()
        };

        let Some(element) = element else {
            debug!("Ignoring loop of {} on a disposed player", src);
            return;
        };

        debug!("Looping {}", src);
        element.set_source(src, true);
        if let Err(e) = element.play() {
            log_play_failure("Loop", src, &e);
        }
    }

    /// Play a source once
    ///
    /// The cancel-then-start step happens immediately, before the returned
    /// future is polled. The future resolves when the clip ends (video) or
    /// after `duration` (image, default from [`PlayerSettings`]), and also when
    /// playback fails to start. It resolves to `Err(PlaybackCancelled)` only if
    /// the clip is cancelled first.
    pub fn play_once(
        &self,
        src: &str,
        duration: Option<Duration>,
    ) -> impl Future<Output = Result<(), PlaybackCancelled>> + Send + 'static {
        self.start_once(src, duration).1
    }

    /// Play sources in order, looping the last one
    ///
    /// The first step starts immediately. Each later step starts only if the
    /// previous one completed and nothing else has used the player since.
    /// An empty list completes without touching the element.
    pub fn play_sequence(
        &self,
        sources: Vec<String>,
    ) -> impl Future<Output = SequenceOutcome> + Send + 'static {
        let player = self.clone();
        let len = sources.len();
        let first = match len {
            0 => None,
            1 => {
                self.play_loop(&sources[0]);
                None
            }
            _ => Some(self.start_once(&sources[0], None)),
        };

        async move {
            let Some(mut step) = first else {
                return SequenceOutcome::Completed;
            };

            for src in &sources[1..len - 1] {
                if !player.finish_step(step).await {
                    return SequenceOutcome::Cancelled;
                }
                step = player.start_once(src, None);
            }

            if !player.finish_step(step).await {
                return SequenceOutcome::Cancelled;
            }

            player.play_loop(&sources[len - 1]);
            SequenceOutcome::Completed
        }
    }

    /// Cancel any pending one-shot or sequence step
    ///
    /// Safe to call repeatedly; later calls find nothing to cancel.
    pub fn cancel_playback(&self) {
        self.inner.lock().cancel();
    }

    /// Report that the element reached the end of a non-looping clip
    pub fn notify_ended(&self) {
        let pending = self.inner.lock().pending.take();
        if let Some(pending) = pending {
            debug!("Playback ended (epoch {})", pending.token.epoch);
            let _ = pending.done.send(());
        }
    }

    /// Report that playback failed after it was requested
    ///
    /// Treated exactly like a completed clip.
    pub fn notify_error(&self, message: &str) {
        warn!("Media element reported an error: {}", message);
        self.notify_ended();
    }

    /// Cancel playback and release the element; the player is unusable afterwards
    pub fn cleanup(&self) {
        let element = {
            let mut inner = self.inner.lock();
            inner.cancel();
            inner.element.take()
        };

        if let Some(element) = element {
            info!("Releasing {:?} media element", self.kind);
            element.pause();
            element.clear_source();
            element.detach();
        }
    }

    /// Start a one-shot and hand back its token with the completion future
    fn start_once(
        &self,
        src: &str,
        duration: Option<Duration>,
    ) -> (PlaybackToken, impl Future<Output = Result<(), PlaybackCancelled>> + Send + 'static) {
        let (done, rx) = oneshot::channel();

        let (token, element) = {
            let mut inner = self.inner.lock();
            inner.cancel();
            let token = PlaybackToken { epoch: inner.epoch };
            let element = inner.element.clone();
            if element.is_some() {
                inner.pending = Some(Pending { token, done });
            }
            (token, element)
        };

        match element {
            Some(element) => {
                debug!("Playing {} once (epoch {})", src, token.epoch);
                element.set_source(src, false);
                if let Err(e) = element.play() {
                    log_play_failure("One-shot", src, &e);
                    self.complete(token);
                }
            }
            None => debug!("Ignoring one-shot of {} on a disposed player", src),
        }

        let timer = match self.kind {
            MediaKind::Image => Some(duration.unwrap_or_else(|| self.settings.image_step())),
            MediaKind::Video => None,
        };
        let player = self.clone();

        let completion = async move {
            let mut rx = rx;
            if let Some(delay) = timer {
                tokio::select! {
                    res = &mut rx => return res.map_err(|_| PlaybackCancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                player.complete(token);
            }
            rx.await.map_err(|_| PlaybackCancelled)
        };

        (token, completion)
    }

    /// Await a sequence step and check it still owns the player
    async fn finish_step(
        &self,
        step: (PlaybackToken, impl Future<Output = Result<(), PlaybackCancelled>>),
    ) -> bool {
        let (token, completion) = step;
        completion.await.is_ok() && self.is_current(token)
    }

    /// Settle the pending one-shot if it still belongs to `token`
    fn complete(&self, token: PlaybackToken) {
        let mut inner = self.inner.lock();
        if inner.pending.as_ref().is_some_and(|p| p.token == token) {
            if let Some(pending) = inner.pending.take() {
                let _ = pending.done.send(());
            }
        }
    }
}

fn log_play_failure(what: &str, src: &str, err: &CompanionError) {
    if err.is_recoverable() {
        warn!("{} playback of {} did not start: {}", what, src, err);
    } else {
        error!("{} playback of {} failed: {}", what, src, err);
    }
}
