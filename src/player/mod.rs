//! The shared playback controller.
//!
//! One [`Player`] owns at most one live audio handle and is the only thing
//! that touches it; every UI surface reads the published
//! [`PlaybackState`] snapshot and calls the transport operations. Episode
//! switches crossfade: the old handle ramps down and is released while the
//! new one ramps up, and a switch arriving mid-fade cancels the pending
//! ramp and stops the discarded handle immediately.

pub mod backend;
pub mod clock;


use crate::config::PlayerConfig;
use crate::model::Episode;
use backend::{AudioBackend, AudioEvent, AudioHandle};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Volume ramps run in this many equal steps across the crossfade window.
const FADE_STEPS: u32 = 10;

/// Published transport state. `position`/`duration` are refreshed once per
/// poll interval while playing.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackState {
    pub current_episode: Option<Episode>,
    pub is_playing: bool,
    pub volume: f32,
    pub position: f64,
    pub duration: f64,
}

struct Inner {
    handle: Option<Arc<dyn AudioHandle>>,
    episode: Option<Episode>,
    is_playing: bool,
    volume: f32,
    position: f64,
    duration: f64,
    /// Cancels the event pump, fade-in, and poll tasks tied to the current
    /// handle. Replaced wholesale whenever the handle is.
    tasks: CancellationToken,
    /// Cancels a pending fade-out of a discarded handle.
    fade_out: CancellationToken,
    /// Poll task for the current handle; replaced on every Started event.
    poll: Option<CancellationToken>,
}

pub struct Player {
    backend: Arc<dyn AudioBackend>,
    crossfade: Duration,
    poll_interval: Duration,
    skip_seconds: f64,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<PlaybackState>,
}

impl Player {
    pub fn new(backend: Arc<dyn AudioBackend>, config: &PlayerConfig) -> Arc<Self> {
        let volume = config.volume.clamp(0.0, 1.0);
        let initial = PlaybackState {
            current_episode: None,
            is_playing: false,
            volume,
            position: 0.0,
            duration: 0.0,
        };
        let (state_tx, _) = watch::channel(initial);

        Arc::new(Self {
            backend,
            crossfade: Duration::from_millis(config.crossfade_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            skip_seconds: config.skip_seconds,
            inner: Mutex::new(Inner {
                handle: None,
                episode: None,
                is_playing: false,
                volume,
                position: 0.0,
                duration: 0.0,
                tasks: CancellationToken::new(),
                fade_out: CancellationToken::new(),
                poll: None,
            }),
            state_tx,
        })
    }

    /// Subscribe to state changes. Any number of surfaces can hold a
    /// receiver; the channel always carries the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    /// Current snapshot.
    pub fn state(&self) -> PlaybackState {
        self.state_tx.borrow().clone()
    }

    /// Switch to `episode`, crossfading out whatever is playing.
    ///
    /// The discarded handle is guaranteed released by the end of the fade
    /// window; `current_episode` updates immediately and the position
    /// resets to 0. Load failures are logged, never returned.
    pub fn play_episode(self: &Arc<Self>, episode: Episode) {
        let mut inner = self.inner.lock().unwrap();

        // Retire everything tied to the outgoing handle.
        inner.tasks.cancel();
        inner.tasks = CancellationToken::new();
        inner.poll = None;
        inner.fade_out.cancel();
        inner.fade_out = CancellationToken::new();

        if let Some(old) = inner.handle.take() {
            if old.is_playing() {
                tokio::spawn(fade_out_and_release(
                    old,
                    inner.volume,
                    self.crossfade,
                    inner.fade_out.clone(),
                ));
            } else {
                old.stop();
            }
        }

        tracing::info!("Playing episode: {} ({})", episode.title, episode.id);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = self.backend.load(&episode.audio, episode.duration, event_tx);
        // Fade-in starts from silence once the handle reports Started.
        handle.set_volume(0.0);
        handle.play();

        inner.duration = episode.duration.unwrap_or(0.0);
        inner.handle = Some(handle);
        inner.episode = Some(episode);
        inner.is_playing = false;
        inner.position = 0.0;
        self.publish(&inner);

        let pump_token = inner.tasks.clone();
        drop(inner);
        tokio::spawn(self.clone().event_pump(event_rx, pump_token));
    }

    /// No-op when nothing is loaded.
    pub fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(handle) = &inner.handle {
            handle.pause();
            inner.is_playing = false;
            self.publish(&inner);
        }
    }

    /// No-op when nothing is loaded.
    pub fn resume(&self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(handle) = &inner.handle {
            handle.play();
            inner.is_playing = true;
            self.publish(&inner);
        }
    }

    pub fn toggle_play_pause(&self) {
        let playing = self.inner.lock().unwrap().is_playing;
        if playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Halt and release the resource, clear the loaded episode.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.tasks.cancel();
        inner.tasks = CancellationToken::new();
        inner.poll = None;
        inner.fade_out.cancel();
        inner.fade_out = CancellationToken::new();

        if let Some(handle) = inner.handle.take() {
            handle.stop();
        }
        inner.episode = None;
        inner.is_playing = false;
        inner.position = 0.0;
        inner.duration = 0.0;
        self.publish(&inner);
    }

    /// Absolute seek; the handle clamps to its valid range.
    pub fn seek(&self, position: f64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(handle) = &inner.handle {
            handle.seek(position);
            inner.position = handle.position();
            self.publish(&inner);
        }
    }

    pub fn skip_forward(&self, seconds: Option<f64>) {
        let seconds = seconds.unwrap_or(self.skip_seconds);
        let mut inner = self.inner.lock().unwrap();
        if let Some(handle) = &inner.handle {
            let duration = handle.duration();
            let target = if duration > 0.0 {
                (handle.position() + seconds).min(duration)
            } else {
                handle.position() + seconds
            };
            handle.seek(target);
            inner.position = handle.position();
            self.publish(&inner);
        }
    }

    pub fn skip_backward(&self, seconds: Option<f64>) {
        let seconds = seconds.unwrap_or(self.skip_seconds);
        let mut inner = self.inner.lock().unwrap();
        if let Some(handle) = &inner.handle {
            let target = (handle.position() - seconds).max(0.0);
            handle.seek(target);
            inner.position = handle.position();
            self.publish(&inner);
        }
    }

    /// Clamp to [0, 1], apply to the live handle if any, and store as the
    /// default for the next `play_episode`.
    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        let mut inner = self.inner.lock().unwrap();
        inner.volume = volume;
        if let Some(handle) = &inner.handle {
            handle.set_volume(volume);
        }
        self.publish(&inner);
    }

    /// Play the episode after the current one in `episodes`, wrapping from
    /// the last back to the first. No-op when nothing is loaded, the list
    /// is empty, or the current episode is not in the list.
    pub fn play_next(self: &Arc<Self>, episodes: &[Episode]) {
        if let Some(index) = self.current_index(episodes) {
            let next = (index + 1) % episodes.len();
            self.play_episode(episodes[next].clone());
        }
    }

    /// Counterpart of [`play_next`](Self::play_next), wrapping from the
    /// first episode back to the last.
    pub fn play_previous(self: &Arc<Self>, episodes: &[Episode]) {
        if let Some(index) = self.current_index(episodes) {
            let previous = if index == 0 {
                episodes.len() - 1
            } else {
                index - 1
            };
            self.play_episode(episodes[previous].clone());
        }
    }

    fn current_index(&self, episodes: &[Episode]) -> Option<usize> {
        if episodes.is_empty() {
            return None;
        }
        let current_id = {
            let inner = self.inner.lock().unwrap();
            inner.episode.as_ref().map(|e| e.id.clone())
        }?;
        episodes.iter().position(|e| e.id == current_id)
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(PlaybackState {
            current_episode: inner.episode.clone(),
            is_playing: inner.is_playing,
            volume: inner.volume,
            position: inner.position,
            duration: inner.duration,
        });
    }

    /// Drain events from the current handle until it is replaced. Stale
    /// handles' pumps die on their cancelled token, so a late event from a
    /// discarded resource can never touch the state.
    async fn event_pump(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<AudioEvent>,
        token: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.on_event(event, &token),
                    None => break,
                },
            }
        }
    }

    fn on_event(self: &Arc<Self>, event: AudioEvent, token: &CancellationToken) {
        let mut inner = self.inner.lock().unwrap();
        // A pump can lose the lock race with play_episode after pulling an
        // event off the channel; its token is cancelled by then, so the
        // stale event must not touch the replacement handle's state.
        if token.is_cancelled() {
            return;
        }
        match event {
            AudioEvent::Loaded { duration } => {
                if duration > 0.0 {
                    inner.duration = duration;
                    self.publish(&inner);
                }
            }
            AudioEvent::Started => {
                inner.is_playing = true;
                self.publish(&inner);

                let Some(handle) = inner.handle.clone() else {
                    return;
                };

                // Ramp up to the stored volume.
                tokio::spawn(self.clone().fade_in(handle, token.child_token()));

                // One poll task per playing stretch; it exits by itself
                // once the handle stops playing.
                if let Some(poll) = inner.poll.take() {
                    poll.cancel();
                }
                let poll_token = token.child_token();
                inner.poll = Some(poll_token.clone());
                tokio::spawn(self.clone().poll_position(poll_token));
            }
            AudioEvent::Paused => {
                inner.is_playing = false;
                self.publish(&inner);
            }
            AudioEvent::Stopped | AudioEvent::Ended => {
                inner.is_playing = false;
                inner.position = 0.0;
                self.publish(&inner);
            }
            AudioEvent::LoadFailed { message } => {
                tracing::error!("Error loading audio: {}", message);
                token.cancel();
                inner.handle = None;
                inner.episode = None;
                inner.is_playing = false;
                inner.position = 0.0;
                inner.duration = 0.0;
                self.publish(&inner);
            }
        }
    }

    /// Ramp the new handle from silence up over the crossfade window. The
    /// target is re-read per step, so a volume change landing mid-fade
    /// becomes the ramp's new destination instead of being overwritten by
    /// the remaining steps.
    async fn fade_in(self: Arc<Self>, handle: Arc<dyn AudioHandle>, cancel: CancellationToken) {
        let step = self.crossfade / FADE_STEPS;
        for i in 1..=FADE_STEPS {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(step) => {
                    let target = self.inner.lock().unwrap().volume;
                    handle.set_volume(target * i as f32 / FADE_STEPS as f32);
                }
            }
        }
    }

    /// Refresh position/duration once per interval while the handle plays;
    /// stops itself as soon as it is not, so no timer outlives playback.
    async fn poll_position(self: Arc<Self>, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {
                    let mut inner = self.inner.lock().unwrap();
                    let Some(handle) = inner.handle.clone() else { break };
                    if !handle.is_playing() {
                        break;
                    }
                    inner.position = handle.position();
                    let duration = handle.duration();
                    if duration > 0.0 {
                        inner.duration = duration;
                    }
                    self.publish(&inner);
                }
            }
        }
    }
}

/// Ramp the discarded handle down over the crossfade window and release it.
/// Cancellation (another switch mid-fade) skips the remaining ramp and
/// stops the handle immediately; either way it ends up released.
async fn fade_out_and_release(
    handle: Arc<dyn AudioHandle>,
    from: f32,
    over: Duration,
    cancel: CancellationToken,
) {
    let step = over / FADE_STEPS;
    for i in 1..=FADE_STEPS {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(step) => {
                handle.set_volume(from * (1.0 - i as f32 / FADE_STEPS as f32));
            }
        }
    }
    handle.stop();
}
