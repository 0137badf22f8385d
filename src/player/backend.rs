//! The seam between the playback controller and whatever actually produces
//! sound. The controller only ever talks to these traits; transitions are
//! driven by explicit [`AudioEvent`]s so the state machine is testable
//! without any audio stack.

use std::sync::Arc;
use tokio::sync::mpsc;

/// Lifecycle events reported by an audio handle. Each one triggers a
/// state-machine transition in the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The resource is playable; duration is 0 when unknown.
    Loaded { duration: f64 },
    /// The resource started (or resumed) producing sound.
    Started,
    Paused,
    Stopped,
    /// Natural end of the track.
    Ended,
    LoadFailed { message: String },
}

/// One live audio resource. At most one exists per controller at any time.
pub trait AudioHandle: Send + Sync {
    fn play(&self);
    fn pause(&self);
    /// Halt and release the underlying resource. Idempotent.
    fn stop(&self);
    /// Absolute seek in seconds; implementations clamp to their valid range.
    fn seek(&self, position: f64);
    fn position(&self) -> f64;
    /// Track length in seconds, 0 when unknown.
    fn duration(&self) -> f64;
    /// Volume in [0, 1]; implementations clamp.
    fn set_volume(&self, volume: f32);
    fn is_playing(&self) -> bool;
}

/// Factory for audio handles.
pub trait AudioBackend: Send + Sync {
    /// Create a handle for `url`. Events (including load failures) are
    /// reported through `events`; `duration_hint` carries the feed's
    /// enclosure duration when the backend cannot measure one itself.
    fn load(
        &self,
        url: &str,
        duration_hint: Option<f64>,
        events: mpsc::UnboundedSender<AudioEvent>,
    ) -> Arc<dyn AudioHandle>;
}
