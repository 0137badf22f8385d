//! Clock-driven audio backend.
//!
//! The actual sound plays in the visitor's browser; this backend mirrors
//! transport timing on the server so the shared controller state stays
//! meaningful. Position advances on a monotonic clock while playing,
//! freezes on pause, and the track "ends" when it crosses the known
//! duration. Uses `tokio::time::Instant`, so tests with a paused runtime
//! clock control it precisely.

use super::backend::{AudioBackend, AudioEvent, AudioHandle};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

pub struct ClockBackend;

impl ClockBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for ClockBackend {
    fn load(
        &self,
        url: &str,
        duration_hint: Option<f64>,
        events: mpsc::UnboundedSender<AudioEvent>,
    ) -> Arc<dyn AudioHandle> {
        let duration = duration_hint.unwrap_or(0.0).max(0.0);
        let failed = url.is_empty();

        if failed {
            let _ = events.send(AudioEvent::LoadFailed {
                message: "episode has no audio URL".to_string(),
            });
        } else {
            let _ = events.send(AudioEvent::Loaded { duration });
        }

        Arc::new(ClockHandle {
            events,
            failed,
            state: Mutex::new(ClockState {
                playing: false,
                base: 0.0,
                started_at: None,
                duration,
                volume: 1.0,
            }),
        })
    }
}

struct ClockState {
    playing: bool,
    /// Position accumulated up to the last pause/seek.
    base: f64,
    /// Set while playing; elapsed time since is added to `base`.
    started_at: Option<Instant>,
    duration: f64,
    volume: f32,
}

impl ClockState {
    fn current_position(&self) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        self.base + elapsed
    }
}

pub struct ClockHandle {
    events: mpsc::UnboundedSender<AudioEvent>,
    failed: bool,
    state: Mutex<ClockState>,
}

impl ClockHandle {
    /// Last applied volume, after clamping.
    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    /// Detect a crossed track end. Called from the read paths, which the
    /// controller polls once per second while playing.
    fn refresh(&self) {
        let mut st = self.state.lock().unwrap();
        if st.playing && st.duration > 0.0 && st.current_position() >= st.duration {
            st.playing = false;
            st.started_at = None;
            st.base = 0.0;
            let _ = self.events.send(AudioEvent::Ended);
        }
    }
}

impl AudioHandle for ClockHandle {
    fn play(&self) {
        if self.failed {
            return;
        }
        let mut st = self.state.lock().unwrap();
        if st.playing {
            return;
        }
        st.playing = true;
        st.started_at = Some(Instant::now());
        let _ = self.events.send(AudioEvent::Started);
    }

    fn pause(&self) {
        let mut st = self.state.lock().unwrap();
        if !st.playing {
            return;
        }
        st.base = st.current_position();
        st.started_at = None;
        st.playing = false;
        let _ = self.events.send(AudioEvent::Paused);
    }

    fn stop(&self) {
        let mut st = self.state.lock().unwrap();
        let was_live = st.playing || st.base > 0.0;
        st.playing = false;
        st.started_at = None;
        st.base = 0.0;
        if was_live {
            let _ = self.events.send(AudioEvent::Stopped);
        }
    }

    fn seek(&self, position: f64) {
        let mut st = self.state.lock().unwrap();
        let mut target = position.max(0.0);
        if st.duration > 0.0 {
            target = target.min(st.duration);
        }
        st.base = target;
        if st.playing {
            st.started_at = Some(Instant::now());
        }
    }

    fn position(&self) -> f64 {
        self.refresh();
        let st = self.state.lock().unwrap();
        let pos = st.current_position();
        if st.duration > 0.0 {
            pos.min(st.duration)
        } else {
            pos
        }
    }

    fn duration(&self) -> f64 {
        self.state.lock().unwrap().duration
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().unwrap().volume = volume.clamp(0.0, 1.0);
    }

    fn is_playing(&self) -> bool {
        self.refresh();
        self.state.lock().unwrap().playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn load_handle(
        url: &str,
        hint: Option<f64>,
    ) -> (Arc<dyn AudioHandle>, mpsc::UnboundedReceiver<AudioEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ClockBackend::new().load(url, hint, tx);
        (handle, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_advances_only_while_playing() {
        let (handle, _rx) = load_handle("https://cdn.example.com/a.mp3", Some(100.0));

        handle.play();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!((handle.position() - 3.0).abs() < 0.05);

        handle.pause();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!((handle.position() - 3.0).abs() < 0.05);
        assert!(!handle.is_playing());

        handle.play();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!((handle.position() - 5.0).abs() < 0.05);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_clamps_to_track_range() {
        let (handle, _rx) = load_handle("https://cdn.example.com/a.mp3", Some(60.0));
        handle.seek(-5.0);
        assert_eq!(handle.position(), 0.0);
        handle.seek(500.0);
        assert_eq!(handle.position(), 60.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ends_after_duration_elapses() {
        let (handle, mut rx) = load_handle("https://cdn.example.com/a.mp3", Some(10.0));
        handle.play();
        tokio::time::advance(Duration::from_secs(11)).await;

        // The crossing is observed on the next sample
        assert!(!handle.is_playing());
        assert_eq!(handle.position(), 0.0);

        assert_eq!(rx.try_recv().unwrap(), AudioEvent::Loaded { duration: 10.0 });
        assert_eq!(rx.try_recv().unwrap(), AudioEvent::Started);
        assert_eq!(rx.try_recv().unwrap(), AudioEvent::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_volume_is_stored_clamped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = ClockHandle {
            events: tx,
            failed: false,
            state: Mutex::new(ClockState {
                playing: false,
                base: 0.0,
                started_at: None,
                duration: 0.0,
                volume: 1.0,
            }),
        };
        handle.set_volume(1.8);
        assert_eq!(handle.volume(), 1.0);
        handle.set_volume(-0.2);
        assert_eq!(handle.volume(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_url_fails_to_load_and_stays_inert() {
        let (handle, mut rx) = load_handle("", Some(10.0));
        assert!(matches!(
            rx.try_recv().unwrap(),
            AudioEvent::LoadFailed { .. }
        ));

        handle.play();
        assert!(!handle.is_playing());
        assert!(rx.try_recv().is_err());
    }
}
