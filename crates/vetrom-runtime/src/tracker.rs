#![forbid(unsafe_code)]

//! Playback lifecycle driving the position cache.
//!
//! The host forwards media events with the current playhead and a wall-clock
//! timestamp; the tracker decides when to load, save, or clear.
//!
//! | Event | Effect |
//! |---|---|
//! | metadata (first only) | load; resume if inside the window |
//! | play | arm periodic saves |
//! | tick while playing | save when the period elapsed |
//! | pause | disarm and save |
//! | time update | save, throttled |
//! | unload | save |
//! | ended | remove the record |

use crate::logging::LOG_TARGET;
use crate::options::PlayerTiming;
use crate::position::{KeyValueStore, PositionCache};

/// Stored offsets at or below this are not worth resuming.
pub const RESUME_MIN_SECS: f64 = 5.0;
/// Stored offsets this close to the end restart from the beginning.
pub const RESUME_TAIL_SECS: f64 = 10.0;

/// Whether `offset` is worth seeking to in media of length `duration`.
#[must_use]
pub fn should_resume(offset: f64, duration: f64) -> bool {
    offset > RESUME_MIN_SECS && offset < duration - RESUME_TAIL_SECS
}

/// Current media state, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    pub time: f64,
    /// NaN or infinite while unknown.
    pub duration: f64,
}

impl Playhead {
    #[must_use]
    pub const fn new(time: f64, duration: f64) -> Self {
        Self { time, duration }
    }
}

/// Per-element persistence state.
#[derive(Debug, Clone)]
pub struct PlaybackTracker {
    key: String,
    src: String,
    save_interval_ms: u64,
    throttle_ms: u64,
    loaded: bool,
    /// Next periodic save while playing.
    next_save_ms: Option<u64>,
    last_throttled_save_ms: Option<u64>,
}

impl PlaybackTracker {
    #[must_use]
    pub fn new(key: impl Into<String>, src: impl Into<String>, timing: &PlayerTiming) -> Self {
        Self {
            key: key.into(),
            src: src.into(),
            save_interval_ms: timing.save_interval_ms,
            throttle_ms: timing.time_update_throttle_ms,
            loaded: false,
            next_save_ms: None,
            last_throttled_save_ms: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.next_save_ms.is_some()
    }

    /// Point the tracker at a new source (quality switch).
    pub fn rebind(&mut self, key: impl Into<String>, src: impl Into<String>) {
        self.key = key.into();
        self.src = src.into();
    }

    /// Load once. Returns the offset to seek to, if any.
    pub fn on_metadata<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        duration: f64,
        now_ms: u64,
    ) -> Option<f64> {
        if self.loaded {
            return None;
        }
        self.loaded = true;
        let offset = cache.load(&self.key, Some(duration), &self.src, now_ms)?;
        if should_resume(offset, duration) {
            tracing::debug!(target: LOG_TARGET, key = %self.key, offset, "resuming playback");
            Some(offset)
        } else {
            None
        }
    }

    pub fn on_play(&mut self, now_ms: u64) {
        self.next_save_ms = Some(now_ms.saturating_add(self.save_interval_ms));
    }

    pub fn on_pause<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        playhead: Playhead,
        now_ms: u64,
    ) {
        self.next_save_ms = None;
        self.save(cache, playhead, now_ms);
    }

    /// Periodic save while playing. Returns whether a save happened.
    pub fn on_tick<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        playhead: Playhead,
        now_ms: u64,
    ) -> bool {
        match self.next_save_ms {
            Some(due) if now_ms >= due => {
                self.next_save_ms = Some(now_ms.saturating_add(self.save_interval_ms));
                self.save(cache, playhead, now_ms);
                true
            }
            _ => false,
        }
    }

    /// Throttled save on `timeupdate` (covers scrubbing while paused).
    pub fn on_time_update<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        playhead: Playhead,
        now_ms: u64,
    ) -> bool {
        let due = self
            .last_throttled_save_ms
            .is_none_or(|last| now_ms.saturating_sub(last) > self.throttle_ms);
        if due {
            self.last_throttled_save_ms = Some(now_ms);
            self.save(cache, playhead, now_ms);
        }
        due
    }

    pub fn on_unload<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        playhead: Playhead,
        now_ms: u64,
    ) {
        self.save(cache, playhead, now_ms);
    }

    /// Finished media starts from the beginning next time.
    pub fn on_ended<S: KeyValueStore>(&mut self, cache: &mut PositionCache<S>) {
        self.next_save_ms = None;
        if let Err(error) = cache.remove(&self.key) {
            tracing::warn!(target: LOG_TARGET, key = %self.key, %error, "failed to clear position");
        }
    }

    fn save<S: KeyValueStore>(&self, cache: &mut PositionCache<S>, playhead: Playhead, now_ms: u64) {
        if let Err(error) = cache.save(&self.key, playhead.time, playhead.duration, &self.src, now_ms) {
            tracing::warn!(target: LOG_TARGET, key = %self.key, %error, "failed to save position");
        }
    }
}
