#![forbid(unsafe_code)]

//! Hover previews over the progress bar.
//!
//! Frames are captured from a hidden clone of the video. A capture either
//! produces an image URL or, on error or after [`THUMBNAIL_TIMEOUT`], is
//! reported unavailable. Only successful captures are cached, keyed by
//! whole second.

use std::collections::HashMap;
use std::time::Duration;

/// Upper bound on a single frame capture.
pub const THUMBNAIL_TIMEOUT: Duration = Duration::from_millis(1500);
/// Target preview width in pixels.
pub const THUMBNAIL_WIDTH: u32 = 160;

/// Media time under a pointer at `x` on a bar `width` pixels wide.
#[must_use]
pub fn hover_time(x: f64, width: f64, duration: f64) -> f64 {
    crate::player::pointer_seek(x, width, duration)
}

/// Cache key for a media time.
#[must_use]
pub fn thumbnail_key(time: f64) -> u64 {
    if time.is_finite() && time > 0.0 {
        time.round() as u64
    } else {
        0
    }
}

/// Canvas size for a capture of a `video_width` x `video_height` frame.
///
/// Unknown sizes assume 320x180. Scale stays within `[0.2, 1]`.
#[must_use]
pub fn frame_size(video_width: u32, video_height: u32) -> (u32, u32) {
    let vw = if video_width == 0 { 320 } else { video_width };
    let vh = if video_height == 0 { 180 } else { video_height };
    let scale = (f64::from(THUMBNAIL_WIDTH) / f64::from(vw)).clamp(0.2, 1.0);
    (
        (f64::from(vw) * scale).round() as u32,
        (f64::from(vh) * scale).round() as u32,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Ready(String),
    Pending { deadline: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailLookup<'a> {
    Ready(&'a str),
    /// A capture for this key is in flight.
    Pending,
    /// Nothing cached; the host should start a capture.
    Request,
}

#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    slots: HashMap<u64, Slot>,
}

impl ThumbnailCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`. A miss is recorded as pending until `now + THUMBNAIL_TIMEOUT`.
    pub fn lookup(&mut self, key: u64, now: Duration) -> ThumbnailLookup<'_> {
        if !self.slots.contains_key(&key) {
            self.slots.insert(
                key,
                Slot::Pending {
                    deadline: now + THUMBNAIL_TIMEOUT,
                },
            );
            return ThumbnailLookup::Request;
        }
        match self.slots.get(&key) {
            Some(Slot::Ready(url)) => ThumbnailLookup::Ready(url),
            _ => ThumbnailLookup::Pending,
        }
    }

    /// Finish a capture. `None` means unavailable and is not cached.
    ///
    /// Returns whether the result was accepted; a result arriving after the
    /// request expired is dropped.
    pub fn resolve(&mut self, key: u64, url: Option<String>) -> bool {
        if !matches!(self.slots.get(&key), Some(Slot::Pending { .. })) {
            return false;
        }
        match url {
            Some(url) => {
                self.slots.insert(key, Slot::Ready(url));
                true
            }
            None => {
                self.slots.remove(&key);
                false
            }
        }
    }

    /// Give up on captures past their deadline. Returns the abandoned keys.
    pub fn expire(&mut self, now: Duration) -> Vec<u64> {
        let mut expired: Vec<u64> = self
            .slots
            .iter()
            .filter_map(|(&key, slot)| match slot {
                Slot::Pending { deadline } if now >= *deadline => Some(key),
                _ => None,
            })
            .collect();
        expired.sort_unstable();
        for key in &expired {
            self.slots.remove(key);
        }
        expired
    }

    #[must_use]
    pub fn ready_len(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn keys_round_to_seconds() {
        assert_eq!(thumbnail_key(12.4), 12);
        assert_eq!(thumbnail_key(12.5), 13);
        assert_eq!(thumbnail_key(f64::NAN), 0);
        assert_eq!(thumbnail_key(-3.0), 0);
        assert_eq!(hover_time(25.0, 100.0, 60.0), 15.0);
    }

    #[test]
    fn frame_scaling() {
        assert_eq!(frame_size(1920, 1080), (384, 216));
        assert_eq!(frame_size(640, 360), (160, 90));
        assert_eq!(frame_size(120, 90), (120, 90));
        assert_eq!(frame_size(0, 0), (160, 90));
    }

    #[test]
    fn miss_then_ready() {
        let mut cache = ThumbnailCache::new();
        assert_eq!(cache.lookup(4, ms(0)), ThumbnailLookup::Request);
        assert_eq!(cache.lookup(4, ms(10)), ThumbnailLookup::Pending);
        assert!(cache.resolve(4, Some("data:a".into())));
        assert_eq!(cache.lookup(4, ms(20)), ThumbnailLookup::Ready("data:a"));
        assert_eq!(cache.ready_len(), 1);
    }

    #[test]
    fn unavailable_is_retried() {
        let mut cache = ThumbnailCache::new();
        cache.lookup(4, ms(0));
        assert!(!cache.resolve(4, None));
        assert_eq!(cache.lookup(4, ms(10)), ThumbnailLookup::Request);
    }

    #[test]
    fn timeout_abandons_capture() {
        let mut cache = ThumbnailCache::new();
        cache.lookup(1, ms(0));
        cache.lookup(2, ms(1_000));
        assert_eq!(cache.expire(ms(1_499)), Vec::<u64>::new());
        assert_eq!(cache.expire(ms(1_500)), vec![1]);
        assert!(!cache.resolve(1, Some("late".into())));
        assert_eq!(cache.expire(ms(5_000)), vec![2]);
        assert_eq!(cache.ready_len(), 0);
    }
}
