#![forbid(unsafe_code)]

//! Gallery carousels and the shared lightbox.
//!
//! A page owns one [`GalleryRegistry`]. It assigns gallery indices in
//! registration order and holds the single lightbox, which addresses slides
//! as `(gallery, slide)` pairs.
//!
//! # State machine
//!
//! ```text
//! Closed --open(g, s)--> Open{g, s} --next/prev--> Open{g, s±1 mod n}
//!   ^                        |
//!   +------close-------------+   (carousel g jumps to s)
//! ```

use serde::Serialize;
use vetrom_style::theme::Direction;

use crate::media::MediaItem;

/// One carousel.
#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    items: Vec<MediaItem>,
    current: usize,
    direction: Direction,
}

impl Gallery {
    /// Build a carousel from media in document order.
    ///
    /// RTL galleries store their items reversed. Returns `None` when there is
    /// no media, since such containers are left untouched.
    #[must_use]
    pub fn new(mut items: Vec<MediaItem>, direction: Direction) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        if direction.is_rtl() {
            items.reverse();
        }
        Some(Self {
            items,
            current: 0,
            direction,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.items.len();
        self.current
    }

    pub fn prev(&mut self) -> usize {
        self.current = (self.current + self.items.len() - 1) % self.items.len();
        self.current
    }

    /// Jump to `slide`; out-of-range requests are ignored.
    pub fn go_to(&mut self, slide: usize) -> bool {
        if slide < self.items.len() {
            self.current = slide;
            true
        } else {
            false
        }
    }

    /// Track offset in percent: `-i*100` for LTR, `+i*100` for RTL.
    #[must_use]
    pub fn offset_percent(&self) -> i64 {
        let magnitude = self.current as i64 * 100;
        if self.direction.is_rtl() {
            magnitude
        } else {
            -magnitude
        }
    }

    #[must_use]
    pub fn transform_css(&self) -> String {
        format!("translateX({}%)", self.offset_percent())
    }

    /// Video slides that must be paused because they are off screen.
    pub fn offscreen_videos(&self) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(move |(i, item)| item.is_video() && *i != self.current)
            .map(|(i, _)| i)
    }
}

/// Public snapshot of a gallery, as returned by `getGalleries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySummary {
    pub index: usize,
    pub current_slide: usize,
    pub total_slides: usize,
    #[serde(rename = "isRTL")]
    pub is_rtl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open {
        gallery: usize,
        slide: usize,
    },
}

/// What a key press did to the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    Next,
    Prev,
    Close,
}

impl LightboxKey {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Self::Next),
            "ArrowLeft" => Some(Self::Prev),
            "Escape" => Some(Self::Close),
            _ => None,
        }
    }
}

/// Page-wide gallery registry plus the shared lightbox.
#[derive(Debug, Clone, Default)]
pub struct GalleryRegistry {
    galleries: Vec<Gallery>,
    lightbox: LightboxState,
}

impl GalleryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gallery and return its index.
    pub fn register(&mut self, gallery: Gallery) -> usize {
        let index = self.galleries.len();
        tracing::debug!(
            target: crate::logging::LOG_TARGET,
            index,
            slides = gallery.len(),
            rtl = gallery.direction().is_rtl(),
            "gallery registered"
        );
        self.galleries.push(gallery);
        index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.galleries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.galleries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Gallery> {
        self.galleries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Gallery> {
        self.galleries.get_mut(index)
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<GallerySummary> {
        self.galleries
            .iter()
            .enumerate()
            .map(|(index, g)| GallerySummary {
                index,
                current_slide: g.current(),
                total_slides: g.len(),
                is_rtl: g.direction().is_rtl(),
            })
            .collect()
    }

    /// Move a carousel; invalid indices are ignored.
    pub fn go_to_slide(&mut self, gallery: usize, slide: usize) -> bool {
        self.galleries
            .get_mut(gallery)
            .is_some_and(|g| g.go_to(slide))
    }

    #[must_use]
    pub fn lightbox(&self) -> LightboxState {
        self.lightbox
    }

    #[must_use]
    pub fn is_lightbox_open(&self) -> bool {
        matches!(self.lightbox, LightboxState::Open { .. })
    }

    /// Item currently shown in the lightbox.
    #[must_use]
    pub fn lightbox_item(&self) -> Option<&MediaItem> {
        match self.lightbox {
            LightboxState::Open { gallery, slide } => {
                self.galleries.get(gallery)?.items().get(slide)
            }
            LightboxState::Closed => None,
        }
    }

    /// Open the lightbox on a slide. Invalid indices leave it unchanged.
    pub fn open_lightbox(&mut self, gallery: usize, slide: usize) -> bool {
        let valid = self.galleries.get(gallery).is_some_and(|g| slide < g.len());
        if valid {
            self.lightbox = LightboxState::Open { gallery, slide };
            tracing::debug!(target: crate::logging::LOG_TARGET, gallery, slide, "lightbox opened");
        }
        valid
    }

    /// Close the lightbox and move its gallery's carousel to the slide that
    /// was showing. Returns that `(gallery, slide)` pair.
    pub fn close_lightbox(&mut self) -> Option<(usize, usize)> {
        let LightboxState::Open { gallery, slide } = self.lightbox else {
            return None;
        };
        self.lightbox = LightboxState::Closed;
        if let Some(g) = self.galleries.get_mut(gallery) {
            g.go_to(slide);
        }
        tracing::debug!(target: crate::logging::LOG_TARGET, gallery, slide, "lightbox closed");
        Some((gallery, slide))
    }

    pub fn lightbox_next(&mut self) -> Option<&MediaItem> {
        self.step_lightbox(true)
    }

    pub fn lightbox_prev(&mut self) -> Option<&MediaItem> {
        self.step_lightbox(false)
    }

    fn step_lightbox(&mut self, forward: bool) -> Option<&MediaItem> {
        let LightboxState::Open { gallery, slide } = self.lightbox else {
            return None;
        };
        let len = self.galleries.get(gallery)?.len();
        let slide = if forward {
            (slide + 1) % len
        } else {
            (slide + len - 1) % len
        };
        self.lightbox = LightboxState::Open { gallery, slide };
        self.lightbox_item()
    }

    /// Route a key press. Keys are only consumed while the lightbox is open.
    pub fn handle_key(&mut self, key: &str) -> Option<LightboxKey> {
        if !self.is_lightbox_open() {
            return None;
        }
        let action = LightboxKey::from_key(key)?;
        match action {
            LightboxKey::Next => {
                self.lightbox_next();
            }
            LightboxKey::Prev => {
                self.lightbox_prev();
            }
            LightboxKey::Close => {
                self.close_lightbox();
            }
        }
        Some(action)
    }
}
