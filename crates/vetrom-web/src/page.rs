#![forbid(unsafe_code)]

//! Page-wide state shared by every widget, independent of the DOM.
//!
//! The wasm layer owns one [`PageCore`] and maps its gallery indices to
//! elements. Everything the public page API returns is computed here.

use vetrom_runtime::logging::LOG_TARGET;
use vetrom_runtime::{GalleryRegistry, LightboxKey, Options};

/// Clicks this close to the bottom of a gallery video belong to its native
/// controls and never open the lightbox.
pub const VIDEO_CONTROL_STRIP_PX: f64 = 50.0;

/// Whether a click at `offset_y` inside a video of `height` hits the
/// native control strip.
#[must_use]
pub fn in_video_control_strip(offset_y: f64, height: f64) -> bool {
    offset_y > height - VIDEO_CONTROL_STRIP_PX
}

/// Parse host options; malformed input is logged and replaced by defaults.
#[must_use]
pub fn load_options(json: Option<&str>) -> Options {
    let Some(json) = json.map(str::trim).filter(|s| !s.is_empty()) else {
        return Options::default();
    };
    match Options::from_json(json) {
        Ok(options) => options,
        Err(err) => {
            tracing::warn!(target: LOG_TARGET, error = %err, "ignoring page options");
            Options::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageCore {
    options: Options,
    galleries: GalleryRegistry,
}

impl PageCore {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            galleries: GalleryRegistry::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn galleries(&self) -> &GalleryRegistry {
        &self.galleries
    }

    pub fn galleries_mut(&mut self) -> &mut GalleryRegistry {
        &mut self.galleries
    }

    /// `getGalleries()` payload.
    #[must_use]
    pub fn galleries_json(&self) -> String {
        serde_json::to_string(&self.galleries.summaries()).unwrap_or_else(|err| {
            tracing::warn!(target: LOG_TARGET, error = %err, "gallery summary failed");
            "[]".to_string()
        })
    }

    /// `goToSlide()`; invalid indices are logged and ignored.
    pub fn go_to_slide(&mut self, gallery: usize, slide: usize) -> bool {
        let moved = self.galleries.go_to_slide(gallery, slide);
        if !moved {
            tracing::debug!(target: LOG_TARGET, gallery, slide, "goToSlide ignored");
        }
        moved
    }

    pub fn open_lightbox(&mut self, gallery: usize, slide: usize) -> bool {
        self.galleries.open_lightbox(gallery, slide)
    }

    pub fn close_lightbox(&mut self) -> Option<(usize, usize)> {
        self.galleries.close_lightbox()
    }

    /// Document keydown. Returns the lightbox action, if any was taken.
    pub fn handle_key(&mut self, key: &str) -> Option<LightboxKey> {
        self.galleries.handle_key(key)
    }
}
