#![forbid(unsafe_code)]

//! Brightness scores and readable-foreground selection.
//!
//! Two formulas coexist and are chosen per widget, never mixed:
//!
//! | Model | Domain | Used by |
//! |-------|--------|---------|
//! | [`Hsp`] | `[0, 255]` | code blocks |
//! | [`RelativeLuminance`] | `[0, 1]` | galleries, v2 player auto theme |
//!
//! Scores are only ever compared against thresholds; they are not exposed to
//! rendering code as absolute values.

use crate::color::Rgb;

/// Which side of the threshold the foreground text lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Foreground {
    /// Dark text, for bright backgrounds.
    Dark,
    /// Light text, for dark backgrounds.
    Light,
}

/// Result of a contrast decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contrast {
    pub foreground: Foreground,
    /// Render the background at [`SOFTEN_ALPHA`] instead of fully opaque.
    pub soften: bool,
}

/// Opacity applied to glare-zone backgrounds.
pub const SOFTEN_ALPHA: f64 = 0.88;

/// A brightness formula plus the thresholds that go with its domain.
pub trait BrightnessModel {
    fn score(&self, rgb: Rgb) -> f64;

    fn contrast(&self, rgb: Rgb) -> Contrast;
}

/// HSP perceived brightness: `sqrt(0.299 r² + 0.587 g² + 0.114 b²)`.
#[must_use]
pub fn hsp_brightness(rgb: Rgb) -> f64 {
    let r = f64::from(rgb.r);
    let g = f64::from(rgb.g);
    let b = f64::from(rgb.b);
    (0.299 * r * r + 0.587 * g * g + 0.114 * b * b).sqrt()
}

/// Relative luminance with sRGB linearization, in `[0, 1]`.
#[must_use]
pub fn relative_luminance(rgb: Rgb) -> f64 {
    0.2126 * linearize(rgb.r) + 0.7152 * linearize(rgb.g) + 0.0722 * linearize(rgb.b)
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Square-root perceptual model with a glare zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsp {
    /// Above this, text goes dark.
    pub text_threshold: f64,
    /// Above this, the background is softened as well.
    pub glare_threshold: f64,
}

impl Hsp {
    pub const DEFAULT: Self = Self {
        text_threshold: 155.0,
        glare_threshold: 225.0,
    };
}

impl Default for Hsp {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BrightnessModel for Hsp {
    fn score(&self, rgb: Rgb) -> f64 {
        hsp_brightness(rgb)
    }

    fn contrast(&self, rgb: Rgb) -> Contrast {
        let score = self.score(rgb);
        Contrast {
            foreground: if score > self.text_threshold {
                Foreground::Dark
            } else {
                Foreground::Light
            },
            soften: score > self.glare_threshold,
        }
    }
}

/// Linearized relative luminance; never softens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeLuminance {
    /// Below this the background counts as dark.
    pub threshold: f64,
}

impl RelativeLuminance {
    pub const DEFAULT: Self = Self { threshold: 0.5 };
}

impl Default for RelativeLuminance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BrightnessModel for RelativeLuminance {
    fn score(&self, rgb: Rgb) -> f64 {
        relative_luminance(rgb)
    }

    fn contrast(&self, rgb: Rgb) -> Contrast {
        let foreground = if self.score(rgb) < self.threshold {
            Foreground::Light
        } else {
            Foreground::Dark
        };
        Contrast {
            foreground,
            soften: false,
        }
    }
}
