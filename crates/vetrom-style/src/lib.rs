#![forbid(unsafe_code)]

//! Color and theme primitives shared by every Vetrom widget.
//!
//! This crate provides:
//! - [`Rgb`] / [`Rgba`] and [`parse_color`] for hex, `rgb()`/`rgba()` and named tokens
//! - [`BrightnessModel`] with the [`Hsp`] and [`RelativeLuminance`] formulas
//! - Theme resolution for code blocks, galleries, and the v2 player palette
//!
//! Nothing here touches the DOM. Environment lookups (named colors, ancestor
//! backgrounds, text direction) arrive through the [`NamedColorResolver`] and
//! [`Ambient`] traits.

/// Color tokens and RGB normalization.
pub mod color;
/// Brightness formulas and foreground selection.
pub mod contrast;
/// CSS named color table.
pub mod named;
/// Theme resolution and ambient helpers.
pub mod theme;

pub use color::{FALLBACK_RGB, NamedColorResolver, Rgb, Rgba, TokenKind, parse_color};
pub use contrast::{BrightnessModel, Contrast, Foreground, Hsp, RelativeLuminance};
pub use named::CssNamedColors;
pub use theme::{
    Ambient, AmbientSnapshot, Direction, PlayerPalette, StyleDescriptor, ThemeMode,
    code_block_style, resolve_gallery_theme, resolve_player_palette,
};
