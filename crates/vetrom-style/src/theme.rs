#![forbid(unsafe_code)]

//! Theme resolution: configuration plus ambient context in, render-ready
//! style out.
//!
//! Every resolver here is total. Missing or unparseable color tokens fall back
//! to documented defaults, so a [`StyleDescriptor`] never carries a partial
//! state.
//!
//! # Ambient context
//!
//! Auto themes look at the nearest non-transparent ancestor background. The
//! DOM walk itself belongs to the host; [`effective_background`] and
//! [`resolve_direction`] implement the walk policy over whatever sequence of
//! computed values the host produces, so it can be tested without a browser.

use crate::color::{NamedColorResolver, Rgb, Rgba, normalize_token, parse_color};
use crate::contrast::{BrightnessModel, Foreground, Hsp, RelativeLuminance, SOFTEN_ALPHA};

/// Theme keyword shared by the gallery and v2 player grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeMode {
    Auto,
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "auto" => Some(Self::Auto),
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// Text direction of the surrounding document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// Parse a `dir` attribute or computed `direction` value.
    #[must_use]
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "ltr" => Some(Self::Ltr),
            "rtl" => Some(Self::Rtl),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// Ambient signals read from the element's surroundings.
pub trait Ambient {
    /// Nearest non-transparent background, already resolved by the host walk.
    fn effective_background(&self) -> String;

    fn direction(&self) -> Direction;
}

/// Plain-data [`Ambient`], captured once per element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientSnapshot {
    pub background: String,
    pub direction: Direction,
}

impl AmbientSnapshot {
    #[must_use]
    pub fn new(background: impl Into<String>, direction: Direction) -> Self {
        Self {
            background: background.into(),
            direction,
        }
    }
}

impl Ambient for AmbientSnapshot {
    fn effective_background(&self) -> String {
        self.background.clone()
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// Ancestors inspected before falling back to the document background.
pub const MAX_ANCESTOR_DEPTH: usize = 10;

/// Used when neither ancestors nor the document carry a background.
pub const DOCUMENT_FALLBACK_BACKGROUND: &str = "#ffffff";

/// Whether a computed background lets the parent show through.
#[must_use]
pub fn is_transparent(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("transparent") {
        return true;
    }
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    compact == "rgba(0,0,0,0)"
}

/// Walk policy for the ambient background.
///
/// `ancestors` yields computed backgrounds starting at the element itself;
/// at most `max_depth` of them are inspected. A transparent document
/// background counts as absent.
#[must_use]
pub fn effective_background<I, S>(
    ancestors: I,
    document_background: Option<&str>,
    max_depth: usize,
) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ancestors
        .into_iter()
        .take(max_depth)
        .find_map(|bg| {
            let bg = bg.as_ref();
            (!is_transparent(bg)).then(|| bg.trim().to_string())
        })
        .or_else(|| {
            document_background
                .filter(|bg| !is_transparent(bg))
                .map(|bg| bg.trim().to_string())
        })
        .unwrap_or_else(|| DOCUMENT_FALLBACK_BACKGROUND.to_string())
}

/// Walk policy for text direction: the first explicit `ltr`/`rtl` wins.
#[must_use]
pub fn resolve_direction<I, S>(ancestors: I) -> Direction
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    ancestors
        .into_iter()
        .flatten()
        .find_map(|value| Direction::from_attr(value.as_ref().trim()))
        .unwrap_or_default()
}

/// Final visual descriptor for one element state.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDescriptor {
    /// CSS background value.
    pub background: String,
    pub foreground: Foreground,
    /// Concrete text color for `foreground`.
    pub text: Rgb,
    /// Color for buttons, progress fill, and markers.
    pub accent: Rgba,
    /// The background was emitted at reduced opacity.
    pub softened: bool,
}

impl StyleDescriptor {
    /// `--vetrom-*` custom properties consumed by the gallery stylesheet.
    #[must_use]
    pub fn gallery_css_variables(&self) -> [(&'static str, String); 5] {
        [
            ("--vetrom-bg", self.background.clone()),
            ("--vetrom-text", self.text.to_hex()),
            ("--vetrom-text-rgb", self.text.channels_css()),
            ("--vetrom-accent", self.accent.to_css()),
            ("--vetrom-lightbox-icon-color", self.text.to_hex()),
        ]
    }
}

/// Alpha for an accent derived from the text color.
pub const DERIVED_ACCENT_ALPHA: f64 = 0.5;
/// Alpha for an accent given explicitly as a color token.
pub const EXPLICIT_ACCENT_ALPHA: f64 = 0.6;

/// High-contrast slate used on bright code backgrounds.
pub const CODE_TEXT_DARK: Rgb = Rgb::new(0x0f, 0x17, 0x2a);
/// Off-white used on dark code backgrounds.
pub const CODE_TEXT_LIGHT: Rgb = Rgb::new(0xf8, 0xfa, 0xfc);
pub const CODE_DEFAULT_BACKGROUND: &str = "#1e293b";
pub const CODE_DEFAULT_HOVER_BACKGROUND: &str = "#334155";

/// Code block style for one background token (HSP model).
///
/// The emitted background is the token itself with `_` turned into `#`,
/// unless the color sits in the glare zone, in which case it is re-emitted
/// as `rgba(..., 0.88)`.
#[must_use]
pub fn code_block_style<R: NamedColorResolver + ?Sized>(token: &str, names: &R) -> StyleDescriptor {
    let rgb = parse_color(&normalize_token(token), names);
    let contrast = Hsp::DEFAULT.contrast(rgb);
    let text = match contrast.foreground {
        Foreground::Dark => CODE_TEXT_DARK,
        Foreground::Light => CODE_TEXT_LIGHT,
    };
    let background = if contrast.soften {
        rgb.with_alpha(SOFTEN_ALPHA).to_css()
    } else {
        normalize_token(token.trim())
    };
    StyleDescriptor {
        background,
        foreground: contrast.foreground,
        text,
        accent: text.with_alpha(DERIVED_ACCENT_ALPHA),
        softened: contrast.soften,
    }
}

const GALLERY_DARK_BACKGROUND: &str = "#1a1a1a";
const GALLERY_LIGHT_BACKGROUND: &str = "#ffffff";

/// Gallery theme (relative luminance model).
///
/// Fixed `dark`/`light` themes never consult `ambient`.
#[must_use]
pub fn resolve_gallery_theme<A, R>(
    mode: ThemeMode,
    color: Option<&str>,
    ambient: &A,
    names: &R,
) -> StyleDescriptor
where
    A: Ambient + ?Sized,
    R: NamedColorResolver + ?Sized,
{
    let (background, foreground) = match mode {
        ThemeMode::Dark => (GALLERY_DARK_BACKGROUND.to_string(), Foreground::Light),
        ThemeMode::Light => (GALLERY_LIGHT_BACKGROUND.to_string(), Foreground::Dark),
        ThemeMode::Auto => {
            let background = ambient.effective_background();
            let rgb = parse_color(&background, names);
            let foreground = RelativeLuminance::DEFAULT.contrast(rgb).foreground;
            (background, foreground)
        }
    };
    let text = match foreground {
        Foreground::Dark => Rgb::BLACK,
        Foreground::Light => Rgb::WHITE,
    };
    let accent = match color.map(str::trim).filter(|c| !c.is_empty()) {
        Some(color) => parse_color(color, names).with_alpha(EXPLICIT_ACCENT_ALPHA),
        None => text.with_alpha(DERIVED_ACCENT_ALPHA),
    };
    StyleDescriptor {
        background,
        foreground,
        text,
        accent,
        softened: false,
    }
}

/// Three-slot palette of the v2 player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl PlayerPalette {
    /// Baby blue, white, and gold.
    #[must_use]
    pub fn brand_default() -> Self {
        Self {
            primary: "#87CEFA".to_string(),
            secondary: "#FFFFFF".to_string(),
            accent: "#FFD700".to_string(),
        }
    }

    #[must_use]
    pub fn css_variables(&self) -> [(&'static str, String); 3] {
        [
            ("--vetrom-primary", self.primary.clone()),
            ("--vetrom-secondary", self.secondary.clone()),
            ("--vetrom-accent", self.accent.clone()),
        ]
    }

    fn with_variant(mut self, foreground_on_page: Foreground) -> Self {
        match foreground_on_page {
            // Light text means a dark page: use the dark variant.
            Foreground::Light => {
                self.secondary = "#1a1a1a".to_string();
                self.accent = "#808080".to_string();
            }
            Foreground::Dark => {
                self.secondary = "#FFFFFF".to_string();
                self.accent = "#E0E0E0".to_string();
            }
        }
        self
    }
}

/// v2 player palette.
///
/// `None` keeps the brand default slots. A color token replaces the primary
/// slot verbatim. `auto` picks the dark or light variant from the ambient
/// background using the luminance model.
#[must_use]
pub fn resolve_player_palette<A, R>(
    theme: Option<ThemeMode>,
    color: Option<&str>,
    ambient: &A,
    names: &R,
) -> PlayerPalette
where
    A: Ambient + ?Sized,
    R: NamedColorResolver + ?Sized,
{
    let mut palette = PlayerPalette::brand_default();
    if let Some(color) = color.map(str::trim).filter(|c| !c.is_empty()) {
        palette.primary = color.to_string();
    }
    match theme {
        None => palette,
        Some(ThemeMode::Dark) => palette.with_variant(Foreground::Light),
        Some(ThemeMode::Light) => palette.with_variant(Foreground::Dark),
        Some(ThemeMode::Auto) => {
            let rgb = parse_color(&ambient.effective_background(), names);
            let foreground = RelativeLuminance::DEFAULT.contrast(rgb).foreground;
            palette.with_variant(foreground)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::named::CssNamedColors;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Counts how often the ambient background is read.
    struct Probe {
        background: &'static str,
        reads: Cell<u32>,
    }

    impl Probe {
        fn new(background: &'static str) -> Self {
            Self {
                background,
                reads: Cell::new(0),
            }
        }
    }

    impl Ambient for Probe {
        fn effective_background(&self) -> String {
            self.reads.set(self.reads.get() + 1);
            self.background.to_string()
        }

        fn direction(&self) -> Direction {
            Direction::Ltr
        }
    }

    // --- keywords ---

    #[test]
    fn theme_keywords_round_trip() {
        for mode in [ThemeMode::Auto, ThemeMode::Dark, ThemeMode::Light] {
            assert_eq!(ThemeMode::from_keyword(mode.as_str()), Some(mode));
        }
        assert_eq!(ThemeMode::from_keyword("Dark"), None);
    }

    // --- ambient walk ---

    #[test]
    fn transparent_values() {
        assert!(is_transparent("rgba(0, 0, 0, 0)"));
        assert!(is_transparent("transparent"));
        assert!(is_transparent(""));
        assert!(!is_transparent("rgba(0, 0, 0, 0.5)"));
        assert!(!is_transparent("rgb(0, 0, 0)"));
    }

    #[test]
    fn nearest_opaque_ancestor_wins() {
        let chain = ["rgba(0, 0, 0, 0)", "transparent", "rgb(10, 20, 30)", "rgb(1, 1, 1)"];
        assert_eq!(effective_background(chain, Some("rgb(9, 9, 9)"), 10), "rgb(10, 20, 30)");
    }

    #[test]
    fn walk_is_bounded() {
        let mut chain = vec!["transparent"; 10];
        chain.push("rgb(10, 20, 30)");
        assert_eq!(effective_background(chain, Some("rgb(9, 9, 9)"), 10), "rgb(9, 9, 9)");
    }

    #[test]
    fn transparent_document_falls_back_to_white() {
        let chain: [&str; 0] = [];
        assert_eq!(effective_background(chain, Some("rgba(0, 0, 0, 0)"), 10), "#ffffff");
        assert_eq!(effective_background(chain, None, 10), "#ffffff");
    }

    #[test]
    fn direction_walk() {
        assert_eq!(resolve_direction([None, Some("rtl"), Some("ltr")]), Direction::Rtl);
        assert_eq!(resolve_direction([Some("auto"), Some("ltr")]), Direction::Ltr);
        assert_eq!(resolve_direction::<_, &str>([None, None]), Direction::Ltr);
    }

    // --- code blocks ---

    #[test]
    fn dark_code_background_gets_light_text() {
        let style = code_block_style("_1e293b", &CssNamedColors);
        assert_eq!(style.background, "#1e293b");
        assert_eq!(style.text, CODE_TEXT_LIGHT);
        assert!(!style.softened);
    }

    #[test]
    fn white_code_background_is_softened() {
        let style = code_block_style("white", &CssNamedColors);
        assert_eq!(style.background, "rgba(255, 255, 255, 0.88)");
        assert_eq!(style.foreground, Foreground::Dark);
        assert_eq!(style.text, CODE_TEXT_DARK);
        assert!(style.softened);
    }

    #[test]
    fn unknown_code_color_keeps_token_with_light_text() {
        let style = code_block_style("slate", &CssNamedColors);
        assert_eq!(style.background, "slate");
        assert_eq!(style.foreground, Foreground::Light);
    }

    // --- gallery ---

    #[test]
    fn explicit_dark_never_reads_ambient() {
        let probe = Probe::new("#ffffff");
        let style = resolve_gallery_theme(ThemeMode::Dark, Some("red"), &probe, &CssNamedColors);
        assert_eq!(probe.reads.get(), 0);
        assert_eq!(style.background, "#1a1a1a");
        assert_eq!(style.text, Rgb::WHITE);
        assert_eq!(style.accent.to_css(), "rgba(255, 0, 0, 0.6)");
    }

    #[test]
    fn explicit_light_derives_accent_from_text() {
        let probe = Probe::new("#000000");
        let style = resolve_gallery_theme(ThemeMode::Light, None, &probe, &CssNamedColors);
        assert_eq!(probe.reads.get(), 0);
        assert_eq!(style.text, Rgb::BLACK);
        assert_eq!(style.accent.to_css(), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn auto_follows_ambient() {
        let dark_page = AmbientSnapshot::new("rgb(20, 20, 20)", Direction::Ltr);
        let style = resolve_gallery_theme(ThemeMode::Auto, None, &dark_page, &CssNamedColors);
        assert_eq!(style.background, "rgb(20, 20, 20)");
        assert_eq!(style.foreground, Foreground::Light);

        let light_page = AmbientSnapshot::new("#fafafa", Direction::Ltr);
        let style = resolve_gallery_theme(ThemeMode::Auto, None, &light_page, &CssNamedColors);
        assert_eq!(style.foreground, Foreground::Dark);
    }

    #[test]
    fn gallery_variables_cover_every_slot() {
        let page = AmbientSnapshot::new("#000", Direction::Ltr);
        let style = resolve_gallery_theme(ThemeMode::Auto, Some("rgb(255,87,51)"), &page, &CssNamedColors);
        let vars = style.gallery_css_variables();
        assert_eq!(vars[0], ("--vetrom-bg", "#000".to_string()));
        assert_eq!(vars[1], ("--vetrom-text", "#ffffff".to_string()));
        assert_eq!(vars[2], ("--vetrom-text-rgb", "255, 255, 255".to_string()));
        assert_eq!(vars[3], ("--vetrom-accent", "rgba(255, 87, 51, 0.6)".to_string()));
        assert_eq!(vars[4].0, "--vetrom-lightbox-icon-color");
    }

    // --- player palette ---

    #[test]
    fn player_default_palette() {
        let page = Probe::new("#000");
        let palette = resolve_player_palette(None, None, &page, &CssNamedColors);
        assert_eq!(palette, PlayerPalette::brand_default());
        assert_eq!(page.reads.get(), 0);
    }

    #[test]
    fn player_dark_red() {
        let page = Probe::new("#fff");
        let palette = resolve_player_palette(Some(ThemeMode::Dark), Some("red"), &page, &CssNamedColors);
        assert_eq!(palette.primary, "red");
        assert_eq!(palette.secondary, "#1a1a1a");
        assert_eq!(palette.accent, "#808080");
        assert_eq!(page.reads.get(), 0);
    }

    #[test]
    fn player_auto_reads_ambient() {
        let page = Probe::new("#ffffff");
        let palette = resolve_player_palette(Some(ThemeMode::Auto), None, &page, &CssNamedColors);
        assert_eq!(page.reads.get(), 1);
        assert_eq!(palette.primary, "#87CEFA");
        assert_eq!(palette.secondary, "#FFFFFF");
        assert_eq!(palette.accent, "#E0E0E0");
    }
}
