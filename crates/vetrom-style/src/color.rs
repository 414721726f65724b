#![forbid(unsafe_code)]

use core::fmt;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Color returned for any token that cannot be interpreted.
pub const FALLBACK_RGB: Rgb = Rgb::BLACK;

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn as_key(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as `r, g, b`, the shape stored in `--*-rgb` custom properties.
    #[must_use]
    pub fn channels_css(self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Rgba {
        Rgba::new(self, alpha)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// RGB color with an opacity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgba {
    /// Alpha is clamped to `[0, 1]`; NaN becomes fully opaque.
    #[must_use]
    pub fn new(rgb: Rgb, alpha: f64) -> Self {
        let alpha = if alpha.is_nan() {
            1.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
        Self { rgb, alpha }
    }

    #[must_use]
    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}

/// Environment capability that maps a color name to a hex or `rgb()` token.
///
/// In a browser this is the computed-style round trip; natively it is
/// [`CssNamedColors`](crate::named::CssNamedColors).
pub trait NamedColorResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<T: NamedColorResolver + ?Sized> NamedColorResolver for &T {
    fn resolve(&self, name: &str) -> Option<String> {
        (**self).resolve(name)
    }
}

/// Surface form of a color token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `#RGB`, `#RRGGBB`, or the `_` spelling used inside ids.
    Hex,
    /// `rgb(...)` or `rgba(...)`.
    Rgb,
    /// Anything else; needs a [`NamedColorResolver`].
    Named,
}

impl TokenKind {
    #[must_use]
    pub fn of(token: &str) -> Self {
        let token = token.trim();
        if token.starts_with('#') || token.starts_with('_') {
            Self::Hex
        } else if token
            .get(..3)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("rgb"))
        {
            Self::Rgb
        } else {
            Self::Named
        }
    }
}

/// Parse any color token into RGB.
///
/// Named colors are resolved once through `names`; a resolution that is itself
/// a name (or anything else unparseable) yields [`FALLBACK_RGB`]. Never fails.
#[must_use]
pub fn parse_color<R: NamedColorResolver + ?Sized>(token: &str, names: &R) -> Rgb {
    let token = token.trim();
    match TokenKind::of(token) {
        TokenKind::Named => names
            .resolve(token)
            .and_then(|resolved| parse_literal(&resolved))
            .unwrap_or(FALLBACK_RGB),
        _ => parse_literal(token).unwrap_or(FALLBACK_RGB),
    }
}

/// Parse a hex or `rgb()` token; `None` for names and malformed input.
#[must_use]
pub fn parse_literal(token: &str) -> Option<Rgb> {
    let token = token.trim();
    match TokenKind::of(token) {
        TokenKind::Hex => parse_hex(token),
        TokenKind::Rgb => parse_rgb_function(token),
        TokenKind::Named => None,
    }
}

/// `#RGB` / `#RRGGBB` (or `_` instead of `#`).
#[must_use]
pub fn parse_hex(token: &str) -> Option<Rgb> {
    let digits = token
        .strip_prefix('#')
        .or_else(|| token.strip_prefix('_'))?;
    let bytes = digits.as_bytes();
    match bytes.len() {
        3 => Some(Rgb::new(
            nibble(bytes[0])? * 17,
            nibble(bytes[1])? * 17,
            nibble(bytes[2])? * 17,
        )),
        6 => Some(Rgb::new(
            nibble(bytes[0])? << 4 | nibble(bytes[1])?,
            nibble(bytes[2])? << 4 | nibble(bytes[3])?,
            nibble(bytes[4])? << 4 | nibble(bytes[5])?,
        )),
        _ => None,
    }
}

/// First three integer runs of an `rgb()`/`rgba()` token, clamped to 255.
///
/// Mirrors the computed-style reader: digits are grouped greedily, so a
/// fractional channel like `12.5` contributes `12` and then `5`.
#[must_use]
pub fn parse_rgb_function(token: &str) -> Option<Rgb> {
    let mut channels = token
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse::<u32>().map_or(255, |v| v.min(255)) as u8);
    Some(Rgb::new(channels.next()?, channels.next()?, channels.next()?))
}

/// Replace every `_` with `#`, turning an id-safe hex spelling into CSS.
#[must_use]
pub fn normalize_token(token: &str) -> String {
    token.replace('_', "#")
}

fn nibble(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}
