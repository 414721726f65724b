#![forbid(unsafe_code)]

//! Class and id grammars.
//!
//! Each grammar is a tokenizer (split on `-`) paired with a classifier. No
//! function here looks at the DOM; callers pass the raw `id` or class list.

use std::collections::BTreeSet;

use vetrom_style::color::TokenKind;
use vetrom_style::theme::ThemeMode;

// ---------------------------------------------------------------------------
// Grammar A: code blocks
// ---------------------------------------------------------------------------

/// Reserved Grammar A words. Never treated as colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CodeBlockKeyword {
    /// Permanent copy button.
    Copy,
    /// Copy button shown only while hovered.
    HoverCopy,
    /// Swap to the secondary background while hovered.
    Hover,
}

impl CodeBlockKeyword {
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "copy" => Some(Self::Copy),
            "hovercopy" => Some(Self::HoverCopy),
            "hover" => Some(Self::Hover),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::HoverCopy => "hovercopy",
            Self::Hover => "hover",
        }
    }
}

/// One classified Grammar A segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Keyword(CodeBlockKeyword),
    Color(&'a str),
    Ignored(&'a str),
}

/// Classify a single dash-delimited segment.
///
/// Color candidates are hex tokens (`#`/`_` prefixed), `rgb(`/`rgba(`
/// functions, and purely alphabetic words (names). Empty and mixed segments
/// such as `v2` are ignored.
#[must_use]
pub fn classify_segment(segment: &str) -> Segment<'_> {
    if let Some(keyword) = CodeBlockKeyword::from_segment(segment) {
        return Segment::Keyword(keyword);
    }
    let is_color = match TokenKind::of(segment) {
        TokenKind::Hex => segment.len() > 1,
        TokenKind::Rgb => {
            let lower = segment.to_ascii_lowercase();
            lower.starts_with("rgb(") || lower.starts_with("rgba(")
        }
        TokenKind::Named => {
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphabetic())
        }
    };
    if is_color {
        Segment::Color(segment)
    } else {
        Segment::Ignored(segment)
    }
}

/// How the copy button behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CopyMode {
    #[default]
    None,
    Always,
    OnHover,
}

/// Parsed Grammar A id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlockConfig {
    pub copy: CopyMode,
    /// Hover background swap requested.
    pub hover: bool,
    pub keywords: BTreeSet<CodeBlockKeyword>,
    /// Color tokens in encounter order.
    pub colors: Vec<String>,
}

impl CodeBlockConfig {
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    /// Second color; meaningful only when [`Self::hover`] is set.
    #[must_use]
    pub fn secondary(&self) -> Option<&str> {
        self.colors.get(1).map(String::as_str)
    }
}

/// Parse a code block `id`.
///
/// `hovercopy` wins over `copy` when both are present.
#[must_use]
pub fn parse_code_block_id(id: &str) -> CodeBlockConfig {
    let mut config = CodeBlockConfig::default();
    for segment in id.trim().split('-') {
        match classify_segment(segment) {
            Segment::Keyword(keyword) => {
                config.keywords.insert(keyword);
            }
            Segment::Color(color) => config.colors.push(color.to_string()),
            Segment::Ignored(_) => {}
        }
    }
    config.hover = config.keywords.contains(&CodeBlockKeyword::Hover);
    config.copy = if config.keywords.contains(&CodeBlockKeyword::HoverCopy) {
        CopyMode::OnHover
    } else if config.keywords.contains(&CodeBlockKeyword::Copy) {
        CopyMode::Always
    } else {
        CopyMode::None
    };
    config
}

// ---------------------------------------------------------------------------
// Grammar B: galleries
// ---------------------------------------------------------------------------

const GALLERY_PREFIX: &str = "vetrom-gallery-";

/// Parsed gallery class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    pub theme: ThemeMode,
    pub color: Option<String>,
}

/// Match one class against `vetrom-gallery-<theme>[-<color>]`.
///
/// The color is everything after the theme's dash and may itself contain
/// dashes. A trailing dash with nothing after it does not match.
#[must_use]
pub fn parse_gallery_class(class: &str) -> Option<GalleryConfig> {
    let rest = class.strip_prefix(GALLERY_PREFIX)?;
    let (theme, color) = match rest.split_once('-') {
        Some((theme, color)) if !color.is_empty() => (theme, Some(color.to_string())),
        Some(_) => return None,
        None => (rest, None),
    };
    Some(GalleryConfig {
        theme: ThemeMode::from_keyword(theme)?,
        color,
    })
}

/// First gallery class in a whitespace-separated class list.
#[must_use]
pub fn parse_gallery_classes(class_list: &str) -> Option<GalleryConfig> {
    class_list.split_whitespace().find_map(parse_gallery_class)
}

// ---------------------------------------------------------------------------
// Grammar B: v2 media players
// ---------------------------------------------------------------------------

/// Class that activates the first-generation player.
pub const PLAYER_V1_CLASS: &str = "vetrom-media-selected";

#[must_use]
pub fn is_player_v1_class(class_list: &str) -> bool {
    class_list.split_whitespace().any(|c| c == PLAYER_V1_CLASS)
}

/// Parsed v2 player class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaConfig {
    /// Digits as written, so `01` and `1` stay distinct.
    pub instance: Option<String>,
    pub secure: bool,
    pub theme: Option<ThemeMode>,
    pub color: Option<String>,
}

fn is_instance_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Parse one `vetrom-media-...` class.
///
/// Scans left to right after the namespace: digit runs set the instance
/// (last one before the theme wins), `secure` sets the flag, and the first
/// theme keyword sets the theme, captures the next segment as the color
/// unless it is `secure` or digits, and ends the scan. A color written
/// before the theme is not recognized.
#[must_use]
pub fn parse_media_class(class: &str) -> Option<MediaConfig> {
    let mut segments = class.split('-');
    if segments.next() != Some("vetrom") || segments.next() != Some("media") {
        return None;
    }
    let mut config = MediaConfig::default();
    let mut segments = segments.peekable();
    while let Some(segment) = segments.next() {
        if is_instance_segment(segment) {
            config.instance = Some(segment.to_string());
        } else if segment == "secure" {
            config.secure = true;
        } else if let Some(theme) = ThemeMode::from_keyword(segment) {
            config.theme = Some(theme);
            config.color = segments
                .peek()
                .filter(|next| !next.is_empty() && **next != "secure" && !is_instance_segment(next))
                .map(|next| (*next).to_string());
            break;
        }
    }
    Some(config)
}

/// First `vetrom-media` class in a class list, or defaults when none match.
#[must_use]
pub fn parse_media_classes(class_list: &str) -> MediaConfig {
    class_list
        .split_whitespace()
        .find_map(parse_media_class)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keywords(words: &[CodeBlockKeyword]) -> BTreeSet<CodeBlockKeyword> {
        words.iter().copied().collect()
    }

    // --- Grammar A ---

    #[test]
    fn copy_with_short_hex() {
        let config = parse_code_block_id("copy-_222");
        assert_eq!(config.keywords, keywords(&[CodeBlockKeyword::Copy]));
        assert_eq!(config.colors, vec!["_222".to_string()]);
        assert_eq!(config.copy, CopyMode::Always);
        assert!(!config.hover);
    }

    #[test]
    fn hovercopy_with_two_colors() {
        let config = parse_code_block_id("hovercopy-white-hover-_e2e8f0");
        assert_eq!(
            config.keywords,
            keywords(&[CodeBlockKeyword::HoverCopy, CodeBlockKeyword::Hover])
        );
        assert_eq!(config.primary(), Some("white"));
        assert_eq!(config.secondary(), Some("_e2e8f0"));
        assert_eq!(config.copy, CopyMode::OnHover);
        assert!(config.hover);
    }

    #[test]
    fn keyword_order_is_irrelevant() {
        let a = parse_code_block_id("_1e293b-hovercopy-hover-blue");
        let b = parse_code_block_id("hover-_1e293b-blue-hovercopy");
        assert_eq!(a, b);
    }

    #[test]
    fn hovercopy_wins_over_copy() {
        assert_eq!(parse_code_block_id("copy-hovercopy").copy, CopyMode::OnHover);
    }

    #[test]
    fn rgb_segments_are_colors() {
        let config = parse_code_block_id("rgb(0,0,0)-copy-rgba(255,255,255,0.5)");
        assert_eq!(
            config.colors,
            vec!["rgb(0,0,0)".to_string(), "rgba(255,255,255,0.5)".to_string()]
        );
    }

    #[test]
    fn junk_segments_are_ignored() {
        let config = parse_code_block_id("v2--block1-_-red");
        assert_eq!(config.colors, vec!["red".to_string()]);
        assert!(config.keywords.is_empty());
    }

    #[test]
    fn empty_id_is_unconfigured() {
        assert_eq!(parse_code_block_id(""), CodeBlockConfig::default());
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let config = parse_code_block_id("COPY");
        assert_eq!(config.copy, CopyMode::None);
        assert_eq!(config.colors, vec!["COPY".to_string()]);
    }

    // --- Grammar B: gallery ---

    #[test]
    fn gallery_dark_red() {
        assert_eq!(
            parse_gallery_class("vetrom-gallery-dark-red"),
            Some(GalleryConfig {
                theme: ThemeMode::Dark,
                color: Some("red".to_string()),
            })
        );
    }

    #[test]
    fn gallery_auto_without_color() {
        assert_eq!(
            parse_gallery_class("vetrom-gallery-auto"),
            Some(GalleryConfig {
                theme: ThemeMode::Auto,
                color: None,
            })
        );
    }

    #[test]
    fn gallery_color_may_contain_dashes() {
        let config = parse_gallery_class("vetrom-gallery-light-#ff5733-x");
        assert_eq!(config.and_then(|c| c.color).as_deref(), Some("#ff5733-x"));
    }

    #[test]
    fn gallery_rejects_near_misses() {
        assert_eq!(parse_gallery_class("vetrom-gallery-dim"), None);
        assert_eq!(parse_gallery_class("vetrom-gallery-dark-"), None);
        assert_eq!(parse_gallery_class("vetrom-gallery"), None);
        assert_eq!(parse_gallery_class("x-vetrom-gallery-dark"), None);
    }

    #[test]
    fn first_matching_gallery_class_wins() {
        let config = parse_gallery_classes("card vetrom-gallery-bogus vetrom-gallery-light-blue vetrom-gallery-dark");
        assert_eq!(
            config,
            Some(GalleryConfig {
                theme: ThemeMode::Light,
                color: Some("blue".to_string()),
            })
        );
    }

    // --- Grammar B: media ---

    #[test]
    fn media_full_class() {
        assert_eq!(
            parse_media_class("vetrom-media-2-secure-dark-red"),
            Some(MediaConfig {
                instance: Some("2".to_string()),
                secure: true,
                theme: Some(ThemeMode::Dark),
                color: Some("red".to_string()),
            })
        );
    }

    #[test]
    fn media_lookahead_skips_reserved_segments() {
        let config = parse_media_class("vetrom-media-light-secure").unwrap_or_default();
        assert_eq!(config.theme, Some(ThemeMode::Light));
        assert_eq!(config.color, None);
        // The scan stopped at the theme, so `secure` was never read.
        assert!(!config.secure);

        let config = parse_media_class("vetrom-media-auto-7").unwrap_or_default();
        assert_eq!(config.color, None);
        assert_eq!(config.instance, None);
    }

    #[test]
    fn media_color_before_theme_is_ignored() {
        let config = parse_media_class("vetrom-media-red-dark").unwrap_or_default();
        assert_eq!(config.theme, Some(ThemeMode::Dark));
        assert_eq!(config.color, None);
    }

    #[test]
    fn media_last_instance_before_theme_wins() {
        let config = parse_media_class("vetrom-media-1-03-dark").unwrap_or_default();
        assert_eq!(config.instance.as_deref(), Some("03"));
    }

    #[test]
    fn media_hex_color() {
        let config = parse_media_class("vetrom-media-dark-#ff5733").unwrap_or_default();
        assert_eq!(config.color.as_deref(), Some("#ff5733"));
    }

    #[test]
    fn media_without_theme() {
        let config = parse_media_classes("player vetrom-media-4");
        assert_eq!(config.instance.as_deref(), Some("4"));
        assert_eq!(config.theme, None);
        assert_eq!(parse_media_classes("plain video"), MediaConfig::default());
    }

    #[test]
    fn first_media_class_wins() {
        assert_eq!(
            parse_media_classes("vetrom-media-dark-red vetrom-media-light-blue"),
            MediaConfig {
                instance: None,
                secure: false,
                theme: Some(ThemeMode::Dark),
                color: Some("red".to_string()),
            }
        );
        let config = parse_media_classes("clip vetrom-media-secure vetrom-media-2-light");
        assert!(config.secure);
        assert_eq!(config.instance, None);
        assert_eq!(config.theme, None);
    }

    #[test]
    fn media_namespace_must_be_exact() {
        assert_eq!(parse_media_class("vetrom-mediax-dark"), None);
        assert_eq!(parse_media_class("vetrom-gallery-dark"), None);
        assert_eq!(parse_media_class("vetrom-media"), Some(MediaConfig::default()));
    }

    #[test]
    fn v1_activation_class() {
        assert!(is_player_v1_class("a vetrom-media-selected b"));
        assert!(!is_player_v1_class("vetrom-media-selected-dark"));
    }
}
