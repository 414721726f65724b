#![forbid(unsafe_code)]

//! Which elements become widgets, decided from tag and attribute strings.
//!
//! Kept free of `web-sys` types so the rules run in native tests.

use vetrom_config::{is_player_v1_class, parse_gallery_classes};

/// Set on every element once it has been turned into a widget.
pub const APPLIED_ATTR: &str = "data-vetrom-applied";
pub const CODE_BLOCK_CLASS: &str = "vetrom-codeblock";
/// Wrapper that replaces a gallery root.
pub const GALLERY_CONTAINER_CLASS: &str = "vetrom-gallery-container";
/// Wrapper inserted around a player's video.
pub const PLAYER_CONTAINER_CLASS: &str = "vetrom-player-container";

/// Full-page overlay holding the open lightbox.
pub const LIGHTBOX_OVERLAY_CLASS: &str = "vetrom-lightbox-overlay";

/// Chrome the widgets build and keep re-rendering. Nodes added inside it are
/// never candidates, so those mutations do not trigger a rescan.
pub const BUILT_CHROME_SELECTOR: &str =
    ".vetrom-gallery-container, .vetrom-player-container, .vetrom-lightbox-overlay";

/// Candidates for a full-document scan, narrowed further by [`classify`].
pub const SCAN_SELECTOR: &str = "div, video";

/// v1 chapter metadata lives in `<head>`, addressed by video `id`.
pub const CHECKPOINT_META_NAME: &str = "vetrom-checkpoint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    CodeBlock,
    Gallery,
    PlayerV1,
    PlayerV2,
}

/// Classify an element by tag name and `class` attribute.
///
/// A video carrying the v1 activation class belongs to v1 even though the
/// class also matches the v2 namespace.
#[must_use]
pub fn classify(tag: &str, class_list: &str) -> Option<WidgetKind> {
    let has_class = |name: &str| class_list.split_whitespace().any(|c| c == name);
    if tag.eq_ignore_ascii_case("video") {
        if is_player_v1_class(class_list) {
            Some(WidgetKind::PlayerV1)
        } else if class_list.contains("vetrom-media") {
            Some(WidgetKind::PlayerV2)
        } else {
            None
        }
    } else if tag.eq_ignore_ascii_case("div") {
        if has_class(CODE_BLOCK_CLASS) {
            Some(WidgetKind::CodeBlock)
        } else if !has_class(GALLERY_CONTAINER_CLASS) && parse_gallery_classes(class_list).is_some() {
            Some(WidgetKind::Gallery)
        } else {
            None
        }
    } else {
        None
    }
}

/// `(index, count)` of each source among identical sources, in order.
#[must_use]
pub fn same_source_slots<S: AsRef<str>>(sources: &[S]) -> Vec<(usize, usize)> {
    sources
        .iter()
        .enumerate()
        .map(|(i, src)| {
            let src = src.as_ref();
            let index = sources[..i].iter().filter(|s| s.as_ref() == src).count();
            let count = sources.iter().filter(|s| s.as_ref() == src).count();
            (index, count)
        })
        .collect()
}

/// Quote a value for a CSS attribute selector.
#[must_use]
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Selector for the checkpoint `<meta>` of the video with `id`.
#[must_use]
pub fn checkpoint_selector(id: &str) -> String {
    format!(
        "meta[name={}][target={}]",
        css_string(CHECKPOINT_META_NAME),
        css_string(id)
    )
}
