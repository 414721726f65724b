#![forbid(unsafe_code)]

//! Media classification at the DOM boundary.
//!
//! Hosts classify each discovered element once; everything past this point
//! works on [`MediaItem`] and never re-inspects tag names.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaItem {
    Image { src: String, alt: String },
    Video { src: String },
}

impl MediaItem {
    /// Classify an element by tag name.
    ///
    /// For videos, `source_src` is the first `<source>` child's URL, which
    /// wins over the element's own `src`. Unknown tags yield `None`.
    #[must_use]
    pub fn classify(tag: &str, src: &str, alt: Option<&str>, source_src: Option<&str>) -> Option<Self> {
        if tag.eq_ignore_ascii_case("img") {
            Some(Self::Image {
                src: src.to_string(),
                alt: alt.unwrap_or_default().to_string(),
            })
        } else if tag.eq_ignore_ascii_case("video") {
            let src = source_src.filter(|s| !s.is_empty()).unwrap_or(src);
            Some(Self::Video {
                src: src.to_string(),
            })
        } else {
            None
        }
    }

    #[must_use]
    pub fn src(&self) -> &str {
        match self {
            Self::Image { src, .. } | Self::Video { src } => src,
        }
    }

    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self, Self::Video { .. })
    }

    /// Alt text for the lightbox image, with a generic default.
    #[must_use]
    pub fn lightbox_alt(&self) -> &str {
        match self {
            Self::Image { alt, .. } if !alt.is_empty() => alt,
            _ => "Gallery image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_image() {
        let item = MediaItem::classify("IMG", "a.jpg", Some("cat"), None);
        assert_eq!(
            item,
            Some(MediaItem::Image {
                src: "a.jpg".into(),
                alt: "cat".into()
            })
        );
    }

    #[test]
    fn video_prefers_source_child() {
        let item = MediaItem::classify("video", "own.mp4", None, Some("child.mp4"));
        assert_eq!(item.as_ref().map(MediaItem::src), Some("child.mp4"));
        let item = MediaItem::classify("video", "own.mp4", None, Some(""));
        assert_eq!(item.as_ref().map(MediaItem::src), Some("own.mp4"));
    }

    #[test]
    fn other_tags_are_not_media() {
        assert_eq!(MediaItem::classify("div", "x", None, None), None);
    }

    #[test]
    fn alt_default() {
        let item = MediaItem::Image {
            src: "a".into(),
            alt: String::new(),
        };
        assert_eq!(item.lightbox_alt(), "Gallery image");
        assert!(!item.is_video());
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_string(&MediaItem::Video { src: "v.mp4".into() }).unwrap();
        assert_eq!(json, r#"{"type":"video","src":"v.mp4"}"#);
    }
}
