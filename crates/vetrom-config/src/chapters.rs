#![forbid(unsafe_code)]

//! Chapter mini-formats.
//!
//! | Generation | Carrier | Entry | Separator |
//! |---|---|---|---|
//! | v1 | `<meta name="vetrom-checkpoint" points=...>` | `time-label` | `,` |
//! | v2 | the video `id` | `label,HH:MM:SS` | `-` |
//!
//! Chapters keep source order. Nothing is sorted or deduplicated.

use crate::time::parse_time_token;

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterMark {
    pub offset_seconds: f64,
    pub label: String,
}

impl ChapterMark {
    #[must_use]
    pub fn new(offset_seconds: f64, label: impl Into<String>) -> Self {
        Self {
            offset_seconds,
            label: label.into(),
        }
    }
}

/// Parse a v1 `points` attribute.
///
/// The label is everything after the first dash, trimmed. An empty label
/// becomes `Chapter N`, where `N` is the entry's 1-based position among the
/// non-empty entries. Entries whose time does not parse are dropped.
#[must_use]
pub fn parse_checkpoints(points: &str) -> Vec<ChapterMark> {
    points
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .filter_map(|(index, entry)| {
            let (time, label) = entry.split_once('-').unwrap_or((entry, ""));
            let offset = parse_time_token(time)?;
            let label = match label.trim() {
                "" => format!("Chapter {}", index + 1),
                label => label.to_string(),
            };
            Some(ChapterMark::new(offset, label))
        })
        .collect()
}

/// Parse chapters embedded in a v2 video `id`.
///
/// Each dash-separated segment of the form `label,HH:MM:SS` (exactly two
/// digits per time field) is a chapter. Other segments are ignored, which
/// also means labels cannot contain dashes.
#[must_use]
pub fn parse_chapter_id(id: &str) -> Vec<ChapterMark> {
    id.split('-').filter_map(parse_id_segment).collect()
}

fn parse_id_segment(segment: &str) -> Option<ChapterMark> {
    // The time is anchored at the end; the label is the text before its comma.
    let (label, time) = segment.rsplit_once(',')?;
    if label.is_empty() || !is_fixed_clock(time) {
        return None;
    }
    let label = label.trim();
    Some(ChapterMark::new(parse_time_token(time)?, label))
}

/// `DD:DD:DD`.
fn is_fixed_clock(time: &str) -> bool {
    let bytes = time.as_bytes();
    bytes.len() == 8
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Horizontal position of a chapter marker in percent of the progress bar.
///
/// `None` until the media duration is known and positive.
#[must_use]
pub fn marker_percent(offset_seconds: f64, duration_seconds: f64) -> Option<f64> {
    (duration_seconds.is_finite() && duration_seconds > 0.0)
        .then(|| offset_seconds / duration_seconds * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // --- v1 checkpoints ---

    #[test]
    fn checkpoints_keep_source_order() {
        assert_eq!(
            parse_checkpoints("00:5-good part,00:10-better"),
            vec![ChapterMark::new(5.0, "good part"), ChapterMark::new(10.0, "better")]
        );
        assert_eq!(
            parse_checkpoints("00:10-later,00:5-earlier"),
            vec![ChapterMark::new(10.0, "later"), ChapterMark::new(5.0, "earlier")]
        );
    }

    #[test]
    fn missing_label_gets_a_number() {
        assert_eq!(
            parse_checkpoints("00:05, 00:30-"),
            vec![ChapterMark::new(5.0, "Chapter 1"), ChapterMark::new(30.0, "Chapter 2")]
        );
    }

    #[test]
    fn dropped_entries_still_count_for_numbering() {
        assert_eq!(
            parse_checkpoints("nope-intro,,01:00"),
            vec![ChapterMark::new(60.0, "Chapter 2")]
        );
    }

    #[test]
    fn label_keeps_inner_dashes() {
        assert_eq!(
            parse_checkpoints("1:00:00-part one - the end"),
            vec![ChapterMark::new(3600.0, "part one - the end")]
        );
    }

    #[test]
    fn empty_points() {
        assert!(parse_checkpoints("").is_empty());
        assert!(parse_checkpoints(" , ,").is_empty());
    }

    // --- v2 id chapters ---

    #[test]
    fn id_chapters() {
        assert_eq!(
            parse_chapter_id("intro,00:00:00-main act,00:01:30-credits,01:00:05"),
            vec![
                ChapterMark::new(0.0, "intro"),
                ChapterMark::new(90.0, "main act"),
                ChapterMark::new(3605.0, "credits"),
            ]
        );
    }

    #[test]
    fn id_segments_without_fixed_clock_are_ignored() {
        assert_eq!(
            parse_chapter_id("movie-intro,0:00:00-a,00:00-b,00:00:0x-ok,00:00:07"),
            vec![ChapterMark::new(7.0, "ok")]
        );
    }

    #[test]
    fn id_label_may_contain_commas() {
        assert_eq!(
            parse_chapter_id("a,b,00:00:02"),
            vec![ChapterMark::new(2.0, "a,b")]
        );
        assert!(parse_chapter_id(",00:00:02").is_empty());
    }

    // --- markers ---

    #[test]
    fn marker_placement() {
        assert_eq!(marker_percent(30.0, 120.0), Some(25.0));
        assert_eq!(marker_percent(30.0, 0.0), None);
        assert_eq!(marker_percent(30.0, f64::NAN), None);
    }
}
