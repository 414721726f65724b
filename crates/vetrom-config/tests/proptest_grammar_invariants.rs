//! Property-based invariant tests for the configuration grammars.
//!
//! 1. Grammar A keeps color candidates in encounter order, regardless of
//!    where keywords are interleaved.
//! 2. Grammar A never reports a reserved keyword as a color.
//! 3. Gallery classes built from a theme and a color parse back to them.
//! 4. Media classes: only the segment right after the theme can be a color.
//! 5. Formatted clock strings parse back to the whole-second value.
//! 6. Parsers are total over arbitrary input.

use proptest::prelude::*;
use vetrom_config::{
    CodeBlockKeyword, format_time, parse_checkpoints, parse_chapter_id, parse_code_block_id,
    parse_gallery_class, parse_media_class, parse_time_token,
};
use vetrom_style::ThemeMode;

// ── Strategies ────────────────────────────────────────────────────────────

fn color_token() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{3,10}"
            .prop_filter("reserved", |s| CodeBlockKeyword::from_segment(s).is_none()),
        "_[0-9a-f]{6}",
        "_[0-9a-f]{3}",
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| format!("rgb({r},{g},{b})")),
    ]
}

fn keyword() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["copy", "hovercopy", "hover"])
}

fn theme() -> impl Strategy<Value = ThemeMode> {
    prop::sample::select(vec![ThemeMode::Auto, ThemeMode::Dark, ThemeMode::Light])
}

// 1. Encounter order

proptest! {
    #[test]
    fn colors_keep_encounter_order(
        colors in proptest::collection::vec(color_token(), 0..4),
        words in proptest::collection::vec(keyword(), 0..4),
        seed in any::<u64>(),
    ) {
        let mut segments: Vec<String> = colors.clone();
        for (i, word) in words.iter().enumerate() {
            let at = ((seed >> (i * 8)) as usize) % (segments.len() + 1);
            segments.insert(at, (*word).to_string());
        }
        let config = parse_code_block_id(&segments.join("-"));
        prop_assert_eq!(config.colors, colors);
        prop_assert_eq!(config.keywords.len(), {
            let mut unique = words.clone();
            unique.sort_unstable();
            unique.dedup();
            unique.len()
        });
    }
}

// 2. Keywords are reserved

proptest! {
    #[test]
    fn keywords_never_become_colors(id in "[a-z_0-9(),-]{0,40}") {
        let config = parse_code_block_id(&id);
        for color in &config.colors {
            prop_assert!(CodeBlockKeyword::from_segment(color).is_none());
        }
    }
}

// 3. Gallery classes

proptest! {
    #[test]
    fn gallery_class_round_trips(mode in theme(), color in proptest::option::of("[a-z#0-9-]{1,12}")) {
        let class = match &color {
            Some(color) => format!("vetrom-gallery-{}-{color}", mode.as_str()),
            None => format!("vetrom-gallery-{}", mode.as_str()),
        };
        let parsed = parse_gallery_class(&class);
        prop_assert!(parsed.is_some(), "{class} should match");
        if let Some(parsed) = parsed {
            prop_assert_eq!(parsed.theme, mode);
            prop_assert_eq!(parsed.color, color);
        }
    }
}

// 4. Media lookahead

proptest! {
    #[test]
    fn media_color_is_segment_after_theme(
        mode in theme(),
        instance in proptest::option::of(1u32..100),
        color in "[a-z]{3,8}".prop_filter("reserved", |s| {
            s != "secure" && ThemeMode::from_keyword(s).is_none()
        }),
        tail in proptest::collection::vec("[a-z0-9]{1,6}", 0..3),
    ) {
        let mut class = String::from("vetrom-media");
        if let Some(n) = instance {
            class.push_str(&format!("-{n}"));
        }
        class.push_str(&format!("-{}-{color}", mode.as_str()));
        for segment in &tail {
            class.push('-');
            class.push_str(segment);
        }
        let parsed = parse_media_class(&class).unwrap_or_default();
        prop_assert_eq!(parsed.theme, Some(mode));
        prop_assert_eq!(parsed.color, Some(color));
        prop_assert_eq!(parsed.instance, instance.map(|n| n.to_string()));
    }
}

// 5. Clock strings

proptest! {
    #[test]
    fn formatted_time_parses_back(seconds in 0u32..360_000) {
        let text = format_time(f64::from(seconds));
        prop_assert_eq!(parse_time_token(&text), Some(f64::from(seconds)));
    }
}

// 6. Totality

proptest! {
    #[test]
    fn parsers_never_panic(input in ".{0,48}") {
        let _ = parse_code_block_id(&input);
        let _ = parse_gallery_class(&input);
        let _ = parse_media_class(&input);
        let _ = parse_time_token(&input);
        let _ = parse_checkpoints(&input);
        let _ = parse_chapter_id(&input);
    }
}
