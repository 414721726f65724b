//! Property-based invariant tests for color parsing and contrast selection.
//!
//! 1. Short hex expands to the doubled-digit long form.
//! 2. `_` and `#` spellings parse identically.
//! 3. `rgb()`/`rgba()` ignore alpha and return channels unchanged.
//! 4. Arbitrary tokens never panic and always yield a color.
//! 5. Brighter grays never flip foreground from dark to light.
//! 6. Soften implies dark foreground (glare zone sits above text threshold).
//! 7. Fixed gallery themes are independent of the ambient background.

use proptest::prelude::*;
use vetrom_style::theme::AmbientSnapshot;
use vetrom_style::{
    BrightnessModel, CssNamedColors, Direction, Foreground, Hsp, RelativeLuminance, Rgb,
    ThemeMode, parse_color, resolve_gallery_theme,
};

// ── Strategies ────────────────────────────────────────────────────────────

fn hex_digit() -> impl Strategy<Value = char> {
    prop::sample::select("0123456789abcdefABCDEF".chars().collect::<Vec<_>>())
}

fn rgb_strategy() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

// 1. Short hex expansion

proptest! {
    #[test]
    fn short_hex_matches_long_form(r in hex_digit(), g in hex_digit(), b in hex_digit()) {
        let short = format!("#{r}{g}{b}");
        let long = format!("#{r}{r}{g}{g}{b}{b}");
        prop_assert_eq!(
            parse_color(&short, &CssNamedColors),
            parse_color(&long, &CssNamedColors)
        );
    }
}

// 2. Underscore spelling

proptest! {
    #[test]
    fn underscore_and_hash_agree(rgb in rgb_strategy()) {
        let hex = rgb.to_hex();
        let underscored = hex.replacen('#', "_", 1);
        prop_assert_eq!(parse_color(&hex, &CssNamedColors), rgb);
        prop_assert_eq!(parse_color(&underscored, &CssNamedColors), rgb);
    }
}

// 3. rgb()/rgba() channels

proptest! {
    #[test]
    fn rgb_function_returns_channels(rgb in rgb_strategy(), alpha in 0.0f64..=1.0) {
        let plain = format!("rgb({},{},{})", rgb.r, rgb.g, rgb.b);
        let spaced = format!("rgba({}, {}, {}, {alpha})", rgb.r, rgb.g, rgb.b);
        prop_assert_eq!(parse_color(&plain, &CssNamedColors), rgb);
        prop_assert_eq!(parse_color(&spaced, &CssNamedColors), rgb);
    }
}

// 4. Totality

proptest! {
    #[test]
    fn arbitrary_tokens_never_panic(token in ".{0,24}") {
        let _ = parse_color(&token, &CssNamedColors);
    }
}

// 5. Monotone grays

proptest! {
    #[test]
    fn brighter_gray_never_gets_lighter_text(a in any::<u8>(), b in any::<u8>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for model in [&Hsp::DEFAULT as &dyn BrightnessModel, &RelativeLuminance::DEFAULT] {
            let dark = model.contrast(Rgb::new(lo, lo, lo)).foreground;
            let bright = model.contrast(Rgb::new(hi, hi, hi)).foreground;
            prop_assert!(
                !(dark == Foreground::Dark && bright == Foreground::Light),
                "gray {lo} chose dark text but brighter gray {hi} chose light"
            );
        }
    }
}

// 6. Soften implies dark text

proptest! {
    #[test]
    fn soften_only_with_dark_text(rgb in rgb_strategy()) {
        let c = Hsp::DEFAULT.contrast(rgb);
        if c.soften {
            prop_assert_eq!(c.foreground, Foreground::Dark);
        }
        prop_assert!(!RelativeLuminance::DEFAULT.contrast(rgb).soften);
    }
}

// 7. Fixed themes ignore ambient

proptest! {
    #[test]
    fn fixed_themes_ignore_ambient(a in rgb_strategy(), b in rgb_strategy(), dark in any::<bool>()) {
        let mode = if dark { ThemeMode::Dark } else { ThemeMode::Light };
        let first = AmbientSnapshot::new(a.to_hex(), Direction::Ltr);
        let second = AmbientSnapshot::new(b.to_hex(), Direction::Rtl);
        prop_assert_eq!(
            resolve_gallery_theme(mode, Some("red"), &first, &CssNamedColors),
            resolve_gallery_theme(mode, Some("red"), &second, &CssNamedColors)
        );
    }
}
