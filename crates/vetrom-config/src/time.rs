#![forbid(unsafe_code)]

//! Time tokens (`H:MM:SS`, `MM:SS`, bare seconds) and clock formatting.

/// Parse a chapter time token into seconds.
///
/// - Three parts: `H:MM:SS`. Two parts: `MM:SS`. Each part contributes its
///   leading integer, or 0 when it has none (`"00:5x"` reads as 5 seconds).
/// - One part: its leading decimal number (`"12.5s"` is 12.5).
///
/// Empty tokens, tokens with more than three parts, tokens without any
/// number, and negative results yield `None`.
#[must_use]
pub fn parse_time_token(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let parts: Vec<&str> = token.split(':').map(str::trim).collect();
    let seconds = match parts.as_slice() {
        [h, m, s] => {
            (int_prefix(h).unwrap_or(0) * 3600 + int_prefix(m).unwrap_or(0) * 60
                + int_prefix(s).unwrap_or(0)) as f64
        }
        [m, s] => (int_prefix(m).unwrap_or(0) * 60 + int_prefix(s).unwrap_or(0)) as f64,
        [single] => float_prefix(single)?,
        _ => return None,
    };
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

/// `mm:ss`, or `h:mm:ss` once an hour is reached.
///
/// Non-finite and negative inputs render as `00:00`.
#[must_use]
pub fn format_time(total_seconds: f64) -> String {
    if !total_seconds.is_finite() || total_seconds < 0.0 {
        return "00:00".to_string();
    }
    let whole = total_seconds.floor() as u64;
    let s = whole % 60;
    let m = (whole / 60) % 60;
    let h = whole / 3600;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Leading signed integer of `s`, ignoring anything after it.
fn int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurd inputs instead of overflowing.
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX / 4_000);
    Some(sign * value.min(i64::MAX / 4_000))
}

/// Leading decimal number of `s` (`12`, `-3.5`, `.5`, `1e3`).
fn float_prefix(s: &str) -> Option<f64> {
    let bytes = s.trim_start().as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    core::str::from_utf8(&bytes[..end]).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- parse_time_token ---

    #[test]
    fn minutes_seconds() {
        assert_eq!(parse_time_token("00:5"), Some(5.0));
        assert_eq!(parse_time_token("01:30"), Some(90.0));
    }

    #[test]
    fn hours_minutes_seconds() {
        assert_eq!(parse_time_token("01:02:03"), Some(3723.0));
        assert_eq!(parse_time_token("00:01:05"), Some(65.0));
    }

    #[test]
    fn missing_parts_count_as_zero() {
        assert_eq!(parse_time_token("x:10"), Some(10.0));
        assert_eq!(parse_time_token(":"), Some(0.0));
        assert_eq!(parse_time_token("1::"), Some(3600.0));
    }

    #[test]
    fn integer_prefix_semantics() {
        assert_eq!(parse_time_token("00:5s"), Some(5.0));
        assert_eq!(parse_time_token("00:7.9"), Some(7.0));
    }

    #[test]
    fn bare_seconds() {
        assert_eq!(parse_time_token("42"), Some(42.0));
        assert_eq!(parse_time_token("12.5"), Some(12.5));
        assert_eq!(parse_time_token("  8s "), Some(8.0));
        assert_eq!(parse_time_token(".5"), Some(0.5));
        assert_eq!(parse_time_token("1e2"), Some(100.0));
    }

    #[test]
    fn invalid_tokens() {
        assert_eq!(parse_time_token(""), None);
        assert_eq!(parse_time_token("   "), None);
        assert_eq!(parse_time_token("abc"), None);
        assert_eq!(parse_time_token("."), None);
        assert_eq!(parse_time_token("1:2:3:4"), None);
    }

    #[test]
    fn negative_results_are_rejected() {
        assert_eq!(parse_time_token("-5"), None);
        assert_eq!(parse_time_token("00:-5"), None);
        assert_eq!(parse_time_token("01:-5"), Some(55.0));
    }

    #[test]
    fn huge_parts_do_not_overflow() {
        let parsed = parse_time_token("99999999999999999999:0:0");
        assert!(parsed.is_some_and(f64::is_finite));
    }

    // --- format_time ---

    #[test]
    fn format_under_an_hour() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(5.9), "00:05");
        assert_eq!(format_time(754.0), "12:34");
    }

    #[test]
    fn format_with_hours() {
        assert_eq!(format_time(3600.0), "1:00:00");
        assert_eq!(format_time(3723.0), "1:02:03");
        assert_eq!(format_time(36_000.0), "10:00:00");
    }

    #[test]
    fn format_degenerate_inputs() {
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
        assert_eq!(format_time(-1.0), "00:00");
    }
}
