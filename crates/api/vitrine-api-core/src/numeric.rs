//! Lenient number parsing for attribute and input text.
//!
//! Both functions read the longest numeric prefix after leading whitespace,
//! the way browsers parse `parseInt` / `parseFloat`, and return `None` when
//! there is no such prefix. Callers decide the fallback.

/// Leading base-10 integer: `"45k"` -> 45, `" -3.9"` -> -3, `"abc"` -> None.
pub fn parse_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (neg, rest) = split_sign(s);
    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().ok()?;
    Some(if neg { -magnitude } else { magnitude })
}

/// Leading decimal number with optional fraction and exponent:
/// `"12.5%"` -> 12.5, `".5"` -> 0.5, `"1e3px"` -> 1000.0.
pub fn parse_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
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
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_prefixes() {
        assert_eq!(parse_int("1250000"), Some(1_250_000));
        assert_eq!(parse_int("  45k"), Some(45));
        assert_eq!(parse_int("-3.9"), Some(-3));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn float_prefixes() {
        assert_eq!(parse_float("12.5%"), Some(12.5));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("3."), Some(3.0));
        assert_eq!(parse_float("1e3px"), Some(1000.0));
        assert_eq!(parse_float("2e"), Some(2.0));
        assert_eq!(parse_float("-0.25"), Some(-0.25));
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("n/a"), None);
    }
}
