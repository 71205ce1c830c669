//! Permissive parsers for CSV field values.
//!
//! Every parser takes an already trimmed, non-empty value and returns `None`
//! when the value does not parse under the target type. Callers turn `None`
//! into a null cell.

use chrono::NaiveDate;

use bronze_model::types::MAX_DECIMAL_PRECISION;

pub fn parse_long(value: &str) -> Option<i64> {
    value.parse().ok()
}

pub fn parse_integer(value: &str) -> Option<i32> {
    value.parse().ok()
}

/// Parses a double, accepting `NaN`, `Inf` and `-Inf` spellings.
pub fn parse_double(value: &str) -> Option<f64> {
    match value {
        "NaN" => Some(f64::NAN),
        "Inf" | "+Inf" | "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Inf" | "-Infinity" => Some(f64::NEG_INFINITY),
        _ => value.parse().ok(),
    }
}

/// Case-insensitive `true` / `false`.
pub fn parse_boolean(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses `yyyy-MM-dd` into days since the Unix epoch.
pub fn parse_date(value: &str) -> Option<i32> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let days = date.signed_duration_since(unix_epoch()).num_days();
    i32::try_from(days).ok()
}

pub(crate) fn unix_epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Parses a decimal into its unscaled value at `scale`.
///
/// Accepts plain (`-12.5`) and exponent (`1.25E1`) notation. Extra fraction
/// digits are rounded half-up (away from zero). Returns `None` when the
/// rounded value needs more than `precision` digits.
pub fn parse_decimal(value: &str, precision: u8, scale: u8) -> Option<i128> {
    let precision = precision.min(MAX_DECIMAL_PRECISION);
    let (negative, body) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], body[idx + 1..].parse::<i64>().ok()?),
        None => (body, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part
        .bytes()
        .chain(frac_part.bytes())
        .all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let all_digits = format!("{int_part}{frac_part}");
    let digits = all_digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }

    // value == digits * 10^shift / 10^scale
    let frac_len = i64::try_from(frac_part.len()).ok()?;
    let shift = exponent
        .checked_sub(frac_len)?
        .checked_add(i64::from(scale))?;
    let len = i64::try_from(digits.len()).ok()?;

    let unscaled = if shift >= 0 {
        if len + shift > i64::from(precision) {
            return None;
        }
        let base: i128 = digits.parse().ok()?;
        base * 10_i128.pow(u32::try_from(shift).ok()?)
    } else {
        let drop = usize::try_from(-shift).ok()?;
        let (kept, first_dropped) = if drop <= digits.len() {
            let split = digits.len() - drop;
            (&digits[..split], digits.as_bytes()[split])
        } else {
            ("", b'0')
        };
        if kept.len() > usize::from(precision) {
            return None;
        }
        let base: i128 = if kept.is_empty() { 0 } else { kept.parse().ok()? };
        if first_dropped >= b'5' { base + 1 } else { base }
    };

    if unscaled >= 10_i128.pow(u32::from(precision)) {
        return None;
    }
    Some(if negative { -unscaled } else { unscaled })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long() {
        assert_eq!(parse_long("42"), Some(42));
        assert_eq!(parse_long("-7"), Some(-7));
        assert_eq!(parse_long("+3"), Some(3));
        assert_eq!(parse_long("1.5"), None);
        assert_eq!(parse_long("abc"), None);
        assert_eq!(parse_long("99999999999999999999"), None);
    }

    #[test]
    fn test_parse_integer_range() {
        assert_eq!(parse_integer("2147483647"), Some(i32::MAX));
        assert_eq!(parse_integer("2147483648"), None);
    }

    #[test]
    fn test_parse_double() {
        assert_eq!(parse_double("1.5"), Some(1.5));
        assert_eq!(parse_double("1e3"), Some(1000.0));
        assert_eq!(parse_double("-Inf"), Some(f64::NEG_INFINITY));
        assert!(parse_double("NaN").is_some_and(f64::is_nan));
        assert_eq!(parse_double("x1"), None);
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean("TRUE"), Some(true));
        assert_eq!(parse_boolean("False"), Some(false));
        assert_eq!(parse_boolean("yes"), None);
        assert_eq!(parse_boolean("1"), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("1970-01-01"), Some(0));
        assert_eq!(parse_date("1970-01-02"), Some(1));
        assert_eq!(parse_date("1969-12-31"), Some(-1));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("01/02/2024"), None);
    }

    #[test]
    fn test_parse_decimal_plain() {
        assert_eq!(parse_decimal("1.5", 15, 8), Some(150_000_000));
        assert_eq!(parse_decimal("-17.52", 15, 8), Some(-1_752_000_000));
        assert_eq!(parse_decimal(".25", 5, 2), Some(25));
        assert_eq!(parse_decimal("3.", 5, 2), Some(300));
        assert_eq!(parse_decimal("0", 5, 2), Some(0));
        assert_eq!(parse_decimal("-0.00", 5, 2), Some(0));
    }

    #[test]
    fn test_parse_decimal_exponent() {
        assert_eq!(parse_decimal("1.25E1", 5, 2), Some(1250));
        assert_eq!(parse_decimal("125e-2", 5, 2), Some(125));
        assert_eq!(parse_decimal("1E+2", 5, 0), Some(100));
    }

    #[test]
    fn test_parse_decimal_rounds_half_up() {
        assert_eq!(parse_decimal("1.005", 5, 2), Some(101));
        assert_eq!(parse_decimal("1.004", 5, 2), Some(100));
        assert_eq!(parse_decimal("-1.005", 5, 2), Some(-101));
        assert_eq!(parse_decimal("0.005", 5, 2), Some(1));
        assert_eq!(parse_decimal("0.0004", 5, 2), Some(0));
    }

    #[test]
    fn test_parse_decimal_overflow_is_none() {
        assert_eq!(parse_decimal("1234567.0", 8, 2), None);
        assert_eq!(parse_decimal("999.995", 5, 2), None);
        assert_eq!(parse_decimal("999.99", 5, 2), Some(99_999));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert_eq!(parse_decimal("", 5, 2), None);
        assert_eq!(parse_decimal("-", 5, 2), None);
        assert_eq!(parse_decimal(".", 5, 2), None);
        assert_eq!(parse_decimal("1,5", 5, 2), None);
        assert_eq!(parse_decimal("1.2.3", 5, 2), None);
        assert_eq!(parse_decimal("1e", 5, 2), None);
        assert_eq!(parse_decimal("abc", 5, 2), None);
    }
}
