//! Number formatting for display.

/// Marker rendered for missing or non-finite values.
pub const MISSING: &str = "-";

/// Formats a number with `precision` decimals, grouping thousands with `,`
/// and using `,` as decimal separator: `1234.5` at 2 decimals is `1,234,50`.
/// Non-finite numbers render as [`MISSING`].
pub fn format_fixed(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return MISSING.to_owned();
    }
    let fixed = format!("{:.*}", precision, value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(fixed.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push(',');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_and_decimal_comma() {
        assert_eq!(format_fixed(1234.5, 2), "1,234,50");
        assert_eq!(format_fixed(1234567.891, 2), "1,234,567,89");
        assert_eq!(format_fixed(999.999, 2), "1,000,00");
        assert_eq!(format_fixed(12.0, 0), "12");
        assert_eq!(format_fixed(1234.0, 0), "1,234");
        assert_eq!(format_fixed(0.5, 3), "0,500");
    }

    #[test]
    fn negative_numbers() {
        assert_eq!(format_fixed(-1234.5, 1), "-1,234,5");
        assert_eq!(format_fixed(-12.0, 2), "-12,00");
    }

    #[test]
    fn non_finite_is_missing() {
        assert_eq!(format_fixed(f64::NAN, 2), "-");
        assert_eq!(format_fixed(f64::INFINITY, 2), "-");
    }
}
