//! Currency display.
//!
//! Amounts are shown in the Colombian-Spanish layout used for Real
//! amounts on the dashboard: `BRL 1.234.567,89`.

/// Format `value` with a currency code prefix, `.` as thousands separator
/// and `,` before two fraction digits.
pub fn format_currency(value: f64, code: &str) -> String {
    if !value.is_finite() {
        return format!("{} -", code);
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    let units = group_thousands(cents / 100);

    format!("{}{} {},{:02}", sign, code, units, cents % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, "BRL"), "BRL 0,00");
        assert_eq!(format_currency(18.12, "BRL"), "BRL 18,12");
        assert_eq!(format_currency(1376.45, "BRL"), "BRL 1.376,45");
        assert_eq!(format_currency(15_843_553.24, "BRL"), "BRL 15.843.553,24");
        assert_eq!(format_currency(999.999, "BRL"), "BRL 1.000,00");
    }

    #[test]
    fn test_format_currency_negative_and_nan() {
        assert_eq!(format_currency(-42.5, "BRL"), "-BRL 42,50");
        assert_eq!(format_currency(-0.001, "BRL"), "BRL 0,00");
        assert_eq!(format_currency(f64::NAN, "BRL"), "BRL -");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(100), "100");
        assert_eq!(group_thousands(1000), "1.000");
        assert_eq!(group_thousands(123456789), "123.456.789");
    }
}
