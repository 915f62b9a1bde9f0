//! Display formatting for amounts stored in minor units (cents).

/// Convert minor units to major units without touching the stored value.
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// Format cents as US dollars, e.g. `123456` → `"$1,234.56"`.
pub fn format_currency(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}${}.{:02}", group_thousands(abs / 100), abs % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_cents_as_dollars() {
        assert_eq!(format_currency(0), "$0.00");
        assert_eq!(format_currency(5), "$0.05");
        assert_eq!(format_currency(1000), "$10.00");
        assert_eq!(format_currency(15795), "$157.95");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_currency(100_000), "$1,000.00");
        assert_eq!(format_currency(123_456_789), "$1,234,567.89");
    }

    #[test]
    fn negative_amounts_lead_with_sign() {
        assert_eq!(format_currency(-500), "-$5.00");
        assert_eq!(format_currency(i64::MIN), "-$92,233,720,368,547,758.08");
    }

    #[test]
    fn major_units_divide_by_hundred() {
        assert_eq!(to_major_units(15795), 157.95);
        assert_eq!(to_major_units(0), 0.0);
    }
}
