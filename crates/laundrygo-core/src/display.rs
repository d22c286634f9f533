//! Human-readable formatting for list rows.

/// Format a parsed price as rupiah with Indonesian digit grouping.
///
/// `7000.0` becomes `"Rp 7.000"`. Non-finite prices render as `"-"`.
#[must_use]
pub fn format_price(price: f64) -> String {
    if !price.is_finite() || price < 0.0 {
        return "-".to_string();
    }
    format!("Rp {}", group_thousands(&format!("{price:.0}")))
}

/// `"2.35 km"`, or `None` when the distance is unknown.
#[must_use]
pub fn format_distance(distance_km: f64) -> Option<String> {
    distance_km
        .is_finite()
        .then(|| format!("{distance_km:.2} km"))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
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
    fn price_uses_dot_grouping() {
        assert_eq!(format_price(7000.0), "Rp 7.000");
        assert_eq!(format_price(500.0), "Rp 500");
        assert_eq!(format_price(0.0), "Rp 0");
        assert_eq!(format_price(1_250_000.0), "Rp 1.250.000");
        assert_eq!(format_price(100_000.0), "Rp 100.000");
    }

    #[test]
    fn unknown_price_is_a_dash() {
        assert_eq!(format_price(f64::INFINITY), "-");
        assert_eq!(format_price(f64::NAN), "-");
    }

    #[test]
    fn distance_has_two_decimals() {
        assert_eq!(format_distance(2.345_6).as_deref(), Some("2.35 km"));
        assert_eq!(format_distance(0.0).as_deref(), Some("0.00 km"));
        assert_eq!(format_distance(f64::INFINITY), None);
    }
}
