//! Field normalizers used by the ranking engine.
//!
//! Both functions are total: unknown or malformed input maps to a sentinel
//! that sorts last (`f64::INFINITY` price, zero facilities).

use crate::records::Facilities;

/// Parse a free-form price such as `"Rp 7.000"` into a number.
///
/// Every non-digit is stripped and the remainder read as a base-10 integer.
/// Returns `f64::INFINITY` when the input is absent or holds no digits.
/// A zero price stays `0.0`; it is a known price, not an unknown one.
#[must_use]
pub fn parse_price(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return f64::INFINITY;
    };
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return f64::INFINITY;
    }
    digits.parse::<f64>().unwrap_or(f64::INFINITY)
}

/// Count the facilities a shop advertises.
///
/// Lists count their entries. Text is split on commas and blank segments are
/// ignored.
#[must_use]
pub fn facility_count(raw: Option<&Facilities>) -> usize {
    match raw {
        Some(Facilities::List(items)) => items.len(),
        Some(Facilities::Text(text)) => text.split(',').filter(|s| !s.trim().is_empty()).count(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Facilities {
        Facilities::Text(s.to_string())
    }

    #[test]
    fn price_strips_currency_and_separators() {
        assert!((parse_price(Some("Rp 7.000")) - 7000.0).abs() < f64::EPSILON);
        assert!((parse_price(Some("5000")) - 5000.0).abs() < f64::EPSILON);
        assert!((parse_price(Some("Rp4,500/kg")) - 4500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_without_digits_is_infinite() {
        assert!(parse_price(None).is_infinite());
        assert!(parse_price(Some("")).is_infinite());
        assert!(parse_price(Some("free")).is_infinite());
        assert!(parse_price(Some("Rp -")).is_infinite());
    }

    #[test]
    fn zero_price_is_kept() {
        assert!(parse_price(Some("Rp 0")).abs() < f64::EPSILON);
    }

    #[test]
    fn very_long_digit_runs_stay_finite() {
        let price = parse_price(Some("123456789012345678901234567890"));
        assert!(price.is_finite());
        assert!(price > 1e29);
    }

    #[test]
    fn facility_count_from_text() {
        assert_eq!(facility_count(Some(&text("Setrika, Antar Jemput"))), 2);
        assert_eq!(facility_count(Some(&text(""))), 0);
        assert_eq!(facility_count(Some(&text("Wifi,, ,Parkir,"))), 2);
        assert_eq!(facility_count(Some(&text("Setrika"))), 1);
    }

    #[test]
    fn facility_count_from_list() {
        let list = Facilities::List(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(facility_count(Some(&list)), 3);
        assert_eq!(facility_count(Some(&Facilities::List(vec![]))), 0);
    }

    #[test]
    fn facility_count_absent_is_zero() {
        assert_eq!(facility_count(None), 0);
    }
}
