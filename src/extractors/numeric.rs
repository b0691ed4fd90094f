//! Number recovery from free text such as `"$1,234.56"`, `"EUR 12,50"` or
//! `"+$4.99 shipping"`. Nothing here fails: text without a number is `None`.

use regex::Regex;
use std::sync::LazyLock;

static NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)*").expect("valid number pattern"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// First integer-or-decimal run in `text`, with thousands separators removed.
pub fn parse_price(text: &str) -> Option<f64> {
    let run = NUMBER_RUN.find(text)?.as_str();
    normalize_separators(run).parse().ok()
}

/// All digits in `text` read as one integer, e.g. `"12 bids"` -> 12.
pub fn digits_only(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Every digit run joined with `.`, e.g. `"US $1,299.00"` -> `"1.299.00"`.
pub fn dotted_digits(text: &str) -> Option<String> {
    let runs: Vec<&str> = DIGIT_RUN.find_iter(text).map(|m| m.as_str()).collect();
    if runs.is_empty() {
        None
    } else {
        Some(runs.join("."))
    }
}

fn normalize_separators(run: &str) -> String {
    let last_comma = run.rfind(',');
    let last_dot = run.rfind('.');

    match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                run.replace('.', "").replace(',', ".")
            } else {
                run.replace(',', "")
            }
        }
        (Some(comma), None) => {
            let decimals = run.len() - comma - 1;
            if run.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                run.replace(',', ".")
            } else {
                run.replace(',', "")
            }
        }
        (None, Some(_)) if run.matches('.').count() > 1 => run.replace('.', ""),
        _ => run.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dollar_amount_with_thousands() {
        assert_eq!(parse_price("$1,234.56"), Some(1234.56));
    }

    #[test]
    fn free_shipping_is_absent() {
        assert_eq!(parse_price("Free"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn takes_first_run_only() {
        assert_eq!(parse_price("$10.00 to $25.00"), Some(10.0));
        assert_eq!(parse_price("+$4.99 shipping"), Some(4.99));
    }

    #[test]
    fn european_formats() {
        assert_eq!(parse_price("EUR 12,50"), Some(12.5));
        assert_eq!(parse_price("1.234,56 €"), Some(1234.56));
        assert_eq!(parse_price("1.234.567"), Some(1234567.0));
        assert_eq!(parse_price("C $1,234"), Some(1234.0));
    }

    #[test]
    fn digit_extraction() {
        assert_eq!(digits_only("12 bids"), Some(12));
        assert_eq!(digits_only("(1,024)"), Some(1024));
        assert_eq!(digits_only("no bids"), None);
    }

    #[test]
    fn dotted_digit_normalization() {
        assert_eq!(dotted_digits("US $1,299.00").as_deref(), Some("1.299.00"));
        assert_eq!(dotted_digits("C $45.10").as_deref(), Some("45.10"));
        assert_eq!(dotted_digits("Price unavailable"), None);
    }
}
