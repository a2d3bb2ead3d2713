use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Conventions of a bank's CSV export, handed to every conversion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// chrono pattern of the source dates, e.g. `%d.%m.%Y`.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

fn default_thousands_separator() -> char {
    '.'
}

fn default_decimal_separator() -> char {
    ','
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            date_format: default_date_format(),
            thousands_separator: default_thousands_separator(),
            decimal_separator: default_decimal_separator(),
        }
    }
}

/// Format a decimal as a ledger value: explicit sign, two fractional digits.
pub fn format_value(val: Decimal) -> String {
    let mut rounded = val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        '-'
    } else {
        '+'
    };
    format!("{sign}{}", rounded.abs())
}

/// Parse a stored value (`+100.78`, `-5.00`, `42`).
pub fn parse_value(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    Decimal::from_str(s).ok()
}

/// Exact sum of values; `None` when it leaves the decimal range.
pub fn sum_values(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Convert a money value as written by a bank export into the stored form.
pub fn normalize_value(raw: &str, config: &FormatConfig) -> Option<String> {
    let mut s = raw.trim().replace('"', "");
    if let Some(stripped) = s.strip_suffix(config.currency.as_str()) {
        s = stripped.trim().to_string();
    }
    let s: String = s
        .chars()
        .filter(|c| *c != config.thousands_separator)
        .map(|c| if c == config.decimal_separator { '.' } else { c })
        .collect();
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return parse_value(inner).map(|d| format_value(-d));
    }
    parse_value(s).map(format_value)
}

/// Convert a date written with the configured pattern into `YYYY-MM-DD`.
pub fn normalize_date(raw: &str, config: &FormatConfig) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), &config.date_format)
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn plural(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sum_values_overflow() {
        assert_eq!(sum_values([dec!(1.50), dec!(-0.25)]), Some(dec!(1.25)));
        assert_eq!(sum_values([]), Some(Decimal::ZERO));
        assert_eq!(sum_values([Decimal::MAX, dec!(1)]), None);
        assert_eq!(sum_values([Decimal::MIN, dec!(-1)]), None);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(dec!(602.34)), "+602.34");
        assert_eq!(format_value(dec!(-5)), "-5.00");
        assert_eq!(format_value(dec!(11.1)), "+11.10");
        assert_eq!(format_value(dec!(0)), "+0.00");
        assert_eq!(format_value(dec!(-0.001)), "+0.00");
        assert_eq!(format_value(dec!(2.005)), "+2.01");
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("+100.78"), Some(dec!(100.78)));
        assert_eq!(parse_value("-0.50"), Some(dec!(-0.50)));
        assert_eq!(parse_value(" 42 "), Some(dec!(42)));
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value(""), None);
    }

    #[test]
    fn test_normalize_value_german_export() {
        let cfg = FormatConfig::default();
        assert_eq!(normalize_value("1.234,56 EUR", &cfg).as_deref(), Some("+1234.56"));
        assert_eq!(normalize_value("-42,5", &cfg).as_deref(), Some("-42.50"));
        assert_eq!(normalize_value("\"(50,00)\"", &cfg).as_deref(), Some("-50.00"));
        assert_eq!(normalize_value("n/a", &cfg), None);
    }

    #[test]
    fn test_normalize_value_us_export() {
        let cfg = FormatConfig {
            currency: "USD".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            thousands_separator: ',',
            decimal_separator: '.',
        };
        assert_eq!(normalize_value("1,234.56", &cfg).as_deref(), Some("+1234.56"));
        assert_eq!(normalize_date("01/15/2025", &cfg).as_deref(), Some("2025-01-15"));
    }

    #[test]
    fn test_normalize_date() {
        let cfg = FormatConfig::default();
        assert_eq!(normalize_date("10.07.1972", &cfg).as_deref(), Some("1972-07-10"));
        assert_eq!(normalize_date("30.02.1972", &cfg), None);
        assert_eq!(normalize_date("1972-07-10", &cfg), None);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural("transaction", 1), "transaction");
        assert_eq!(plural("transaction", 0), "transactions");
        assert_eq!(plural("set", 2), "sets");
    }
}
