//! Utility functions for cleaning and formatting amounts
//!
//! Brokerage exports carry amounts as display text ("$1,234.56", "-12.5%").
//! This module turns that text into `Decimal` and renders `Decimal` back the
//! way the `en_US` locale does, so every report and export looks the same.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "$" prefix (US Dollar)
    USD,
    /// No currency symbol (percentages, plain grouped numbers)
    None,
}

/// Parse a currency or percentage cell into a `Decimal`.
///
/// Strips `$`, `%`, thousands separators and whitespace. Accounting
/// parentheses mark a negative amount. Returns `None` when nothing numeric
/// is left.
///
/// # Examples
/// ```
/// use harvest::utils::parse_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_amount("$1,234.56"), Some(dec!(1234.56)));
/// assert_eq!(parse_amount("-12.5%"), Some(dec!(-12.5)));
/// assert_eq!(parse_amount("($40.00)"), Some(dec!(-40.00)));
/// assert_eq!(parse_amount("n/a"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let (negated, body) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',') && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(cleaned).ok()?;
    Some(if negated { -value } else { value })
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using `en_US` conventions:
/// - Thousands separator: `,` (comma)
/// - Decimal separator: `.` (period)
/// - Sign before the currency symbol: `-$1,234.56`
///
/// Values are rounded half away from zero to two places.
///
/// # Examples
/// ```
/// use harvest::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::USD),
///     "$1,234.56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let with_separators = group_thousands(integer_part);

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::USD => "$",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{}.{}", sign, prefix, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

// ============ Convenience functions ============

/// Format as US Dollars with symbol: "$1,234.56"
///
/// # Examples
/// ```
/// use harvest::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "$1,234.56");
/// assert_eq!(format_currency(dec!(-500)), "-$500.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::USD)
}

/// Format a percentage with grouping and two places: "1,234.50%"
///
/// # Examples
/// ```
/// use harvest::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(16.666666)), "16.67%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!(
        "{}%",
        format_currency_with_width(value, 0, CurrencySymbol::None)
    )
}
