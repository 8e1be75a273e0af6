// Display formatting for currency, percentages and plain numbers.
//
// Every function here is total: non-finite input renders as the zero-string
// and nothing panics. Raw CSV export values bypass this module entirely.
use num_format::{Locale, ToFormattedString};

/// Bangladeshi Taka sign, always prefixed to currency output.
pub const CURRENCY_SIGN: &str = "৳";

/// Abbreviated currency string with magnitude suffixes on the absolute value:
/// >= 1 crore -> `Cr`, >= 1 lakh -> `Lac`, >= 1 thousand -> `K`, otherwise a
/// grouped integer. Cr/Lac use two decimals; K uses one (the single precision
/// chosen for all call sites).
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("{} 0", CURRENCY_SIGN);
    }
    let abs = value.abs();
    if abs >= 10_000_000.0 {
        format!("{} {:.2} Cr", CURRENCY_SIGN, value / 10_000_000.0)
    } else if abs >= 100_000.0 {
        format!("{} {:.2} Lac", CURRENCY_SIGN, value / 100_000.0)
    } else if abs >= 1_000.0 {
        format!("{} {:.1} K", CURRENCY_SIGN, value / 1_000.0)
    } else {
        format!("{} {}", CURRENCY_SIGN, group_int(value))
    }
}

/// Full currency string without magnitude abbreviation, e.g. `৳ 1,234,567`.
pub fn format_currency_full(value: f64) -> String {
    if !value.is_finite() {
        return format!("{} 0", CURRENCY_SIGN);
    }
    format!("{} {}", CURRENCY_SIGN, group_int(value))
}

/// One-decimal percentage, e.g. `104.2%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    format!("{:.1}%", value)
}

/// Locale-grouped plain number.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    group_int(value)
}

// Grouped rendering of the integer part. `num-format` only groups integers,
// so the value is truncated first; display precision below 1,000 is whole
// units.
fn group_int(value: f64) -> String {
    (value.trunc() as i64).to_formatted_string(&Locale::en)
}
