//! Pure conversions between smallest on-chain units and human-readable amounts.
//!
//! Integer math only for the unit conversion; the USD valuation is the single
//! place where floating point enters.
//! No async, no network calls.

use std::fmt;

/// Errors that can occur when parsing an integer amount string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    Empty,
    NotAnInteger { input: String },
    Overflow { input: String },
}

impl fmt::Display for UnitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitsError::Empty => write!(f, "Amount is empty"),
            UnitsError::NotAnInteger { input } => {
                write!(f, "Amount '{}' is not a non-negative integer", input)
            }
            UnitsError::Overflow { input } => write!(f, "Amount '{}' does not fit in u128", input),
        }
    }
}

impl std::error::Error for UnitsError {}

/// Parse a provider integer string (smallest unit) into a `u128`.
///
/// Providers send amounts as decimal digit strings because they overflow JSON
/// numbers. A leading `+` or any fractional part is rejected.
pub fn parse_units(input: &str) -> Result<u128, UnitsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UnitsError::Empty);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UnitsError::NotAnInteger {
            input: input.to_string(),
        });
    }
    trimmed.parse::<u128>().map_err(|_| UnitsError::Overflow {
        input: input.to_string(),
    })
}

/// Format a smallest-unit amount as a decimal string with exactly `decimals`
/// fractional digits.
///
/// ```text
/// format_units(1_500_000, 6) == "1.500000"
/// format_units(42, 0)        == "42"
/// ```
pub fn format_units(value: u128, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    format!("{}.{}", int_part, frac_part)
}

/// USD value of a smallest-unit amount at `price` per whole token.
///
/// Goes through [`format_units`] so every caller derives the same `f64` from the
/// same `(value, decimals)` pair.
pub fn usd_value(value: u128, decimals: u8, price: f64) -> f64 {
    let whole = format_units(value, decimals).parse::<f64>().unwrap_or(0.0);
    price * whole
}
