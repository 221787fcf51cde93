//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the providers send, so they can be used directly in wire types
//! without conversion overhead.

pub mod serde_util;
pub mod units;

pub use units::{format_units, parse_units, usd_value};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ─── ParseError ──────────────────────────────────────────────────────────────

/// Errors raised when parsing shared newtypes from strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Invalid timeframe '{0}' (expected one of 1D, 7D, 14D, 30D, 90D)")]
    InvalidTimeframe(String),
}

// ─── Symbol ──────────────────────────────────────────────────────────────────

/// Token ticker symbol (e.g. `"USDC"`), the unique key of every balance entry.
///
/// Symbols are normalized to upper case on construction so lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::new(s))
    }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// A 20-byte EVM address stored as a lower-case `0x`-prefixed hex string.
///
/// Providers are inconsistent about checksum casing, so equality is on the
/// normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// The zero address, used by providers to denote the native asset.
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ParseError::InvalidAddress {
                input: s.to_string(),
                reason: "missing 0x prefix".to_string(),
            })?;

        let bytes = hex::decode(body).map_err(|e| ParseError::InvalidAddress {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        if bytes.len() != 20 {
            return Err(ParseError::InvalidAddress {
                input: s.to_string(),
                reason: format!("expected 20 bytes, got {}", bytes.len()),
            });
        }

        Ok(Self(format!("0x{}", hex::encode(bytes))))
    }

    pub fn zero() -> Self {
        Self(Self::ZERO.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Timeframe ───────────────────────────────────────────────────────────────

/// Lookback window for the portfolio history chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    Day1,
    #[default]
    #[serde(rename = "7D")]
    Days7,
    #[serde(rename = "14D")]
    Days14,
    #[serde(rename = "30D")]
    Days30,
    #[serde(rename = "90D")]
    Days90,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Day1,
        Timeframe::Days7,
        Timeframe::Days14,
        Timeframe::Days30,
        Timeframe::Days90,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day1 => "1D",
            Self::Days7 => "7D",
            Self::Days14 => "14D",
            Self::Days30 => "30D",
            Self::Days90 => "90D",
        }
    }

    /// Number of days looked back from today.
    pub fn days(&self) -> u32 {
        match self {
            Self::Day1 => 1,
            Self::Days7 => 7,
            Self::Days14 => 14,
            Self::Days30 => 30,
            Self::Days90 => 90,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == upper)
            .ok_or_else(|| ParseError::InvalidTimeframe(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    #[test]
    fn test_symbol_normalizes_case() {
        assert_eq!(Symbol::from("usdc"), Symbol::from("USDC"));
        assert_eq!(Symbol::from(" eth ").as_str(), "ETH");
    }

    #[test]
    fn test_address_parse_lowercases() {
        let addr = Address::parse(USDC).unwrap();
        assert_eq!(addr.as_str(), "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(addr, Address::parse(&USDC.to_lowercase()).unwrap());
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(matches!(
            Address::parse("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            Err(ParseError::InvalidAddress { .. })
        ));
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzz").is_err());
    }

    #[test]
    fn test_address_serde() {
        let json = format!("\"{}\"", USDC);
        let addr: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(
            serde_json::to_string(&addr).unwrap(),
            "\"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48\""
        );
    }

    #[test]
    fn test_timeframe_days_and_parse() {
        let days: Vec<u32> = Timeframe::ALL.iter().map(|tf| tf.days()).collect();
        assert_eq!(days, [1, 7, 14, 30, 90]);
        assert_eq!("30d".parse::<Timeframe>().unwrap(), Timeframe::Days30);
        assert!("2W".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_timeframe_serde() {
        let tf: Timeframe = serde_json::from_str("\"90D\"").unwrap();
        assert_eq!(tf, Timeframe::Days90);
        assert_eq!(serde_json::to_string(&Timeframe::Day1).unwrap(), "\"1D\"");
    }
}
