//! Conversion: (symbol, PriceFeedEntry) → PriceQuote (TryFrom + validation).

use super::wire::PriceFeedEntry;
use super::PriceQuote;
use crate::domain::FeedError;
use crate::shared::Symbol;
use rust_decimal::prelude::*;

impl TryFrom<(&str, &PriceFeedEntry)> for PriceQuote {
    type Error = FeedError;

    fn try_from((symbol, entry): (&str, &PriceFeedEntry)) -> Result<Self, Self::Error> {
        let invalid = || FeedError::Price {
            symbol: symbol.to_string(),
            input: entry.price.clone(),
        };

        // Parse exactly first so "1e3", "NaN" and negative prices are rejected
        // before the lossy f64 conversion.
        let exact = Decimal::from_str(entry.price.trim()).map_err(|_| invalid())?;
        if exact.is_sign_negative() {
            return Err(invalid());
        }
        let price = exact.to_f64().ok_or_else(invalid)?;

        Ok(Self {
            symbol: Symbol::new(symbol),
            price,
            estimated_gas: entry.estimated_gas.clone(),
        })
    }
}
