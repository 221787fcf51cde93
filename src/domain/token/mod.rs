//! Token domain — the fixed set of supported tokens.
//!
//! The registry is configuration: the store creates exactly one balance and one
//! price entry per registered symbol and never adds or removes entries.

use crate::error::SdkError;
use crate::shared::{Address, Symbol};
use serde::{Deserialize, Serialize};

/// One supported token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: Symbol,
    /// Contract address; the zero address for the chain's native asset.
    pub address: Address,
    pub decimals: u8,
    #[serde(default)]
    pub stablecoin: bool,
    /// The chain's gas token. Activity entries without a `token_address`
    /// resolve to it.
    #[serde(default)]
    pub native: bool,
}

impl TokenConfig {
    pub fn new(symbol: &str, address: Address, decimals: u8) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            address,
            decimals,
            stablecoin: false,
            native: false,
        }
    }

    pub fn stablecoin(mut self) -> Self {
        self.stablecoin = true;
        self
    }

    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }
}

/// Ordered, validated set of supported tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenRegistry {
    tokens: Vec<TokenConfig>,
}

impl TokenRegistry {
    /// Build a registry, rejecting duplicate symbols/addresses and more than
    /// one native token.
    pub fn new(tokens: Vec<TokenConfig>) -> Result<Self, SdkError> {
        for (i, token) in tokens.iter().enumerate() {
            if let Some(dup) = tokens[..i].iter().find(|t| t.symbol == token.symbol) {
                return Err(SdkError::Validation(format!(
                    "Duplicate token symbol {}",
                    dup.symbol
                )));
            }
            if let Some(dup) = tokens[..i].iter().find(|t| t.address == token.address) {
                return Err(SdkError::Validation(format!(
                    "Tokens {} and {} share address {}",
                    dup.symbol, token.symbol, token.address
                )));
            }
        }
        if tokens.iter().filter(|t| t.native).count() > 1 {
            return Err(SdkError::Validation(
                "At most one native token may be configured".to_string(),
            ));
        }
        Ok(Self { tokens })
    }

    /// Parse a JSON array of [`TokenConfig`].
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        let tokens: Vec<TokenConfig> = serde_json::from_str(json)?;
        Self::new(tokens)
    }

    pub fn tokens(&self) -> &[TokenConfig] {
        &self.tokens
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.tokens.iter().map(|t| &t.symbol)
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| &t.symbol == symbol)
    }

    pub fn by_address(&self, address: &Address) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| &t.address == address)
    }

    pub fn native_token(&self) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| t.native)
    }

    /// Resolve an activity/feed address: `None` means the native asset.
    pub fn resolve(&self, address: Option<&Address>) -> Option<&TokenConfig> {
        match address {
            Some(addr) => self.by_address(addr),
            None => self.native_token(),
        }
    }

    pub fn is_stablecoin(&self, symbol: &Symbol) -> bool {
        self.get(symbol).is_some_and(|t| t.stablecoin)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'de> Deserialize<'de> for TokenRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tokens = Vec::<TokenConfig>::deserialize(deserializer)?;
        TokenRegistry::new(tokens).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

    fn registry() -> TokenRegistry {
        TokenRegistry::new(vec![
            TokenConfig::new("ETH", Address::zero(), 18).native(),
            TokenConfig::new("WETH", Address::parse(WETH).unwrap(), 18),
            TokenConfig::new("USDC", Address::parse(USDC).unwrap(), 6).stablecoin(),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_by_symbol_and_address() {
        let reg = registry();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.get(&Symbol::from("usdc")).unwrap().decimals, 6);
        let upper = Address::parse(&USDC.to_uppercase().replace("0X", "0x")).unwrap();
        assert_eq!(reg.by_address(&upper).unwrap().symbol, Symbol::from("USDC"));
    }

    #[test]
    fn test_resolve_native() {
        let reg = registry();
        assert_eq!(reg.resolve(None).unwrap().symbol, Symbol::from("ETH"));
        assert!(reg
            .resolve(Some(&Address::parse("0x1111111111111111111111111111111111111111").unwrap()))
            .is_none());
    }

    #[test]
    fn test_stablecoin_flag() {
        let reg = registry();
        assert!(reg.is_stablecoin(&Symbol::from("USDC")));
        assert!(!reg.is_stablecoin(&Symbol::from("ETH")));
        assert!(!reg.is_stablecoin(&Symbol::from("DAI")));
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_symbol = TokenRegistry::new(vec![
            TokenConfig::new("USDC", Address::parse(USDC).unwrap(), 6),
            TokenConfig::new("usdc", Address::parse(WETH).unwrap(), 6),
        ]);
        assert!(matches!(dup_symbol, Err(SdkError::Validation(_))));

        let dup_address = TokenRegistry::new(vec![
            TokenConfig::new("USDC", Address::parse(USDC).unwrap(), 6),
            TokenConfig::new("USDC2", Address::parse(USDC).unwrap(), 6),
        ]);
        assert!(dup_address.is_err());
    }

    #[test]
    fn test_from_json() {
        let json = format!(
            r#"[
                {{"symbol":"eth","address":"{}","decimals":18,"native":true}},
                {{"symbol":"USDC","address":"{}","decimals":6,"stablecoin":true}}
            ]"#,
            Address::ZERO,
            USDC
        );
        let reg = TokenRegistry::from_json(&json).unwrap();
        assert_eq!(reg.native_token().unwrap().symbol, Symbol::from("ETH"));
        assert!(reg.is_stablecoin(&Symbol::from("USDC")));
    }

    #[test]
    fn test_from_json_rejects_bad_address() {
        let json = r#"[{"symbol":"X","address":"not-hex","decimals":6}]"#;
        assert!(matches!(TokenRegistry::from_json(json), Err(SdkError::Serde(_))));
    }
}
