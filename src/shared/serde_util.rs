//! Custom serde helpers for provider wire formats.

/// (De)serializes a `u128` smallest-unit amount as a decimal string.
///
/// Balance and activity providers send `"amount": "1500000"` rather than a JSON
/// number, since 18-decimal values overflow `f64`.
pub mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        crate::shared::parse_units(&raw).map_err(serde::de::Error::custom)
    }
}

/// Accepts either a JSON string or a JSON number and yields it as a string.
///
/// Price feeds are inconsistent about `estimatedGas`: some send `"21000"`,
/// some send `21000`.
pub mod string_or_number {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(u64),
        Float(f64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::Int(n) => n.to_string(),
            Raw::Float(f) => f.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Amount {
        #[serde(with = "super::u128_string")]
        value: u128,
    }

    #[derive(Debug, Deserialize)]
    struct Gas {
        #[serde(deserialize_with = "super::string_or_number::deserialize")]
        gas: String,
    }

    #[test]
    fn test_u128_string_roundtrip() {
        let a: Amount = serde_json::from_str(r#"{"value":"340282366920938463463374607431768211455"}"#).unwrap();
        assert_eq!(a.value, u128::MAX);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            r#"{"value":"340282366920938463463374607431768211455"}"#
        );
    }

    #[test]
    fn test_u128_string_rejects_decimal() {
        assert!(serde_json::from_str::<Amount>(r#"{"value":"1.5"}"#).is_err());
    }

    #[test]
    fn test_string_or_number() {
        let g: Gas = serde_json::from_str(r#"{"gas":"21000"}"#).unwrap();
        assert_eq!(g.gas, "21000");
        let g: Gas = serde_json::from_str(r#"{"gas":21000}"#).unwrap();
        assert_eq!(g.gas, "21000");
    }
}
