//! Currency and currency-pair value types
//!
//! A [`Currency`] is a three-letter uppercase ISO-style code stored inline,
//! so it is `Copy` and cheap to use as a map key. A [`CurrencyPair`] is a
//! *directional* (from, to) key: `USD/EUR` and `EUR/USD` are distinct pairs
//! with independently configured rates.

use crate::types::error::LedgerError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A currency, identified by its three-letter uppercase code
///
/// The code is stored inline as ASCII bytes, making the type `Copy` and
/// giving it a total lexicographic order (used for statement ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency([u8; 3]);

impl Currency {
    /// Parse a currency from its code
    ///
    /// The code must be exactly three ASCII uppercase letters.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCurrency`] for any other input.
    pub fn from_code(code: &str) -> Result<Self, LedgerError> {
        let bytes = code.as_bytes();
        if bytes.len() == 3 && bytes.iter().all(|b| b.is_ascii_uppercase()) {
            Ok(Currency([bytes[0], bytes[1], bytes[2]]))
        } else {
            Err(LedgerError::invalid_currency(code))
        }
    }

    /// The three-letter code, e.g. `"USD"`
    pub fn code(&self) -> &str {
        // Invariant: constructed from ASCII uppercase only
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
    }
}

// Serialized as the bare code string so a Currency can key a JSON map.
impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CodeVisitor;

        impl Visitor<'_> for CodeVisitor {
            type Value = Currency;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a three-letter uppercase currency code")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Currency, E> {
                Currency::from_code(value).map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_str(CodeVisitor)
    }
}

/// A directional (from, to) currency pair used to look up a conversion rate
///
/// The pair is ordered: converting USD into EUR uses the `USD/EUR` rate,
/// never the inverse of `EUR/USD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    from: Currency,
    to: Currency,
}

impl CurrencyPair {
    pub fn new(from: Currency, to: Currency) -> Self {
        CurrencyPair { from, to }
    }

    pub fn from_currency(&self) -> Currency {
        self.from
    }

    pub fn to_currency(&self) -> Currency {
        self.to
    }

    /// Whether both sides name the same currency
    ///
    /// Identity pairs always convert at rate 1.0 and are never stored.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::usd("USD")]
    #[case::eur("EUR")]
    #[case::jpy("JPY")]
    fn test_from_code_accepts_valid_codes(#[case] code: &str) {
        let currency = Currency::from_code(code).unwrap();
        assert_eq!(currency.code(), code);
        assert_eq!(currency.to_string(), code);
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_short("US")]
    #[case::too_long("USDT")]
    #[case::lowercase("usd")]
    #[case::digits("U5D")]
    #[case::non_ascii("€UR")]
    fn test_from_code_rejects_invalid_codes(#[case] code: &str) {
        let result = Currency::from_code(code);
        assert!(matches!(result, Err(LedgerError::InvalidCurrency { .. })));
    }

    #[test]
    fn test_ordering_is_lexicographic_by_code() {
        let eur = Currency::from_code("EUR").unwrap();
        let gbp = Currency::from_code("GBP").unwrap();
        let usd = Currency::from_code("USD").unwrap();

        let mut codes = vec![usd, eur, gbp];
        codes.sort();
        assert_eq!(codes, vec![eur, gbp, usd]);
    }

    #[test]
    fn test_pair_is_directional() {
        let usd = Currency::from_code("USD").unwrap();
        let eur = Currency::from_code("EUR").unwrap();

        assert_ne!(CurrencyPair::new(usd, eur), CurrencyPair::new(eur, usd));
        assert_eq!(CurrencyPair::new(usd, eur).to_string(), "USD/EUR");
    }

    #[test]
    fn test_identity_pair() {
        let usd = Currency::from_code("USD").unwrap();
        assert!(CurrencyPair::new(usd, usd).is_identity());

        let eur = Currency::from_code("EUR").unwrap();
        assert!(!CurrencyPair::new(usd, eur).is_identity());
    }

    #[test]
    fn test_serde_round_trip_as_string() {
        let usd = Currency::from_code("USD").unwrap();
        let json = serde_json::to_string(&usd).unwrap();
        assert_eq!(json, "\"USD\"");

        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, usd);
    }

    #[test]
    fn test_deserialize_rejects_bad_code() {
        let result: Result<Currency, _> = serde_json::from_str("\"usd\"");
        assert!(result.is_err());
    }
}
