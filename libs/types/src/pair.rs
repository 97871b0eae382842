use crate::venue::VenueId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The internal cross-venue key, always of the form `BASE_USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalPair(String);

impl CanonicalPair {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A venue-local spelling of a pair, e.g. `BTCUSDT`, `BTC-USDT`, `BTC_USDT`.
/// Never compared across venues directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeSymbol(String);

impl NativeSymbol {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NativeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips `-`/`_`, requires a `USDT` suffix, and reinserts the underscore.
/// Symbols that don't end in `USDT` after stripping (including those using
/// any other separator, such as `/`) canonicalize to `None`.
///
/// Idempotent: `canonicalize(canonicalize(s).unwrap().as_str()) == canonicalize(s)`.
pub fn canonicalize(native: &str) -> Option<CanonicalPair> {
    if !native
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }
    let stripped: String = native.chars().filter(|&c| c != '-' && c != '_').collect();
    let upper = stripped.to_ascii_uppercase();
    let base = upper.strip_suffix("USDT")?;
    if base.is_empty() {
        return None;
    }
    Some(CanonicalPair(format!("{base}_USDT")))
}

/// The inverse of `canonicalize`, per venue. Each venue spells the separator
/// (or lack thereof) differently; this must match what `fetch_order_book` and
/// `fetch_top_of_book` expect as input.
pub fn native_symbol_for(pair: &CanonicalPair, venue: VenueId) -> NativeSymbol {
    let base = pair
        .as_str()
        .strip_suffix("_USDT")
        .expect("CanonicalPair invariant: always ends in _USDT");
    let native = match venue {
        VenueId::Binance | VenueId::Bybit => format!("{base}USDT"),
        VenueId::Okx | VenueId::Kucoin => format!("{base}-USDT"),
        VenueId::Gate => format!("{base}_USDT"),
    };
    NativeSymbol(native)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_common_spellings() {
        assert_eq!(canonicalize("BTCUSDT").unwrap().as_str(), "BTC_USDT");
        assert_eq!(canonicalize("BTC-USDT").unwrap().as_str(), "BTC_USDT");
        assert_eq!(canonicalize("BTC_USDT").unwrap().as_str(), "BTC_USDT");
    }

    #[test]
    fn rejects_other_separators_and_non_usdt_pairs() {
        assert!(canonicalize("BTC/USDT").is_none());
        assert!(canonicalize("ETHBTC").is_none());
    }

    #[test]
    fn rejects_bare_usdt() {
        assert!(canonicalize("USDT").is_none());
    }

    #[test]
    fn is_idempotent() {
        let once = canonicalize("BTC-USDT").unwrap();
        let twice = canonicalize(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn native_symbol_round_trips_per_venue() {
        let pair = canonicalize("BTCUSDT").unwrap();
        assert_eq!(
            native_symbol_for(&pair, VenueId::Binance).as_str(),
            "BTCUSDT"
        );
        assert_eq!(native_symbol_for(&pair, VenueId::Okx).as_str(), "BTC-USDT");
        assert_eq!(native_symbol_for(&pair, VenueId::Gate).as_str(), "BTC_USDT");
        assert_eq!(
            native_symbol_for(&pair, VenueId::Kucoin).as_str(),
            "BTC-USDT"
        );
        assert_eq!(
            canonicalize(native_symbol_for(&pair, VenueId::Bybit).as_str()).unwrap(),
            pair
        );
    }
}
