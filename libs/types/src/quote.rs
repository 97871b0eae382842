use crate::pair::NativeSymbol;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Best bid/ask at a single instant. Zero or malformed rows are discarded at
/// the adapter boundary; `bid <= ask` is expected but not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
}

impl Quote {
    /// A quote is usable for spread comparison only if both sides are
    /// strictly positive; a zero side disqualifies it, per spec semantics.
    pub fn is_valid(&self) -> bool {
        self.bid > Decimal::ZERO && self.ask > Decimal::ZERO
    }
}

/// Per-venue mapping produced by a single top-of-book fetch.
#[derive(Debug, Clone, Default)]
pub struct QuoteBook(HashMap<NativeSymbol, Quote>);

impl QuoteBook {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, symbol: NativeSymbol, quote: Quote) {
        self.0.insert(symbol, quote);
    }

    pub fn get(&self, symbol: &NativeSymbol) -> Option<&Quote> {
        self.0.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_with_zero_side_is_invalid() {
        let q = Quote {
            bid: Decimal::ZERO,
            ask: dec!(100),
            bid_size: dec!(1),
            ask_size: dec!(1),
        };
        assert!(!q.is_valid());
    }

    #[test]
    fn quote_book_roundtrips_an_entry() {
        let mut book = QuoteBook::new();
        let symbol = NativeSymbol::new("BTCUSDT");
        let quote = Quote {
            bid: dec!(100),
            ask: dec!(101),
            bid_size: dec!(2),
            ask_size: dec!(3),
        };
        book.insert(symbol.clone(), quote);
        assert_eq!(book.get(&symbol), Some(&quote));
        assert_eq!(book.len(), 1);
    }
}
