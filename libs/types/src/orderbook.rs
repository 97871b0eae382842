use rust_decimal::Decimal;

/// One level of an order book side: a price and the quantity available there.
pub type PriceLevel = (Decimal, Decimal);

/// Bids in descending price order, asks in ascending, both truncated to at
/// most the configured depth by the adapter that produced this book.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    pub fn new(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { bids, asks }
    }

    pub fn is_empty_side(&self, side: Side) -> bool {
        match side {
            Side::Bids => self.bids.is_empty(),
            Side::Asks => self.asks.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bids,
    Asks,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_side_detection() {
        let book = OrderBook::new(vec![], vec![(dec!(10), dec!(1))]);
        assert!(book.is_empty_side(Side::Bids));
        assert!(!book.is_empty_side(Side::Asks));
    }
}
