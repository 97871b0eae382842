use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Apply a taker fee to a price paid on the buy leg: `price * (1 + fee/100)`.
pub fn apply_buy_fee(price: Decimal, fee_pct: Decimal) -> Decimal {
    price * (Decimal::ONE + fee_pct / dec!(100))
}

/// Apply a taker fee to a price received on the sell leg: `price * (1 - fee/100)`.
pub fn apply_sell_fee(price: Decimal, fee_pct: Decimal) -> Decimal {
    price * (Decimal::ONE - fee_pct / dec!(100))
}

/// `(effective_sell - effective_buy) / effective_buy * 100 - safety_buffer_pct`.
pub fn net_spread_pct(
    effective_buy: Decimal,
    effective_sell: Decimal,
    safety_buffer_pct: Decimal,
) -> Decimal {
    let gross = (effective_sell - effective_buy) / effective_buy * dec!(100);
    gross - safety_buffer_pct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fees_erode_gross_spread_to_expected_net() {
        let exec_buy = dec!(100);
        let exec_sell = dec!(100.8);
        let fee = dec!(0.10);
        let safety_buffer = dec!(0.30);

        let effective_buy = apply_buy_fee(exec_buy, fee);
        let effective_sell = apply_sell_fee(exec_sell, fee);
        assert_eq!(effective_buy, dec!(100.1));
        assert_eq!(effective_sell, dec!(100.6992));

        let net = net_spread_pct(effective_buy, effective_sell, safety_buffer);
        assert!((net - dec!(0.299)).abs() < dec!(0.001));
        assert!(net >= dec!(0.20));
    }

    #[test]
    fn zero_fee_leaves_price_unchanged() {
        assert_eq!(apply_buy_fee(dec!(50), Decimal::ZERO), dec!(50));
        assert_eq!(apply_sell_fee(dec!(50), Decimal::ZERO), dec!(50));
    }
}
