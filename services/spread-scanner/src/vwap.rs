use rust_decimal::Decimal;

/// Walk order-book levels in their natural side order (asks ascending, bids
/// descending) accumulating notional until `want` is filled or `max_levels`
/// is exhausted.
///
/// Returns the volume-weighted average price over exactly the consumed
/// portion, or `None` if `want` could not be reached within the depth cap.
///
/// `total_qty` is accumulated as `Σ take_i / price_i` across every level
/// visited; it is never re-derived from the last level's price. Using the
/// final level's price in place of the accumulated quantity was a mistake
/// worth naming explicitly, because it silently overstates VWAP on any walk
/// that spans more than one level with a rising ask (or falling bid) price.
pub fn walk(levels: &[(Decimal, Decimal)], want: Decimal, max_levels: usize) -> Option<Decimal> {
    let mut filled = Decimal::ZERO;
    let mut cost = Decimal::ZERO;
    let mut total_qty = Decimal::ZERO;

    for &(price, qty) in levels.iter().take(max_levels) {
        if price <= Decimal::ZERO {
            break;
        }
        let level_notional = price * qty;
        let need = want - filled;
        if need <= Decimal::ZERO {
            break;
        }
        let take = level_notional.min(need);
        let qty_taken = take / price;
        cost += price * qty_taken;
        filled += take;
        total_qty += qty_taken;
        if filled >= want {
            break;
        }
    }

    if filled < want || total_qty <= Decimal::ZERO {
        return None;
    }

    Some(cost / total_qty)
}
