use crate::pair::CanonicalPair;
use crate::quote::Quote;
use crate::venue::VenueId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A Stage-1 signal: a pair/venue combination whose gross spread cleared
/// `MIN_PROFIT_PCT` in at least one direction.
///
/// Invariant: `best_spread_pct == max(spread_a2b_pct, spread_b2a_pct)` and
/// `best_spread_pct >= MIN_PROFIT_PCT`.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub pair: CanonicalPair,
    pub a: VenueId,
    pub b: VenueId,
    pub a_quote: Quote,
    pub b_quote: Quote,
    pub spread_a2b_pct: Decimal,
    pub spread_b2a_pct: Decimal,
    pub best_direction: Direction,
    pub best_spread_pct: Decimal,
    pub ts_utc: DateTime<Utc>,
}

/// Which leg to buy on and which to sell on for the best-direction spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub buy_at: VenueId,
    pub sell_at: VenueId,
}

impl Candidate {
    pub fn buy_venue(&self) -> VenueId {
        self.best_direction.buy_at
    }

    pub fn sell_venue(&self) -> VenueId {
        self.best_direction.sell_at
    }

    /// The ask actually being bought at, whichever of `a`/`b` that is.
    pub fn buy_price(&self) -> Decimal {
        if self.best_direction.buy_at == self.a {
            self.a_quote.ask
        } else {
            self.b_quote.ask
        }
    }

    /// The bid actually being sold into, whichever of `a`/`b` that is.
    pub fn sell_price(&self) -> Decimal {
        if self.best_direction.sell_at == self.a {
            self.a_quote.bid
        } else {
            self.b_quote.bid
        }
    }
}
