use crate::pair::{CanonicalPair, NativeSymbol};
use crate::venue::VenueId;
use std::collections::HashMap;

/// The cross-venue symbol map produced by Stage-0. A pair is present at a
/// venue iff the venue listed it in its 24h tickers and its 24h quote-volume
/// cleared the configured minimum. A pair with fewer than two present venues
/// is kept (it just can't yield a Stage-1 candidate).
///
/// Published wholesale: readers always see a complete, internally consistent
/// map, never a partially-updated one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolMap {
    entries: HashMap<CanonicalPair, HashMap<VenueId, NativeSymbol>>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, pair: CanonicalPair, venue: VenueId, symbol: NativeSymbol) {
        self.entries.entry(pair).or_default().insert(venue, symbol);
    }

    pub fn venues_for(&self, pair: &CanonicalPair) -> Option<&HashMap<VenueId, NativeSymbol>> {
        self.entries.get(pair)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &CanonicalPair> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
