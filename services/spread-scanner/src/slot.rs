use parking_lot::RwLock;
use scanner_types::SymbolMap;
use std::sync::Arc;

/// Single-writer, multi-reader atomic publish cell for the SymbolMap.
///
/// Stage-0 is the sole writer; Stage-1 and Stage-2 are readers. A write
/// swaps in a brand new `Arc<SymbolMap>` under a brief write lock; a read
/// clones that `Arc` under a brief read lock and then releases the lock, so
/// the caller holds an immutable, complete snapshot with no further
/// synchronization. Readers never see a torn value.
#[derive(Clone)]
pub struct SnapshotSlot {
    inner: Arc<RwLock<Arc<SymbolMap>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(SymbolMap::new()))),
        }
    }

    pub fn publish(&self, map: SymbolMap) {
        *self.inner.write() = Arc::new(map);
    }

    pub fn current(&self) -> Arc<SymbolMap> {
        self.inner.read().clone()
    }
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanner_types::{canonicalize, NativeSymbol, VenueId};

    #[test]
    fn readers_see_either_old_or_new_snapshot_never_a_torn_one() {
        let slot = SnapshotSlot::new();
        assert!(slot.current().is_empty());

        let mut map = SymbolMap::new();
        map.set(
            canonicalize("BTCUSDT").unwrap(),
            VenueId::Binance,
            NativeSymbol::new("BTCUSDT"),
        );
        slot.publish(map);

        let snapshot = slot.current();
        assert_eq!(snapshot.len(), 1);
    }
}
