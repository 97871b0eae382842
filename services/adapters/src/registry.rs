use crate::adapter::VenueAdapter;
use scanner_types::VenueId;
use std::collections::HashMap;
use std::sync::Arc;

/// Venue -> adapter dispatch, populated once at startup. Adding a venue is
/// one `register` call plus one adapter implementation; nothing downstream
/// needs to change.
#[derive(Default, Clone)]
pub struct VenueRegistry {
    adapters: HashMap<VenueId, Arc<dyn VenueAdapter>>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn VenueAdapter>) {
        self.adapters.insert(adapter.venue(), adapter);
    }

    pub fn get(&self, venue: VenueId) -> Option<&Arc<dyn VenueAdapter>> {
        self.adapters.get(&venue)
    }

    pub fn venues(&self) -> impl Iterator<Item = VenueId> + '_ {
        self.adapters.keys().copied()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn VenueAdapter>> {
        self.adapters.values()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
