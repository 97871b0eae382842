//! Per-venue market-data fetchers behind a single `VenueAdapter` trait.
//!
//! Each venue's quirks (separate vs. shared ticker/book endpoints, nullable
//! fields, index layout of order-book levels) stay local to its module; the
//! rest of the workspace only ever talks to the trait and the registry.

mod adapter;
mod circuit_breaker;
mod error;
mod http;
mod registry;
mod safe_adapter;
mod venues;

pub use adapter::{TickerRecord, VenueAdapter};
pub use circuit_breaker::{AdapterHealth, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use error::AdapterError;
pub use http::build_http_client;
pub use registry::VenueRegistry;
pub use safe_adapter::SafeAdapter;
pub use venues::{BinanceAdapter, BybitAdapter, GateAdapter, KucoinAdapter, OkxAdapter};

use scanner_config::ScannerConfig;
use scanner_types::VenueId;
use std::sync::Arc;

/// Build a registry with one adapter per venue present in the config's
/// endpoint table, sharing a single HTTP client across all of them.
pub fn registry_from_config(config: &ScannerConfig) -> VenueRegistry {
    let client = build_http_client(config.venues.request_timeout_ms);
    let mut registry = VenueRegistry::new();

    for venue in VenueId::ALL {
        let Some(endpoints) = config.venues.endpoints_for(venue) else {
            continue;
        };
        let endpoints = endpoints.clone();
        let timeout_ms = config.venues.request_timeout_ms;
        let inner: Arc<dyn VenueAdapter> = match venue {
            VenueId::Binance => {
                Arc::new(BinanceAdapter::new(client.clone(), endpoints, timeout_ms))
            }
            VenueId::Bybit => Arc::new(BybitAdapter::new(client.clone(), endpoints, timeout_ms)),
            VenueId::Okx => Arc::new(OkxAdapter::new(client.clone(), endpoints, timeout_ms)),
            VenueId::Gate => Arc::new(GateAdapter::new(client.clone(), endpoints, timeout_ms)),
            VenueId::Kucoin => Arc::new(KucoinAdapter::new(client.clone(), endpoints, timeout_ms)),
        };
        let adapter: Arc<dyn VenueAdapter> =
            Arc::new(SafeAdapter::new(inner, CircuitBreakerConfig::default()));
        registry.register(adapter);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_from_config_registers_every_configured_venue() {
        let config = ScannerConfig::default();
        let registry = registry_from_config(&config);
        assert_eq!(registry.len(), VenueId::ALL.len());
        for venue in VenueId::ALL {
            assert!(registry.get(venue).is_some());
        }
    }
}
