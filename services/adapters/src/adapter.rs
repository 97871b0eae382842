use crate::circuit_breaker::AdapterHealth;
use crate::error::AdapterError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use scanner_types::{NativeSymbol, OrderBook, Quote, VenueId};

/// One record from a venue's 24h ticker feed, already trimmed to what
/// Stage-0 needs.
#[derive(Debug, Clone)]
pub struct TickerRecord {
    pub native_symbol: NativeSymbol,
    pub quote_volume_usdt_24h: Decimal,
}

/// Uniform interface every venue implements. Stage-1 and Stage-2 never name
/// a venue inline; they go through this trait via the registry.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    fn venue(&self) -> VenueId;

    /// Quote volume is read from the vendor-specific key and parsed as a
    /// non-negative decimal; malformed or missing values become zero rather
    /// than failing the whole batch.
    async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError>;

    /// Best bid/ask per native symbol at a single instant. Venues that only
    /// expose this through their 24h ticker feed serve it from the same
    /// underlying call as `fetch_24h_tickers`.
    async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError>;

    /// Order book normalized into ascending asks / descending bids, each
    /// truncated to `depth` levels.
    async fn fetch_order_book(
        &self,
        symbol: &NativeSymbol,
        depth: usize,
    ) -> Result<OrderBook, AdapterError>;

    /// Circuit-breaker/error-count snapshot. Plain venue adapters report a
    /// default (always-closed) health; `SafeAdapter` overrides this with its
    /// actual breaker state.
    async fn health(&self) -> AdapterHealth {
        AdapterHealth::default()
    }
}
