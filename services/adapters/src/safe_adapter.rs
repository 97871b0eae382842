use crate::adapter::{TickerRecord, VenueAdapter};
use crate::circuit_breaker::{AdapterHealth, CircuitBreaker, CircuitBreakerConfig};
use crate::error::AdapterError;
use async_trait::async_trait;
use scanner_types::{NativeSymbol, OrderBook, Quote, VenueId};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Wraps any `VenueAdapter` with a circuit breaker: once an adapter has
/// failed enough consecutive times, further calls are rejected locally
/// (`AdapterError::CircuitOpen`) instead of hitting the venue again, until
/// the recovery timeout lets a trial request back through.
pub struct SafeAdapter {
    inner: Arc<dyn VenueAdapter>,
    breaker: CircuitBreaker,
    error_count: AtomicU64,
}

impl SafeAdapter {
    pub fn new(inner: Arc<dyn VenueAdapter>, config: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new(config),
            error_count: AtomicU64::new(0),
        }
    }

    async fn guarded<T, F, Fut>(&self, operation: &'static str, call: F) -> Result<T, AdapterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AdapterError>>,
    {
        if !self.breaker.should_attempt().await {
            return Err(AdapterError::CircuitOpen {
                venue: self.inner.venue(),
                operation,
            });
        }

        match call().await {
            Ok(value) => {
                self.breaker.on_success().await;
                Ok(value)
            }
            Err(e) => {
                self.breaker.on_failure().await;
                self.error_count.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl VenueAdapter for SafeAdapter {
    fn venue(&self) -> VenueId {
        self.inner.venue()
    }

    async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError> {
        let inner = self.inner.clone();
        self.guarded("fetch_24h_tickers", || async move { inner.fetch_24h_tickers().await })
            .await
    }

    async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError> {
        let inner = self.inner.clone();
        self.guarded("fetch_top_of_book", || async move { inner.fetch_top_of_book().await })
            .await
    }

    async fn fetch_order_book(
        &self,
        symbol: &NativeSymbol,
        depth: usize,
    ) -> Result<OrderBook, AdapterError> {
        let inner = self.inner.clone();
        let symbol = symbol.clone();
        self.guarded("fetch_order_book", || async move {
            inner.fetch_order_book(&symbol, depth).await
        })
        .await
    }

    async fn health(&self) -> AdapterHealth {
        AdapterHealth {
            circuit_state: self.breaker.state().await,
            error_count: self.error_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::CircuitState;
    use std::sync::atomic::{AtomicUsize, Ordering as StdOrdering};
    use std::time::Duration;

    struct AlwaysFails {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VenueAdapter for AlwaysFails {
        fn venue(&self) -> VenueId {
            VenueId::Binance
        }
        async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError> {
            self.calls.fetch_add(1, StdOrdering::Relaxed);
            Err(AdapterError::Transport {
                venue: VenueId::Binance,
                operation: "fetch_24h_tickers",
                detail: "synthetic".to_string(),
            })
        }
        async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError> {
            unimplemented!()
        }
        async fn fetch_order_book(
            &self,
            _symbol: &NativeSymbol,
            _depth: usize,
        ) -> Result<OrderBook, AdapterError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn stops_calling_the_inner_adapter_once_the_circuit_opens() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Arc::new(AlwaysFails {
            calls: AtomicUsize::new(0),
        });
        let safe = SafeAdapter::new(
            inner.clone(),
            CircuitBreakerConfig {
                failure_threshold: 2,
                recovery_timeout: Duration::from_secs(60),
                success_threshold: 1,
            },
        );
        let _ = calls; // silence unused warning if inner.calls diverges from this handle

        assert!(safe.fetch_24h_tickers().await.is_err());
        assert!(safe.fetch_24h_tickers().await.is_err());
        assert_eq!(safe.health().await.circuit_state, CircuitState::Open);

        let before = inner.calls.load(StdOrdering::Relaxed);
        let result = safe.fetch_24h_tickers().await;
        assert!(matches!(result, Err(AdapterError::CircuitOpen { .. })));
        assert_eq!(inner.calls.load(StdOrdering::Relaxed), before);
    }
}
