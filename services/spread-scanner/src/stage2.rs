use crate::fees::{apply_buy_fee, apply_sell_fee, net_spread_pct};
use crate::vwap;
use chrono::Utc;
use rust_decimal::Decimal;
use scanner_config::{FeesConfig, ThresholdsConfig};
use scanner_types::{
    native_symbol_for, Candidate, DepthResult, DepthStatus, NativeSymbol, OrderBook,
    RejectReason, ScannerError, Side, VenueId,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use venue_adapters::VenueRegistry;

const BATCH_WINDOW: Duration = Duration::from_millis(250);
const BATCH_MAX: usize = 32;

/// Shared so the receiver survives a supervised restart of this worker: the
/// queue itself outlives any single generation of the stage-2 loop.
pub type SharedSignalReceiver = Arc<Mutex<Receiver<Candidate>>>;

/// Consumes Candidates from the signal queue in small batches, validates
/// each against live order books, and emits DepthResults.
pub async fn run(
    registry: Arc<VenueRegistry>,
    thresholds: ThresholdsConfig,
    fees: FeesConfig,
    signal_rx: SharedSignalReceiver,
    result_tx: Sender<DepthResult>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let mut rx = signal_rx.lock().await;
        let mut batch = Vec::with_capacity(BATCH_MAX);
        tokio::select! {
            maybe = rx.recv() => {
                match maybe {
                    Some(candidate) => batch.push(candidate),
                    None => break, // producer side closed, no more work will arrive
                }
            }
            _ = cancel.cancelled() => break,
        }

        // Drain whatever else is immediately available, up to a small cap,
        // so order-book fetches can be deduplicated across the batch.
        let deadline = tokio::time::Instant::now() + BATCH_WINDOW;
        while batch.len() < BATCH_MAX {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(candidate)) => batch.push(candidate),
                _ => break,
            }
        }
        drop(rx);

        let results = process_batch(&registry, &thresholds, &fees, batch).await;
        for result in results {
            if result_tx.send(result).await.is_err() {
                warn!("depth-result sink closed, stage-2 stopping emission for this cycle");
                break;
            }
        }
    }
    info!("stage-2 worker exiting");
}

async fn process_batch(
    registry: &VenueRegistry,
    thresholds: &ThresholdsConfig,
    fees: &FeesConfig,
    candidates: Vec<Candidate>,
) -> Vec<DepthResult> {
    // Dedup the distinct (venue, native_symbol) pairs needed before fetching,
    // so the same order book is never requested twice in one round.
    let mut needed: HashMap<(VenueId, NativeSymbol), ()> = HashMap::new();
    for candidate in &candidates {
        let buy_symbol = native_symbol_for(&candidate.pair, candidate.buy_venue());
        let sell_symbol = native_symbol_for(&candidate.pair, candidate.sell_venue());
        needed.insert((candidate.buy_venue(), buy_symbol), ());
        needed.insert((candidate.sell_venue(), sell_symbol), ());
    }

    let mut books: HashMap<(VenueId, NativeSymbol), OrderBook> = HashMap::new();
    let mut fetches = Vec::with_capacity(needed.len());
    for (venue, symbol) in needed.into_keys() {
        if let Some(adapter) = registry.get(venue) {
            let adapter = adapter.clone();
            let depth = thresholds.orderbook_depth;
            fetches.push(async move {
                let result = adapter.fetch_order_book(&symbol, depth).await;
                (venue, symbol, result)
            });
        }
    }
    for (venue, symbol, result) in futures::future::join_all(fetches).await {
        match result {
            Ok(book) => {
                books.insert((venue, symbol), book);
            }
            Err(e) => {
                warn!(%venue, %symbol, error = %e, "stage-2 order-book fetch failed");
            }
        }
    }

    candidates
        .into_iter()
        .map(|candidate| evaluate(&candidate, &books, thresholds, fees))
        .collect()
}

fn evaluate(
    candidate: &Candidate,
    books: &HashMap<(VenueId, NativeSymbol), OrderBook>,
    thresholds: &ThresholdsConfig,
    fees: &FeesConfig,
) -> DepthResult {
    let buy_venue = candidate.buy_venue();
    let sell_venue = candidate.sell_venue();
    let buy_symbol = native_symbol_for(&candidate.pair, buy_venue);
    let sell_symbol = native_symbol_for(&candidate.pair, sell_venue);

    let buy_book = books.get(&(buy_venue, buy_symbol));
    let sell_book = books.get(&(sell_venue, sell_symbol));

    let (Some(buy_book), Some(sell_book)) = (buy_book, sell_book) else {
        warn!(
            error = %ScannerError::EmptyOrderBook { venue: buy_venue },
            pair = %candidate.pair,
            "stage-2 rejecting candidate, order book missing"
        );
        return reject(candidate, RejectReason::FetchFailedOrEmptyOrderbook);
    };
    if buy_book.is_empty_side(Side::Asks) || sell_book.is_empty_side(Side::Bids) {
        let empty_venue = if buy_book.is_empty_side(Side::Asks) {
            buy_venue
        } else {
            sell_venue
        };
        warn!(
            error = %ScannerError::EmptyOrderBook { venue: empty_venue },
            pair = %candidate.pair,
            "stage-2 rejecting candidate, order book side empty"
        );
        return reject(candidate, RejectReason::FetchFailedOrEmptyOrderbook);
    }

    let want = thresholds.min_execution_notional_usdt;
    let max_levels = thresholds.max_book_depth_levels;

    let Some(exec_buy_price) = vwap::walk(&buy_book.asks, want, max_levels) else {
        warn!(error = %ScannerError::InsufficientDepth, pair = %candidate.pair, "stage-2 rejecting candidate");
        return reject(candidate, RejectReason::InsufficientDepth);
    };
    let Some(exec_sell_price) = vwap::walk(&sell_book.bids, want, max_levels) else {
        warn!(error = %ScannerError::InsufficientDepth, pair = %candidate.pair, "stage-2 rejecting candidate");
        return reject(candidate, RejectReason::InsufficientDepth);
    };

    let effective_buy = apply_buy_fee(exec_buy_price, fees.fee_for(buy_venue));
    let effective_sell = apply_sell_fee(exec_sell_price, fees.fee_for(sell_venue));
    let net = net_spread_pct(effective_buy, effective_sell, thresholds.safety_fee_buffer_pct);

    if net < thresholds.target_net_profit_pct {
        warn!(error = %ScannerError::SpreadVanished, pair = %candidate.pair, "stage-2 rejecting candidate");
        return DepthResult {
            candidate: candidate.clone(),
            status: DepthStatus::Rejected,
            reason: Some(RejectReason::SpreadAfterFeesTooLow),
            exec_buy_price: Some(exec_buy_price),
            exec_sell_price: Some(exec_sell_price),
            exec_spread_pct_net: Some(net),
            ts_utc: Utc::now(),
        };
    }

    DepthResult {
        candidate: candidate.clone(),
        status: DepthStatus::Confirmed,
        reason: None,
        exec_buy_price: Some(exec_buy_price),
        exec_sell_price: Some(exec_sell_price),
        exec_spread_pct_net: Some(net),
        ts_utc: Utc::now(),
    }
}

fn reject(candidate: &Candidate, reason: RejectReason) -> DepthResult {
    DepthResult {
        candidate: candidate.clone(),
        status: DepthStatus::Rejected,
        reason: Some(reason),
        exec_buy_price: None,
        exec_sell_price: None,
        exec_spread_pct_net: None,
        ts_utc: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use scanner_types::{canonicalize, Direction, Quote};

    fn sample_candidate() -> Candidate {
        let pair = canonicalize("BTCUSDT").unwrap();
        let quote = Quote {
            bid: dec!(100),
            ask: dec!(101),
            bid_size: dec!(1),
            ask_size: dec!(1),
        };
        Candidate {
            pair,
            a: VenueId::Binance,
            b: VenueId::Bybit,
            a_quote: quote,
            b_quote: quote,
            spread_a2b_pct: dec!(1.0),
            spread_b2a_pct: dec!(0.0),
            best_direction: Direction {
                buy_at: VenueId::Binance,
                sell_at: VenueId::Bybit,
            },
            best_spread_pct: dec!(1.0),
            ts_utc: Utc::now(),
        }
    }

    #[test]
    fn rejects_when_a_book_is_missing() {
        let candidate = sample_candidate();
        let books = HashMap::new();
        let thresholds = ThresholdsConfig {
            min_24h_volume_usdt: dec!(0),
            min_profit_pct: dec!(0.5),
            target_net_profit_pct: dec!(0.2),
            min_execution_notional_usdt: dec!(500),
            max_book_depth_levels: 10,
            safety_fee_buffer_pct: dec!(0.3),
            orderbook_depth: 20,
        };
        let fees = FeesConfig {
            taker_fees: HashMap::new(),
            default_fee_pct: dec!(0.1),
        };
        let result = evaluate(&candidate, &books, &thresholds, &fees);
        assert_eq!(result.status, DepthStatus::Rejected);
        assert_eq!(result.reason, Some(RejectReason::FetchFailedOrEmptyOrderbook));
    }

    #[test]
    fn confirms_when_depth_and_fees_clear_the_bar() {
        let candidate = sample_candidate();
        let buy_symbol = native_symbol_for(&candidate.pair, VenueId::Binance);
        let sell_symbol = native_symbol_for(&candidate.pair, VenueId::Bybit);

        let mut books = HashMap::new();
        books.insert(
            (VenueId::Binance, buy_symbol),
            OrderBook::new(vec![], vec![(dec!(100), dec!(50))]),
        );
        books.insert(
            (VenueId::Bybit, sell_symbol),
            OrderBook::new(vec![(dec!(100.8), dec!(50))], vec![]),
        );

        let thresholds = ThresholdsConfig {
            min_24h_volume_usdt: dec!(0),
            min_profit_pct: dec!(0.5),
            target_net_profit_pct: dec!(0.2),
            min_execution_notional_usdt: dec!(500),
            max_book_depth_levels: 10,
            safety_fee_buffer_pct: dec!(0.3),
            orderbook_depth: 20,
        };
        let mut taker_fees = HashMap::new();
        taker_fees.insert(VenueId::Binance, dec!(0.10));
        taker_fees.insert(VenueId::Bybit, dec!(0.10));
        let fees = FeesConfig {
            taker_fees,
            default_fee_pct: dec!(0.10),
        };

        let result = evaluate(&candidate, &books, &thresholds, &fees);
        assert_eq!(result.status, DepthStatus::Confirmed);
        assert!(result.exec_spread_pct_net.unwrap() >= dec!(0.20));
    }
}
