use crate::slot::SnapshotSlot;
use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scanner_config::ThresholdsConfig;
use scanner_types::{Candidate, CanonicalPair, Direction, Quote, QuoteBook, ScannerError, VenueId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use venue_adapters::VenueRegistry;

/// Joins current top-of-book quotes against the SymbolMap snapshot, computes
/// bidirectional spreads, and enqueues at most one Candidate per canonical
/// pair that clears `MIN_PROFIT_PCT`.
pub async fn run(
    registry: Arc<VenueRegistry>,
    thresholds: ThresholdsConfig,
    slot: SnapshotSlot,
    signal_tx: Sender<Candidate>,
    period: Duration,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        match run_once(&registry, &thresholds, &slot, &signal_tx).await {
            Ok(()) => {}
            Err(ScannerError::EmptySnapshot) => {
                debug!("stage-1 cycle skipped, no symbol map published yet");
            }
            Err(e) => warn!(error = %e, "stage-1 cycle failed unexpectedly"),
        }

        tokio::select! {
            _ = sleep(period) => {}
            _ = cancel.cancelled() => break,
        }
    }
    info!("stage-1 worker exiting");
}

async fn run_once(
    registry: &VenueRegistry,
    thresholds: &ThresholdsConfig,
    slot: &SnapshotSlot,
    signal_tx: &Sender<Candidate>,
) -> Result<(), ScannerError> {
    let snapshot = slot.current();
    if snapshot.is_empty() {
        // No map published yet. A short sleep and retry is handled by the
        // outer cycle cadence; nothing else to do here.
        return Err(ScannerError::EmptySnapshot);
    }

    let fetches = registry
        .adapters()
        .map(|adapter| {
            let adapter = adapter.clone();
            async move {
                let venue = adapter.venue();
                match adapter.fetch_top_of_book().await {
                    Ok(rows) => {
                        let mut book = QuoteBook::new();
                        for (symbol, quote) in rows {
                            book.insert(symbol, quote);
                        }
                        (venue, book)
                    }
                    Err(e) => {
                        let scanner_err = ScannerError::FetchFailure {
                            venue,
                            operation: "fetch_top_of_book",
                            detail: e.to_string(),
                        };
                        warn!(error = %scanner_err, "stage-1 top-of-book fetch failed, treating as empty");
                        (venue, QuoteBook::new())
                    }
                }
            }
        })
        .collect::<Vec<_>>();

    let books: HashMap<VenueId, QuoteBook> = join_all(fetches).await.into_iter().collect();

    let mut emitted = 0usize;
    for pair in snapshot.pairs() {
        let Some(venue_symbols) = snapshot.venues_for(pair) else {
            continue;
        };

        let mut present: Vec<(VenueId, Quote)> = Vec::new();
        for (&venue, native_symbol) in venue_symbols {
            if let Some(book) = books.get(&venue) {
                if let Some(quote) = book.get(native_symbol) {
                    if quote.is_valid() {
                        present.push((venue, *quote));
                    }
                }
            }
        }
        if present.len() < 2 {
            continue;
        }
        present.sort_by_key(|(venue, _)| *venue);

        let mut best: Option<Candidate> = None;
        for i in 0..present.len() {
            for j in (i + 1)..present.len() {
                let (a, a_quote) = present[i];
                let (b, b_quote) = present[j];
                let spread_a2b = pct(b_quote.bid, a_quote.ask);
                let spread_b2a = pct(a_quote.bid, b_quote.ask);
                let (best_spread, direction) = if spread_a2b >= spread_b2a {
                    (spread_a2b, Direction { buy_at: a, sell_at: b })
                } else {
                    (spread_b2a, Direction { buy_at: b, sell_at: a })
                };
                if best_spread < thresholds.min_profit_pct {
                    continue;
                }
                let better = best
                    .as_ref()
                    .map(|c| best_spread > c.best_spread_pct)
                    .unwrap_or(true);
                if better {
                    best = Some(Candidate {
                        pair: pair.clone(),
                        a,
                        b,
                        a_quote,
                        b_quote,
                        spread_a2b_pct: round4(spread_a2b),
                        spread_b2a_pct: round4(spread_b2a),
                        best_direction: direction,
                        best_spread_pct: round4(best_spread),
                        ts_utc: Utc::now(),
                    });
                }
            }
        }

        if let Some(candidate) = best {
            emitted += 1;
            if signal_tx.send(candidate).await.is_err() {
                warn!("signal queue closed, stage-1 stopping emission for this cycle");
                break;
            }
        }
    }

    info!(candidates = emitted, "stage-1 cycle complete");
    Ok(())
}

/// `(sell - buy) / buy * 100`. A zero `buy` disqualifies the side; callers
/// only ever pass validated quote sides, but this stays division-by-zero
/// safe regardless.
fn pct(sell: Decimal, buy: Decimal) -> Decimal {
    if buy <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (sell - buy) / buy * dec!(100)
}

fn round4(value: Decimal) -> Decimal {
    value.round_dp(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_choice_picks_the_larger_spread() {
        let a = Quote {
            bid: dec!(2000),
            ask: dec!(2001),
            bid_size: dec!(1),
            ask_size: dec!(1),
        };
        let b = Quote {
            bid: dec!(2020),
            ask: dec!(2021),
            bid_size: dec!(1),
            ask_size: dec!(1),
        };
        let spread_a2b = pct(b.bid, a.ask);
        let spread_b2a = pct(a.bid, b.ask);
        assert!((spread_a2b - dec!(0.9495)).abs() < dec!(0.001));
        assert!(spread_b2a < Decimal::ZERO);
        assert!(spread_a2b >= thresholds_min_profit());
    }

    fn thresholds_min_profit() -> Decimal {
        dec!(0.5)
    }
}
