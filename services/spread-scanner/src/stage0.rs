use crate::slot::SnapshotSlot;
use futures::future::join_all;
use scanner_config::ThresholdsConfig;
use scanner_types::{canonicalize, ScannerError, SymbolMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use venue_adapters::VenueRegistry;

/// Builds the cross-venue symbol map from 24h tickers and publishes it to
/// the shared slot on a fixed cadence. Any venue that fails contributes
/// nothing this cycle; partial snapshots are expected and acceptable.
pub async fn run(
    registry: Arc<VenueRegistry>,
    thresholds: ThresholdsConfig,
    slot: SnapshotSlot,
    period: Duration,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        if let Err(e) = run_once(&registry, &thresholds, &slot).await {
            warn!(error = %e, "stage-0 cycle failed unexpectedly");
        }

        tokio::select! {
            _ = sleep(period) => {}
            _ = cancel.cancelled() => break,
        }
    }
    info!("stage-0 worker exiting");
}

async fn run_once(
    registry: &VenueRegistry,
    thresholds: &ThresholdsConfig,
    slot: &SnapshotSlot,
) -> anyhow::Result<()> {
    let fetches = registry
        .adapters()
        .map(|adapter| {
            let adapter = adapter.clone();
            async move {
                let venue = adapter.venue();
                match adapter.fetch_24h_tickers().await {
                    Ok(records) => Some((venue, records)),
                    Err(e) => {
                        let scanner_err = ScannerError::FetchFailure {
                            venue,
                            operation: "fetch_24h_tickers",
                            detail: e.to_string(),
                        };
                        warn!(error = %scanner_err, "stage-0 ticker fetch failed, skipping venue this cycle");
                        None
                    }
                }
            }
        })
        .collect::<Vec<_>>();

    let results = join_all(fetches).await;

    let mut map = SymbolMap::new();
    let mut surviving = 0usize;
    for (venue, records) in results.into_iter().flatten() {
        for record in records {
            if record.quote_volume_usdt_24h < thresholds.min_24h_volume_usdt {
                continue;
            }
            let Some(pair) = canonicalize(record.native_symbol.as_str()) else {
                continue;
            };
            map.set(pair, venue, record.native_symbol);
            surviving += 1;
        }
    }

    info!(pairs = map.len(), records = surviving, "stage-0 snapshot published");
    slot.publish(map);
    Ok(())
}
