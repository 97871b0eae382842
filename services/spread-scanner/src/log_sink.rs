use anyhow::Context;
use scanner_types::{Candidate, DepthResult};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Append-only CSV writer for the spread-signal log. One writer per file is
/// enough in practice; the mutex only serializes the write of a single row.
pub struct SpreadSignalLog {
    writer: Arc<Mutex<csv::Writer<std::fs::File>>>,
}

impl SpreadSignalLog {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let exists = path.exists();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening spread-signal log at {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !exists {
            writer.write_record([
                "ts_utc",
                "pair",
                "direction",
                "buy_exchange",
                "sell_exchange",
                "buy_price",
                "sell_price",
                "spread_pct",
            ])?;
            writer.flush()?;
        }
        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
        })
    }

    pub async fn append(&self, candidate: &Candidate) -> anyhow::Result<()> {
        let direction = format!("{}_to_{}", candidate.buy_venue(), candidate.sell_venue());
        let mut writer = self.writer.lock().await;
        writer.write_record([
            candidate.ts_utc.to_rfc3339(),
            candidate.pair.to_string(),
            direction,
            candidate.buy_venue().to_string(),
            candidate.sell_venue().to_string(),
            candidate.buy_price().to_string(),
            candidate.sell_price().to_string(),
            candidate.best_spread_pct.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

/// Append-only CSV writer for the confirmed-signal log.
pub struct ConfirmedSignalLog {
    writer: Arc<Mutex<csv::Writer<std::fs::File>>>,
}

impl ConfirmedSignalLog {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let exists = path.exists();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening confirmed-signal log at {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !exists {
            writer.write_record([
                "ts_utc",
                "pair",
                "direction",
                "buy_exchange",
                "sell_exchange",
                "exec_notional_usdt",
                "exec_buy_price",
                "exec_sell_price",
                "exec_spread_pct",
            ])?;
            writer.flush()?;
        }
        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
        })
    }

    pub async fn append(
        &self,
        result: &DepthResult,
        exec_notional_usdt: rust_decimal::Decimal,
    ) -> anyhow::Result<()> {
        if !result.is_confirmed() {
            return Ok(());
        }
        let candidate = &result.candidate;
        let direction = format!("{}_to_{}", candidate.buy_venue(), candidate.sell_venue());
        let mut writer = self.writer.lock().await;
        writer.write_record([
            result.ts_utc.to_rfc3339(),
            candidate.pair.to_string(),
            direction,
            candidate.buy_venue().to_string(),
            candidate.sell_venue().to_string(),
            exec_notional_usdt.to_string(),
            result.exec_buy_price.map(|v| v.to_string()).unwrap_or_default(),
            result.exec_sell_price.map(|v| v.to_string()).unwrap_or_default(),
            result
                .exec_spread_pct_net
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ])?;
        writer.flush()?;
        info!(pair = %candidate.pair, "confirmed signal logged");
        Ok(())
    }
}
