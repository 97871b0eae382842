//! Configuration management for the spread scanner.
//!
//! Loaded in order: compiled defaults -> optional config file (YAML or JSON,
//! picked by extension) -> environment variable overrides. `validate()` is
//! meant to run once at startup; failures there are fatal.

use rust_decimal::Decimal;
use scanner_types::VenueId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Complete configuration for the scanner pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub thresholds: ThresholdsConfig,
    pub fees: FeesConfig,
    pub venues: VenuesConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
}

/// Thresholds shared by Stage-0, Stage-1 and Stage-2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Minimum 24h quote-volume (USDT) to include a pair from a venue.
    pub min_24h_volume_usdt: Decimal,
    /// Stage-1 gross-spread admission threshold (percent).
    pub min_profit_pct: Decimal,
    /// Stage-2 net-spread confirmation threshold (percent).
    pub target_net_profit_pct: Decimal,
    /// Notional the VWAP walk must be able to fill.
    pub min_execution_notional_usdt: Decimal,
    /// Depth cap for the VWAP walk.
    pub max_book_depth_levels: usize,
    /// Subtracted from the gross net spread as a margin.
    pub safety_fee_buffer_pct: Decimal,
    /// Depth requested from venue order-book endpoints.
    pub orderbook_depth: usize,
}

/// Venue taker-fee table, percent per venue. Venues absent from the map fall
/// back to `default_fee_pct`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeesConfig {
    pub taker_fees: HashMap<VenueId, Decimal>,
    pub default_fee_pct: Decimal,
}

impl FeesConfig {
    pub fn fee_for(&self, venue: VenueId) -> Decimal {
        self.taker_fees
            .get(&venue)
            .copied()
            .unwrap_or(self.default_fee_pct)
    }
}

/// Per-venue base URLs for the three adapter operations. Adapters append
/// their own query parameters; this crate only owns the endpoint location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueEndpoints {
    pub tickers_url: String,
    pub book_ticker_url: String,
    pub orderbook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenuesConfig {
    pub endpoints: HashMap<VenueId, VenueEndpoints>,
    pub request_timeout_ms: u64,
}

impl VenuesConfig {
    pub fn endpoints_for(&self, venue: VenueId) -> Option<&VenueEndpoints> {
        self.endpoints.get(&venue)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub level: String,
    pub spread_signal_log: String,
    pub confirmed_signal_log: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub enabled: bool,
    pub sqlite_path: Option<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdsConfig::default(),
            fees: FeesConfig::default(),
            venues: VenuesConfig::default(),
            logging: LoggingConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            min_24h_volume_usdt: dec!(100_000),
            min_profit_pct: dec!(0.5),
            target_net_profit_pct: dec!(0.2),
            min_execution_notional_usdt: dec!(500),
            max_book_depth_levels: 10,
            safety_fee_buffer_pct: dec!(0.3),
            orderbook_depth: 20,
        }
    }
}

impl Default for FeesConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        let mut taker_fees = HashMap::new();
        taker_fees.insert(VenueId::Binance, dec!(0.10));
        taker_fees.insert(VenueId::Bybit, dec!(0.10));
        taker_fees.insert(VenueId::Okx, dec!(0.10));
        taker_fees.insert(VenueId::Gate, dec!(0.20));
        taker_fees.insert(VenueId::Kucoin, dec!(0.10));
        Self {
            taker_fees,
            default_fee_pct: dec!(0.10),
        }
    }
}

impl Default for VenuesConfig {
    fn default() -> Self {
        let mut endpoints = HashMap::new();
        endpoints.insert(
            VenueId::Binance,
            VenueEndpoints {
                tickers_url: "https://api.binance.com/api/v3/ticker/24hr".to_string(),
                book_ticker_url: "https://api.binance.com/api/v3/ticker/bookTicker".to_string(),
                orderbook_url: "https://api.binance.com/api/v3/depth".to_string(),
            },
        );
        endpoints.insert(
            VenueId::Bybit,
            VenueEndpoints {
                tickers_url: "https://api.bybit.com/v5/market/tickers".to_string(),
                book_ticker_url: "https://api.bybit.com/v5/market/tickers".to_string(),
                orderbook_url: "https://api.bybit.com/v5/market/orderbook".to_string(),
            },
        );
        endpoints.insert(
            VenueId::Okx,
            VenueEndpoints {
                tickers_url: "https://www.okx.com/api/v5/market/tickers".to_string(),
                book_ticker_url: "https://www.okx.com/api/v5/market/tickers".to_string(),
                orderbook_url: "https://www.okx.com/api/v5/market/books".to_string(),
            },
        );
        endpoints.insert(
            VenueId::Gate,
            VenueEndpoints {
                tickers_url: "https://api.gateio.ws/api/v4/spot/tickers".to_string(),
                book_ticker_url: "https://api.gateio.ws/api/v4/spot/tickers".to_string(),
                orderbook_url: "https://api.gateio.ws/api/v4/spot/order_book".to_string(),
            },
        );
        endpoints.insert(
            VenueId::Kucoin,
            VenueEndpoints {
                tickers_url: "https://api.kucoin.com/api/v1/market/allTickers".to_string(),
                book_ticker_url: "https://api.kucoin.com/api/v1/market/allTickers".to_string(),
                orderbook_url: "https://api.kucoin.com/api/v1/market/orderbook/level2_20"
                    .to_string(),
            },
        );
        Self {
            endpoints,
            request_timeout_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            level: "info".to_string(),
            spread_signal_log: "spread_signals.csv".to_string(),
            confirmed_signal_log: "confirmed_signals.csv".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sqlite_path: None,
        }
    }
}

impl ScannerConfig {
    /// Load configuration from a file, picking the format by extension
    /// (`.yaml`/`.yml` or `.json`).
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
            _ => serde_json::from_str(&contents)?,
        };
        Ok(config)
    }

    /// Load configuration from environment variables layered on top of the
    /// compiled defaults. Uses the `SCANNER_` prefix throughout.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("SCANNER_MIN_24H_VOLUME_USDT") {
            if let Ok(parsed) = value.parse() {
                config.thresholds.min_24h_volume_usdt = parsed;
            }
        }
        if let Ok(value) = std::env::var("SCANNER_MIN_PROFIT_PCT") {
            if let Ok(parsed) = value.parse() {
                config.thresholds.min_profit_pct = parsed;
            }
        }
        if let Ok(value) = std::env::var("SCANNER_TARGET_NET_PROFIT_PCT") {
            if let Ok(parsed) = value.parse() {
                config.thresholds.target_net_profit_pct = parsed;
            }
        }
        if let Ok(value) = std::env::var("SCANNER_MIN_EXECUTION_NOTIONAL_USDT") {
            if let Ok(parsed) = value.parse() {
                config.thresholds.min_execution_notional_usdt = parsed;
            }
        }
        if let Ok(value) = std::env::var("SCANNER_MAX_BOOK_DEPTH_LEVELS") {
            if let Ok(parsed) = value.parse() {
                config.thresholds.max_book_depth_levels = parsed;
            }
        }
        if let Ok(value) = std::env::var("SCANNER_SAFETY_FEE_BUFFER_PCT") {
            if let Ok(parsed) = value.parse() {
                config.thresholds.safety_fee_buffer_pct = parsed;
            }
        }
        if let Ok(value) = std::env::var("SCANNER_ORDERBOOK_DEPTH") {
            if let Ok(parsed) = value.parse() {
                config.thresholds.orderbook_depth = parsed;
            }
        }
        if let Ok(value) = std::env::var("SCANNER_LOG_DIR") {
            config.logging.log_dir = value;
        }
        if let Ok(value) = std::env::var("SCANNER_DB_PATH") {
            config.store.enabled = true;
            config.store.sqlite_path = Some(value);
        }

        config
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let serialized = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Validate the configuration. Fatal failures here must abort startup
    /// with a non-zero exit code.
    pub fn validate(&self) -> anyhow::Result<()> {
        let t = &self.thresholds;
        if t.min_24h_volume_usdt < Decimal::ZERO {
            anyhow::bail!("min_24h_volume_usdt must be non-negative");
        }
        if t.min_profit_pct <= Decimal::ZERO {
            anyhow::bail!("min_profit_pct must be positive");
        }
        if t.target_net_profit_pct <= Decimal::ZERO {
            anyhow::bail!("target_net_profit_pct must be positive");
        }
        if t.min_execution_notional_usdt <= Decimal::ZERO {
            anyhow::bail!("min_execution_notional_usdt must be positive");
        }
        if t.max_book_depth_levels == 0 {
            anyhow::bail!("max_book_depth_levels must be positive");
        }
        if t.safety_fee_buffer_pct < Decimal::ZERO {
            anyhow::bail!("safety_fee_buffer_pct must be non-negative");
        }
        if t.orderbook_depth < t.max_book_depth_levels {
            anyhow::bail!("orderbook_depth must be >= max_book_depth_levels");
        }

        if self.fees.default_fee_pct < Decimal::ZERO {
            anyhow::bail!("default_fee_pct must be non-negative");
        }
        for (venue, fee) in &self.fees.taker_fees {
            if *fee < Decimal::ZERO {
                anyhow::bail!("taker fee for {venue} must be non-negative");
            }
        }

        if self.venues.endpoints.is_empty() {
            anyhow::bail!("at least one venue endpoint must be configured");
        }
        if self.venues.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be positive");
        }

        if self.store.enabled && self.store.sqlite_path.is_none() {
            anyhow::bail!("store.enabled requires store.sqlite_path to be set");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = ScannerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fee_lookup_falls_back_to_default() {
        let mut fees = FeesConfig::default();
        fees.taker_fees.remove(&VenueId::Gate);
        assert_eq!(fees.fee_for(VenueId::Gate), fees.default_fee_pct);
    }

    #[test]
    fn json_round_trip_preserves_thresholds() {
        let config = ScannerConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        config.save_to_file(&path).unwrap();
        let loaded = ScannerConfig::from_file(&path).unwrap();
        assert_eq!(
            config.thresholds.min_profit_pct,
            loaded.thresholds.min_profit_pct
        );
    }

    #[test]
    fn yaml_round_trip_preserves_thresholds() {
        let config = ScannerConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        config.save_to_file(&path).unwrap();
        let loaded = ScannerConfig::from_file(&path).unwrap();
        assert_eq!(
            config.thresholds.orderbook_depth,
            loaded.thresholds.orderbook_depth
        );
    }

    #[test]
    fn env_override_applies_on_top_of_defaults() {
        std::env::set_var("SCANNER_MIN_PROFIT_PCT", "1.25");
        std::env::set_var("SCANNER_DB_PATH", "/tmp/scanner-test.db");

        let config = ScannerConfig::from_env();

        assert_eq!(
            config.thresholds.min_profit_pct,
            "1.25".parse::<Decimal>().unwrap()
        );
        assert!(config.store.enabled);
        assert_eq!(config.store.sqlite_path.as_deref(), Some("/tmp/scanner-test.db"));

        std::env::remove_var("SCANNER_MIN_PROFIT_PCT");
        std::env::remove_var("SCANNER_DB_PATH");
    }

    #[test]
    fn rejects_orderbook_depth_smaller_than_walk_depth() {
        let mut config = ScannerConfig::default();
        config.thresholds.orderbook_depth = 1;
        config.thresholds.max_book_depth_levels = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_enabled_store_without_path() {
        let mut config = ScannerConfig::default();
        config.store.enabled = true;
        config.store.sqlite_path = None;
        assert!(config.validate().is_err());
    }
}
