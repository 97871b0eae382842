use crate::adapter::{TickerRecord, VenueAdapter};
use crate::error::AdapterError;
use crate::http::get_json;
use async_trait::async_trait;
use rust_decimal::Decimal;
use scanner_config::VenueEndpoints;
use scanner_types::{NativeSymbol, OrderBook, Quote, VenueId};
use serde::Deserialize;

pub struct KucoinAdapter {
    client: reqwest::Client,
    endpoints: VenueEndpoints,
    timeout_ms: u64,
}

impl KucoinAdapter {
    pub fn new(client: reqwest::Client, endpoints: VenueEndpoints, timeout_ms: u64) -> Self {
        Self {
            client,
            endpoints,
            timeout_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    data: TickersData,
}

#[derive(Debug, Deserialize)]
struct TickersData {
    ticker: Vec<TickerRow>,
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    symbol: String,
    // `buy`/`sell` are JSON null, not merely absent, for an inactive market.
    buy: Option<String>,
    sell: Option<String>,
    #[serde(rename = "bestBidSize")]
    best_bid_size: Option<String>,
    #[serde(rename = "bestAskSize")]
    best_ask_size: Option<String>,
    #[serde(rename = "volValue")]
    vol_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    data: OrderBookData,
}

#[derive(Debug, Deserialize)]
struct OrderBookData {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

#[async_trait]
impl VenueAdapter for KucoinAdapter {
    fn venue(&self) -> VenueId {
        VenueId::Kucoin
    }

    async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError> {
        let response: TickersResponse = get_json(
            &self.client,
            self.venue(),
            "fetch_24h_tickers",
            &self.endpoints.tickers_url,
            &[],
            self.timeout_ms,
        )
        .await?;

        Ok(response
            .data
            .ticker
            .into_iter()
            .map(|row| {
                let volume = row
                    .vol_value
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(Decimal::ZERO);
                TickerRecord {
                    native_symbol: NativeSymbol::new(row.symbol),
                    quote_volume_usdt_24h: volume,
                }
            })
            .collect())
    }

    async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError> {
        let response: TickersResponse = get_json(
            &self.client,
            self.venue(),
            "fetch_top_of_book",
            &self.endpoints.tickers_url,
            &[],
            self.timeout_ms,
        )
        .await?;

        let mut out = Vec::with_capacity(response.data.ticker.len());
        for row in response.data.ticker {
            let (Some(buy), Some(sell)) = (row.buy, row.sell) else {
                continue;
            };
            let (bid, ask) = match (buy.parse(), sell.parse()) {
                (Ok(bid), Ok(ask)) => (bid, ask),
                _ => continue,
            };
            let bid_size = row
                .best_bid_size
                .and_then(|v| v.parse().ok())
                .unwrap_or(Decimal::ZERO);
            let ask_size = row
                .best_ask_size
                .and_then(|v| v.parse().ok())
                .unwrap_or(Decimal::ZERO);
            let quote = Quote {
                bid,
                ask,
                bid_size,
                ask_size,
            };
            if quote.is_valid() {
                out.push((NativeSymbol::new(row.symbol), quote));
            }
        }
        Ok(out)
    }

    async fn fetch_order_book(
        &self,
        symbol: &NativeSymbol,
        depth: usize,
    ) -> Result<OrderBook, AdapterError> {
        let response: OrderBookResponse = get_json(
            &self.client,
            self.venue(),
            "fetch_order_book",
            &self.endpoints.orderbook_url,
            &[("symbol", symbol.as_str().to_string())],
            self.timeout_ms,
        )
        .await?;

        let mut bids = parse_levels(response.data.bids);
        let mut asks = parse_levels(response.data.asks);
        bids.truncate(depth);
        asks.truncate(depth);
        Ok(OrderBook::new(bids, asks))
    }
}

fn parse_levels(levels: Vec<[String; 2]>) -> Vec<(Decimal, Decimal)> {
    levels
        .into_iter()
        .filter_map(|[price, qty]| Some((price.parse().ok()?, qty.parse().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// `buy`/`sell` arrive as JSON `null`, not absent keys, for a market with
    /// no active quote; that must deserialize to `None` and be filtered out
    /// rather than failing to parse or falling back to zero.
    #[test]
    fn ticker_row_treats_null_buy_sell_as_inactive() {
        let raw = r#"{
            "symbol": "DEADUSDT",
            "buy": null,
            "sell": null,
            "bestBidSize": null,
            "bestAskSize": null,
            "volValue": "0"
        }"#;
        let row: TickerRow = serde_json::from_str(raw).unwrap();
        assert!(row.buy.is_none());
        assert!(row.sell.is_none());

        let tickers_data = TickersData { ticker: vec![row] };
        let mut out = Vec::new();
        for row in tickers_data.ticker {
            let (Some(buy), Some(sell)) = (row.buy, row.sell) else {
                continue;
            };
            out.push((buy, sell));
        }
        assert!(out.is_empty());
    }

    #[test]
    fn ticker_row_with_active_quote_parses_bid_ask() {
        let raw = r#"{
            "symbol": "BTCUSDT",
            "buy": "61000.0",
            "sell": "61001.0",
            "bestBidSize": "2.0",
            "bestAskSize": "1.0",
            "volValue": "500000"
        }"#;
        let row: TickerRow = serde_json::from_str(raw).unwrap();
        assert_eq!(row.buy.unwrap().parse::<Decimal>().unwrap(), dec!(61000.0));
        assert_eq!(row.sell.unwrap().parse::<Decimal>().unwrap(), dec!(61001.0));
    }

    #[test]
    fn order_book_data_maps_bids_and_asks_and_truncates_to_depth() {
        let raw = r#"{
            "data": {
                "bids": [["61000.0", "1.0"], ["60999.0", "2.0"]],
                "asks": [["61001.0", "1.5"]]
            }
        }"#;
        let response: OrderBookResponse = serde_json::from_str(raw).unwrap();
        let mut bids = parse_levels(response.data.bids);
        let asks = parse_levels(response.data.asks);
        bids.truncate(1);
        assert_eq!(bids, vec![(dec!(61000.0), dec!(1.0))]);
        assert_eq!(asks, vec![(dec!(61001.0), dec!(1.5))]);
    }
}
