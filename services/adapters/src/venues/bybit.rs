use crate::adapter::{TickerRecord, VenueAdapter};
use crate::error::AdapterError;
use crate::http::get_json;
use async_trait::async_trait;
use rust_decimal::Decimal;
use scanner_config::VenueEndpoints;
use scanner_types::{NativeSymbol, OrderBook, Quote, VenueId};
use serde::Deserialize;

/// Bybit's spot-category ticker endpoint serves 24h volume and top-of-book
/// together; both trait methods hit the same underlying call.
pub struct BybitAdapter {
    client: reqwest::Client,
    endpoints: VenueEndpoints,
    timeout_ms: u64,
}

impl BybitAdapter {
    pub fn new(client: reqwest::Client, endpoints: VenueEndpoints, timeout_ms: u64) -> Self {
        Self {
            client,
            endpoints,
            timeout_ms,
        }
    }

    async fn fetch_tickers(&self, operation: &'static str) -> Result<Vec<TickerRow>, AdapterError> {
        let response: TickersResponse = get_json(
            &self.client,
            self.venue(),
            operation,
            &self.endpoints.tickers_url,
            &[("category", "spot".to_string())],
            self.timeout_ms,
        )
        .await?;
        Ok(response.result.list)
    }
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    result: TickersResult,
}

#[derive(Debug, Deserialize)]
struct TickersResult {
    list: Vec<TickerRow>,
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    symbol: String,
    turnover24h: String,
    #[serde(rename = "bid1Price")]
    bid1_price: String,
    #[serde(rename = "ask1Price")]
    ask1_price: String,
    #[serde(rename = "bid1Size")]
    bid1_size: String,
    #[serde(rename = "ask1Size")]
    ask1_size: String,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    result: OrderBookResult,
}

#[derive(Debug, Deserialize)]
struct OrderBookResult {
    b: Vec<[String; 2]>,
    a: Vec<[String; 2]>,
}

#[async_trait]
impl VenueAdapter for BybitAdapter {
    fn venue(&self) -> VenueId {
        VenueId::Bybit
    }

    async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError> {
        let rows = self.fetch_tickers("fetch_24h_tickers").await?;
        Ok(rows
            .into_iter()
            .map(|row| TickerRecord {
                native_symbol: NativeSymbol::new(row.symbol),
                quote_volume_usdt_24h: row.turnover24h.parse().unwrap_or(Decimal::ZERO),
            })
            .collect())
    }

    async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError> {
        let rows = self.fetch_tickers("fetch_top_of_book").await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let (bid, ask, bid_size, ask_size) = match (
                row.bid1_price.parse(),
                row.ask1_price.parse(),
                row.bid1_size.parse(),
                row.ask1_size.parse(),
            ) {
                (Ok(bid), Ok(ask), Ok(bid_size), Ok(ask_size)) => (bid, ask, bid_size, ask_size),
                _ => continue,
            };
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
            &[
                ("category", "spot".to_string()),
                ("symbol", symbol.as_str().to_string()),
                ("limit", depth.to_string()),
            ],
            self.timeout_ms,
        )
        .await?;

        Ok(OrderBook::new(
            parse_levels(response.result.b),
            parse_levels(response.result.a),
        ))
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

    #[test]
    fn order_book_response_maps_bids_from_b_and_asks_from_a() {
        let raw = r#"{
            "result": {
                "b": [["27000.5", "2.0"]],
                "a": [["27001.0", "1.0"]]
            }
        }"#;
        let response: OrderBookResponse = serde_json::from_str(raw).unwrap();
        let book = OrderBook::new(
            parse_levels(response.result.b),
            parse_levels(response.result.a),
        );
        assert_eq!(book.bids, vec![(dec!(27000.5), dec!(2.0))]);
        assert_eq!(book.asks, vec![(dec!(27001.0), dec!(1.0))]);
    }

    #[test]
    fn ticker_row_maps_turnover_and_top_of_book_fields() {
        let raw = r#"{
            "symbol": "BTCUSDT",
            "turnover24h": "9988776.5",
            "bid1Price": "27000.0",
            "ask1Price": "27001.0",
            "bid1Size": "3.0",
            "ask1Size": "1.5"
        }"#;
        let row: TickerRow = serde_json::from_str(raw).unwrap();
        assert_eq!(row.turnover24h.parse::<Decimal>().unwrap(), dec!(9988776.5));
        assert_eq!(row.bid1_price, "27000.0");
        assert_eq!(row.ask1_price, "27001.0");
    }
}
