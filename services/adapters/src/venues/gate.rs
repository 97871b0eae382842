use crate::adapter::{TickerRecord, VenueAdapter};
use crate::error::AdapterError;
use crate::http::get_json;
use async_trait::async_trait;
use rust_decimal::Decimal;
use scanner_config::VenueEndpoints;
use scanner_types::{NativeSymbol, OrderBook, Quote, VenueId};
use serde::Deserialize;

pub struct GateAdapter {
    client: reqwest::Client,
    endpoints: VenueEndpoints,
    timeout_ms: u64,
}

impl GateAdapter {
    pub fn new(client: reqwest::Client, endpoints: VenueEndpoints, timeout_ms: u64) -> Self {
        Self {
            client,
            endpoints,
            timeout_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    currency_pair: String,
    highest_bid: String,
    lowest_ask: String,
    quote_volume: String,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

#[async_trait]
impl VenueAdapter for GateAdapter {
    fn venue(&self) -> VenueId {
        VenueId::Gate
    }

    async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError> {
        let rows: Vec<TickerRow> = get_json(
            &self.client,
            self.venue(),
            "fetch_24h_tickers",
            &self.endpoints.tickers_url,
            &[],
            self.timeout_ms,
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TickerRecord {
                native_symbol: NativeSymbol::new(row.currency_pair),
                quote_volume_usdt_24h: row.quote_volume.parse().unwrap_or(Decimal::ZERO),
            })
            .collect())
    }

    async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError> {
        let rows: Vec<TickerRow> = get_json(
            &self.client,
            self.venue(),
            "fetch_top_of_book",
            &self.endpoints.tickers_url,
            &[],
            self.timeout_ms,
        )
        .await?;

        // Gate returns empty bid/ask strings for inactive markets; these are
        // dropped here rather than passed through as a spurious zero.
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if row.highest_bid.is_empty() || row.lowest_ask.is_empty() {
                continue;
            }
            let (bid, ask) = match (row.highest_bid.parse(), row.lowest_ask.parse()) {
                (Ok(bid), Ok(ask)) => (bid, ask),
                _ => continue,
            };
            let quote = Quote {
                bid,
                ask,
                bid_size: Decimal::ZERO,
                ask_size: Decimal::ZERO,
            };
            if quote.is_valid() {
                out.push((NativeSymbol::new(row.currency_pair), quote));
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
                ("currency_pair", symbol.as_str().to_string()),
                ("limit", depth.to_string()),
            ],
            self.timeout_ms,
        )
        .await?;

        Ok(OrderBook::new(
            parse_levels(response.bids),
            parse_levels(response.asks),
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
    fn order_book_response_maps_bids_and_asks() {
        let raw = r#"{
            "bids": [["0.5321", "100"]],
            "asks": [["0.5330", "50"]]
        }"#;
        let response: OrderBookResponse = serde_json::from_str(raw).unwrap();
        let book = OrderBook::new(parse_levels(response.bids), parse_levels(response.asks));
        assert_eq!(book.bids, vec![(dec!(0.5321), dec!(100))]);
        assert_eq!(book.asks, vec![(dec!(0.5330), dec!(50))]);
    }

    #[test]
    fn ticker_row_with_empty_bid_ask_strings_is_still_deserializable() {
        let raw = r#"{
            "currency_pair": "ETH_USDT",
            "highest_bid": "",
            "lowest_ask": "",
            "quote_volume": "0"
        }"#;
        let row: TickerRow = serde_json::from_str(raw).unwrap();
        assert!(row.highest_bid.is_empty());
        assert!(row.lowest_ask.is_empty());
    }

    #[test]
    fn ticker_row_maps_quote_volume() {
        let raw = r#"{
            "currency_pair": "BTC_USDT",
            "highest_bid": "61000.0",
            "lowest_ask": "61001.0",
            "quote_volume": "998877.5"
        }"#;
        let row: TickerRow = serde_json::from_str(raw).unwrap();
        assert_eq!(row.quote_volume.parse::<Decimal>().unwrap(), dec!(998877.5));
    }
}
