use crate::adapter::{TickerRecord, VenueAdapter};
use crate::error::AdapterError;
use crate::http::get_json;
use async_trait::async_trait;
use rust_decimal::Decimal;
use scanner_config::VenueEndpoints;
use scanner_types::{NativeSymbol, OrderBook, Quote, VenueId};
use serde::Deserialize;

/// Binance serves 24h volume and top-of-book from two separate endpoints;
/// neither carries the other's data.
pub struct BinanceAdapter {
    client: reqwest::Client,
    endpoints: VenueEndpoints,
    timeout_ms: u64,
}

impl BinanceAdapter {
    pub fn new(client: reqwest::Client, endpoints: VenueEndpoints, timeout_ms: u64) -> Self {
        Self {
            client,
            endpoints,
            timeout_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Ticker24h {
    symbol: String,
    #[serde(rename = "quoteVolume")]
    quote_volume: String,
}

#[derive(Debug, Deserialize)]
struct BookTicker {
    symbol: String,
    #[serde(rename = "bidPrice")]
    bid_price: String,
    #[serde(rename = "bidQty")]
    bid_qty: String,
    #[serde(rename = "askPrice")]
    ask_price: String,
    #[serde(rename = "askQty")]
    ask_qty: String,
}

#[derive(Debug, Deserialize)]
struct DepthResponse {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

#[async_trait]
impl VenueAdapter for BinanceAdapter {
    fn venue(&self) -> VenueId {
        VenueId::Binance
    }

    async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError> {
        let raw: Vec<Ticker24h> = get_json(
            &self.client,
            self.venue(),
            "fetch_24h_tickers",
            &self.endpoints.tickers_url,
            &[],
            self.timeout_ms,
        )
        .await?;

        Ok(raw
            .into_iter()
            .map(|t| TickerRecord {
                native_symbol: NativeSymbol::new(t.symbol),
                quote_volume_usdt_24h: t.quote_volume.parse().unwrap_or(Decimal::ZERO),
            })
            .collect())
    }

    async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError> {
        let raw: Vec<BookTicker> = get_json(
            &self.client,
            self.venue(),
            "fetch_top_of_book",
            &self.endpoints.book_ticker_url,
            &[],
            self.timeout_ms,
        )
        .await?;

        let mut out = Vec::with_capacity(raw.len());
        for row in raw {
            let (bid, ask, bid_size, ask_size) = match (
                row.bid_price.parse(),
                row.ask_price.parse(),
                row.bid_qty.parse(),
                row.ask_qty.parse(),
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
        let response: DepthResponse = get_json(
            &self.client,
            self.venue(),
            "fetch_order_book",
            &self.endpoints.orderbook_url,
            &[
                ("symbol", symbol.as_str().to_string()),
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
    fn depth_response_maps_bids_and_asks_in_order() {
        let raw = r#"{
            "bids": [["61000.10", "0.5"], ["60999.90", "1.2"]],
            "asks": [["61001.00", "0.3"]]
        }"#;
        let response: DepthResponse = serde_json::from_str(raw).unwrap();
        let book = OrderBook::new(parse_levels(response.bids), parse_levels(response.asks));
        assert_eq!(book.bids, vec![(dec!(61000.10), dec!(0.5)), (dec!(60999.90), dec!(1.2))]);
        assert_eq!(book.asks, vec![(dec!(61001.00), dec!(0.3))]);
    }

    #[test]
    fn ticker_24h_parses_quote_volume() {
        let raw = r#"{"symbol": "BTCUSDT", "quoteVolume": "123456.78"}"#;
        let ticker: Ticker24h = serde_json::from_str(raw).unwrap();
        assert_eq!(ticker.symbol, "BTCUSDT");
        assert_eq!(ticker.quote_volume.parse::<Decimal>().unwrap(), dec!(123456.78));
    }
}
