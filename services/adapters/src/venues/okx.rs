use crate::adapter::{TickerRecord, VenueAdapter};
use crate::error::AdapterError;
use crate::http::get_json;
use async_trait::async_trait;
use rust_decimal::Decimal;
use scanner_config::VenueEndpoints;
use scanner_types::{NativeSymbol, OrderBook, Quote, VenueId};
use serde::Deserialize;

pub struct OkxAdapter {
    client: reqwest::Client,
    endpoints: VenueEndpoints,
    timeout_ms: u64,
}

impl OkxAdapter {
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
    data: Vec<TickerRow>,
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    #[serde(rename = "instId")]
    inst_id: String,
    #[serde(rename = "bidPx")]
    bid_px: String,
    #[serde(rename = "askPx")]
    ask_px: String,
    #[serde(rename = "bidSz")]
    bid_sz: String,
    #[serde(rename = "askSz")]
    ask_sz: String,
    #[serde(rename = "volCcy24h")]
    vol_ccy_24h: String,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    data: Vec<OrderBookRow>,
}

#[derive(Debug, Deserialize)]
struct OrderBookRow {
    bids: Vec<[String; 4]>,
    asks: Vec<[String; 4]>,
}

#[async_trait]
impl VenueAdapter for OkxAdapter {
    fn venue(&self) -> VenueId {
        VenueId::Okx
    }

    async fn fetch_24h_tickers(&self) -> Result<Vec<TickerRecord>, AdapterError> {
        let response: TickersResponse = get_json(
            &self.client,
            self.venue(),
            "fetch_24h_tickers",
            &self.endpoints.tickers_url,
            &[("instType", "SPOT".to_string())],
            self.timeout_ms,
        )
        .await?;

        Ok(response
            .data
            .into_iter()
            .map(|row| TickerRecord {
                native_symbol: NativeSymbol::new(row.inst_id),
                quote_volume_usdt_24h: row.vol_ccy_24h.parse().unwrap_or(Decimal::ZERO),
            })
            .collect())
    }

    async fn fetch_top_of_book(&self) -> Result<Vec<(NativeSymbol, Quote)>, AdapterError> {
        let response: TickersResponse = get_json(
            &self.client,
            self.venue(),
            "fetch_top_of_book",
            &self.endpoints.tickers_url,
            &[("instType", "SPOT".to_string())],
            self.timeout_ms,
        )
        .await?;

        let mut out = Vec::with_capacity(response.data.len());
        for row in response.data {
            let (bid, ask, bid_size, ask_size) = match (
                row.bid_px.parse(),
                row.ask_px.parse(),
                row.bid_sz.parse(),
                row.ask_sz.parse(),
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
                out.push((NativeSymbol::new(row.inst_id), quote));
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
                ("instId", symbol.as_str().to_string()),
                ("sz", depth.to_string()),
            ],
            self.timeout_ms,
        )
        .await?;

        let Some(row) = response.data.into_iter().next() else {
            return Ok(OrderBook::default());
        };

        Ok(OrderBook::new(parse_levels(row.bids), parse_levels(row.asks)))
    }
}

/// OKX order-book levels are documented as `[price, size, liquidated_orders,
/// order_count]` — size lives at index 1 on both sides. (A prior version of
/// this adapter pulled size from index 2 for bids and 3 for asks; that was
/// wrong and has been corrected.)
fn parse_levels(levels: Vec<[String; 4]>) -> Vec<(Decimal, Decimal)> {
    levels
        .into_iter()
        .filter_map(|level| Some((level[0].parse().ok()?, level[1].parse().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// `liquidated_orders`/`order_count` at index 2/3 must never be mistaken
    /// for size: a prior version read size from index 2 for bids and 3 for
    /// asks, which happened to work only when those counts were zero.
    #[test]
    fn order_book_row_reads_size_from_index_1_on_both_sides() {
        let raw = r#"{
            "data": [{
                "bids": [["43500.1", "0.75", "3", "2"]],
                "asks": [["43501.0", "1.25", "0", "1"]]
            }]
        }"#;
        let response: OrderBookResponse = serde_json::from_str(raw).unwrap();
        let row = response.data.into_iter().next().unwrap();
        let bids = parse_levels(row.bids);
        let asks = parse_levels(row.asks);
        assert_eq!(bids, vec![(dec!(43500.1), dec!(0.75))]);
        assert_eq!(asks, vec![(dec!(43501.0), dec!(1.25))]);
    }

    #[test]
    fn ticker_row_maps_inst_id_and_volume_field() {
        let raw = r#"{
            "data": [{
                "instId": "BTC-USDT",
                "bidPx": "43500.0",
                "askPx": "43501.0",
                "bidSz": "2.0",
                "askSz": "1.0",
                "volCcy24h": "555000.25"
            }]
        }"#;
        let response: TickersResponse = serde_json::from_str(raw).unwrap();
        let row = &response.data[0];
        assert_eq!(row.inst_id, "BTC-USDT");
        assert_eq!(row.vol_ccy_24h.parse::<Decimal>().unwrap(), dec!(555000.25));
    }
}
