use crate::candidate::Candidate;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Why a Candidate failed Stage-2 confirmation. These are data, not errors:
/// they flow to the log sink as ordinary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    FetchFailedOrEmptyOrderbook,
    InsufficientDepth,
    SpreadAfterFeesTooLow,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::FetchFailedOrEmptyOrderbook => "fetch_failed_or_empty_orderbook",
            RejectReason::InsufficientDepth => "insufficient_depth",
            RejectReason::SpreadAfterFeesTooLow => "spread_after_fees_too_low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthStatus {
    Confirmed,
    Rejected,
}

/// The Stage-2 outcome for one Candidate.
#[derive(Debug, Clone)]
pub struct DepthResult {
    pub candidate: Candidate,
    pub status: DepthStatus,
    pub reason: Option<RejectReason>,
    pub exec_buy_price: Option<Decimal>,
    pub exec_sell_price: Option<Decimal>,
    pub exec_spread_pct_net: Option<Decimal>,
    pub ts_utc: DateTime<Utc>,
}

impl DepthResult {
    pub fn is_confirmed(&self) -> bool {
        self.status == DepthStatus::Confirmed
    }
}
