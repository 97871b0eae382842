use crate::venue::VenueId;
use thiserror::Error;

/// Cross-cutting error taxonomy shared by Stage-0/1/2 workers. Per-cycle
/// errors are always local: logged and followed by a short backoff, never
/// propagated to crash the worker.
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("fetch failed at {venue} during {operation}: {detail}")]
    FetchFailure {
        venue: VenueId,
        operation: &'static str,
        detail: String,
    },

    #[error("no symbol map published yet")]
    EmptySnapshot,

    #[error("order book empty on at least one side for {venue}")]
    EmptyOrderBook { venue: VenueId },

    #[error("VWAP walk could not reach the target notional within the depth cap")]
    InsufficientDepth,

    #[error("net spread fell below the confirmation threshold")]
    SpreadVanished,
}
