use scanner_types::VenueId;
use thiserror::Error;

/// Failure modes for a single adapter operation. These never abort the
/// calling worker; the worker logs them and proceeds with whatever data did
/// return.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{venue} {operation} timed out after {timeout_ms}ms")]
    Timeout {
        venue: VenueId,
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("{venue} {operation} returned HTTP {status}")]
    HttpStatus {
        venue: VenueId,
        operation: &'static str,
        status: u16,
    },

    #[error("{venue} {operation} transport error: {detail}")]
    Transport {
        venue: VenueId,
        operation: &'static str,
        detail: String,
    },

    #[error("{venue} {operation} returned an unexpected shape: {detail}")]
    ShapeMismatch {
        venue: VenueId,
        operation: &'static str,
        detail: String,
    },

    #[error("{venue} circuit breaker is open, rejecting {operation} without calling the venue")]
    CircuitOpen {
        venue: VenueId,
        operation: &'static str,
    },
}
