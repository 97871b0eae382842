use crate::error::AdapterError;
use scanner_types::VenueId;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

/// A `reqwest::Client` tuned for short-lived polling requests against public
/// REST endpoints: no connection pooling tricks needed at this request rate,
/// just a sane overall timeout as a backstop behind the per-call deadline.
pub fn build_http_client(timeout_ms: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms.max(1_000)))
        .build()
        .expect("reqwest client builder with only timeout/pool settings cannot fail")
}

/// Issue one GET request with a bounded deadline and decode the JSON body.
/// Network, status, and decode failures are all mapped to `AdapterError`
/// carrying venue/operation context; none of them panic.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    venue: VenueId,
    operation: &'static str,
    url: &str,
    query: &[(&str, String)],
    timeout_ms: u64,
) -> Result<T, AdapterError> {
    let request = client.get(url).query(query);

    let response = tokio::time::timeout(Duration::from_millis(timeout_ms), request.send())
        .await
        .map_err(|_| AdapterError::Timeout {
            venue,
            operation,
            timeout_ms,
        })?
        .map_err(|e| AdapterError::Transport {
            venue,
            operation,
            detail: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AdapterError::HttpStatus {
            venue,
            operation,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| AdapterError::Transport {
        venue,
        operation,
        detail: e.to_string(),
    })?;

    serde_json::from_str(&body).map_err(|e| {
        warn!(%venue, operation, error = %e, "malformed response body");
        AdapterError::ShapeMismatch {
            venue,
            operation,
            detail: e.to_string(),
        }
    })
}
