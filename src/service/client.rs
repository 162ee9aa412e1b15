// =============================================================================
// Indicator Service Client — GET /stocks?symbol=...
// =============================================================================
//
// One request per call: no retries, no caching. The body is parsed as JSON
// whatever the status, then the outcome is classified as a transport failure
// (no usable body), a service error (non-2xx) or a success (2xx array).
// =============================================================================

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::types::StockRow;

/// Shown for any failure to obtain or parse a response.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Error connecting to the API";
/// Shown for a non-2xx response that carries no usable `error` text.
pub const SERVICE_ERROR_FALLBACK: &str = "Error fetching stock data";

// =============================================================================
// FetchFailure
// =============================================================================

/// Why a fetch produced no dataset.
#[derive(Debug)]
pub enum FetchFailure {
    /// The request did not complete, or the body was not what the contract
    /// promises. The cause is kept for logs only.
    Transport(anyhow::Error),
    /// The service answered with a failure status.
    Service { status: StatusCode, message: String },
}

impl FetchFailure {
    /// The text surfaced to the user.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Transport(_) => TRANSPORT_ERROR_MESSAGE,
            Self::Service { message, .. } => message,
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport failure: {e:#}"),
            Self::Service { status, message } => write!(f, "service returned {status}: {message}"),
        }
    }
}

impl std::error::Error for FetchFailure {}

/// Pick the service-provided error text, falling back to the default.
fn service_message(body: &Value) -> String {
    match body.get("error").and_then(Value::as_str) {
        Some(msg) if !msg.is_empty() => msg.to_string(),
        _ => SERVICE_ERROR_FALLBACK.to_string(),
    }
}

// =============================================================================
// IndicatorClient
// =============================================================================

/// HTTP client for the indicator service. Cheap to clone.
#[derive(Clone)]
pub struct IndicatorClient {
    base_url: String,
    client: reqwest::Client,
}

impl IndicatorClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` — scheme, host and port, e.g. `http://127.0.0.1:5000`.
    /// * `timeout`  — optional per-request timeout; `None` means none.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        debug!(base_url = %base_url, "IndicatorClient initialised");

        Ok(Self { base_url, client })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/stocks", self.base_url)
    }

    /// GET /stocks?symbol=<symbol>. `symbol` is sent verbatim (URL-encoded).
    #[instrument(skip(self), name = "indicator::fetch_stocks")]
    pub async fn fetch_stocks(&self, symbol: &str) -> Result<Vec<StockRow>, FetchFailure> {
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[("symbol", symbol)])
            .send()
            .await
            .context("GET /stocks request failed")
            .map_err(FetchFailure::Transport)?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .context("failed to read /stocks response body")
            .map_err(FetchFailure::Transport)?;

        let body: Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("/stocks returned {status} with a non-JSON body"))
            .map_err(FetchFailure::Transport)?;

        if !status.is_success() {
            return Err(FetchFailure::Service {
                status,
                message: service_message(&body),
            });
        }

        if !body.is_array() {
            return Err(FetchFailure::Transport(anyhow!(
                "/stocks returned {status} with a non-array body"
            )));
        }

        let rows: Vec<StockRow> = serde_json::from_value(body)
            .context("failed to parse /stocks rows")
            .map_err(FetchFailure::Transport)?;

        debug!(rows = rows.len(), "stock rows retrieved");
        Ok(rows)
    }
}
