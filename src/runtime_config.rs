// =============================================================================
// Runtime Configuration — client settings loaded from JSON
// =============================================================================
//
// All fields carry `#[serde(default)]` so a partial (or empty) file still
// loads. A missing file is an error so the caller can fall back to defaults
// with a warning.
// =============================================================================

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "STOCK_TRACKER_API_URL";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_render_interval_ms() -> u64 {
    100
}

// =============================================================================
// RacePolicy
// =============================================================================

/// What happens when several fetches are in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePolicy {
    /// Every response is applied when it arrives; the last one to resolve
    /// wins, even if it was requested first.
    LastResolved,
    /// Only the response to the most recent request is applied.
    LatestRequest,
    /// As `LatestRequest`, and the superseded task is aborted.
    CancelSuperseded,
}

impl Default for RacePolicy {
    fn default() -> Self {
        Self::CancelSuperseded
    }
}

impl fmt::Display for RacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastResolved => write!(f, "last_resolved"),
            Self::LatestRequest => write!(f, "latest_request"),
            Self::CancelSuperseded => write!(f, "cancel_superseded"),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Base address of the indicator service; `/stocks` is appended.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub race_policy: RacePolicy,

    /// Keep rendering the last dataset underneath an active error.
    #[serde(default = "default_true")]
    pub show_stale_rows_on_error: bool,

    /// Per-request timeout. `None` waits for as long as the transport does.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Poll period of the render loop.
    #[serde(default = "default_render_interval_ms")]
    pub render_interval_ms: u64,

    /// Print the error paragraph in red.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            race_policy: RacePolicy::default(),
            show_stale_rows_on_error: true,
            request_timeout_secs: None,
            render_interval_ms: default_render_interval_ms(),
            color: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            api_base_url = %config.api_base_url,
            race_policy = %config.race_policy,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply an explicit base-URL override, ignoring blank values.
    pub fn override_api_base_url(&mut self, url: Option<&str>) {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.api_base_url = url.to_string();
        }
    }
}
