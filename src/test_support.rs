// =============================================================================
// Fake indicator service for tests
// =============================================================================
//
// Serves `GET /stocks` on an ephemeral localhost port with canned responses
// keyed by symbol, optional per-symbol delays and a log of every symbol
// requested.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

struct Shared {
    requested: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
}

pub struct FakeService {
    base_url: String,
    shared: Arc<Shared>,
}

impl FakeService {
    pub async fn start() -> Self {
        Self::start_with_delays(&[]).await
    }

    /// Start a service that holds the response for each listed symbol.
    pub async fn start_with_delays(delays: &[(&str, u64)]) -> Self {
        let shared = Arc::new(Shared {
            requested: Mutex::new(Vec::new()),
            delays: delays
                .iter()
                .map(|(s, ms)| (s.to_string(), Duration::from_millis(*ms)))
                .collect(),
        });

        let app = Router::new()
            .route("/stocks", get(stocks))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            shared,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Symbols received so far, in arrival order.
    pub fn requested(&self) -> Vec<String> {
        self.shared.requested.lock().clone()
    }

    pub fn hits(&self) -> usize {
        self.shared.requested.lock().len()
    }
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// The canned row the fake service returns for `symbol`, tagged with it.
pub fn row_for(symbol: &str, date: &str) -> Value {
    json!({
        "Date": date,
        "Close": 150.2,
        "SMA_50": 148.1,
        "Upper_BB": 155.0,
        "Lower_BB": 141.2,
        "%K": 80,
        "%D": 70,
        "Symbol": symbol
    })
}

async fn stocks(
    State(shared): State<Arc<Shared>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let symbol = params.get("symbol").cloned().unwrap_or_default();
    shared.requested.lock().push(symbol.clone());

    if let Some(delay) = shared.delays.get(&symbol) {
        tokio::time::sleep(*delay).await;
    }

    match symbol.as_str() {
        "" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Symbol is required" })),
        )
            .into_response(),
        "ZZZZ" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Symbol not found" })),
        )
            .into_response(),
        "NOERR" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response(),
        "BLANKERR" => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "" }))).into_response()
        }
        "HTMLERR" => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        "GARBAGE" => (StatusCode::OK, "definitely not json").into_response(),
        "OBJECT" => Json(row_for("OBJECT", "2024-01-02")).into_response(),
        "EMPTY" => Json(json!([])).into_response(),
        other => Json(json!([
            row_for(other, "2024-01-02"),
            row_for(other, "2024-01-03")
        ]))
        .into_response(),
    }
}
