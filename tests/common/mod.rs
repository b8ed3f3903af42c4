#![allow(dead_code)]

use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// What the stub upstream saw for one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub struct StubUpstream {
    pub url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubUpstream {
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Bind a stub provider on an ephemeral port. `respond` maps the request
/// headers to a status and raw body.
pub async fn spawn_upstream<F>(respond: F) -> StubUpstream
where
    F: Fn(&HeaderMap) -> (StatusCode, String) + Clone + Send + Sync + 'static,
{
    let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&requests);

    let app = Router::new().route("/", get(move |uri: Uri, headers: HeaderMap| {
        let recorder = Arc::clone(&recorder);
        let respond = respond.clone();
        async move {
            let (status, body) = respond(&headers);
            recorder.lock().unwrap().push(RecordedRequest { uri, headers });
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }
    }));

    let url = serve_on_ephemeral_port(app).await;
    StubUpstream { url, requests }
}

/// Serve `app` on 127.0.0.1:0 in the background and return its base URL
pub async fn serve_on_ephemeral_port(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

/// An address nothing is listening on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

// -----------------------------------------------
// FIXTURES
// -----------------------------------------------

pub fn contract_json(ticker: &str, contract_type: &str, strike: &str, underlying: f64) -> Value {
    json!({
        "contract_type": contract_type,
        "expiration_date": "2024-03-14",
        "implied_volatility": "0.2431",
        "open_interest": "1520",
        "strike_price": strike,
        "ticker": ticker,
        "last_quote": { "underlying_price": underlying },
        "day_change": "0.45",
        "day_change_percent": "3.2%",
        "day_volume": "842",
        "greeks": { "delta": 0.51234, "gamma": 0.01, "theta": -0.04567, "vega": 0.11 }
    })
}

/// `count` contracts with tickers O:<SYMBOL>-<TYPE>-<index>
pub fn contracts(symbol: &str, contract_type: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let ticker = format!("O:{}-{}-{}", symbol, contract_type, i);
            let strike = format!("{}", 130 + i * 5);
            contract_json(&ticker, contract_type, &strike, 140.0)
        })
        .collect()
}

/// Double-encode contracts the way the provider does
pub fn envelope(contracts: Vec<Value>) -> String {
    let inner = json!({ "option_contracts": contracts }).to_string();
    json!({ "req_id": "1", "response": inner }).to_string()
}
