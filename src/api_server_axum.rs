use crate::config;
use crate::error::GatewayError;
use crate::models::ContractType;
use crate::upstream_client::{ContractRequest, UpstreamClient};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

// -----------------------------------------------
// API REQUEST MODELS
// -----------------------------------------------

/// Raw query string of `GET /api/option-contracts`. Everything arrives as
/// optional text and is validated in one place.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OptionContractsQuery {
    pub ticker_symbol: Option<String>,
    pub limit: Option<String>,
    pub days_forward: Option<String>,
    pub contract_type: Option<String>,
}

impl OptionContractsQuery {
    pub fn for_ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker_symbol: Some(ticker.into()),
            ..Self::default()
        }
    }

    /// Apply defaults and check parameters. Empty values fall back to defaults,
    /// except the ticker which is mandatory.
    pub fn validate(&self) -> Result<ContractRequest, GatewayError> {
        let ticker_symbol = self
            .ticker_symbol
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::MissingParameter)?
            .to_string();

        let limit = parse_count("limit", self.limit.as_deref(), config::DEFAULT_LIMIT)?;
        let days_forward = parse_count("days_forward", self.days_forward.as_deref(), config::DEFAULT_DAYS_FORWARD)?;

        let contract_type = match non_empty(self.contract_type.as_deref()) {
            None => ContractType::Call,
            Some(raw) => raw
                .parse::<ContractType>()
                .map_err(|reason| GatewayError::InvalidParameter { name: "contract_type", reason })?,
        };

        Ok(ContractRequest {
            ticker_symbol,
            limit,
            days_forward,
            contract_type,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_count(name: &'static str, raw: Option<&str>, default: u32) -> Result<u32, GatewayError> {
    match non_empty(raw) {
        None => Ok(default),
        Some(v) => v.parse::<u32>().map_err(|_| GatewayError::InvalidParameter {
            name,
            reason: format!("must be a non-negative integer (got '{}')", v),
        }),
    }
}

// -----------------------------------------------
// GATEWAY STATE
// -----------------------------------------------

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub upstream_url: String,
    /// Name of the environment variable holding the provider credential
    pub api_key_var: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstream_url: config::UPSTREAM_URL.to_string(),
            api_key_var: config::API_KEY_ENV.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            upstream_url: config::get_upstream_url(),
            ..Self::default()
        }
    }
}

/// Server-side relay to the options provider
#[derive(Clone)]
pub struct ProxyGateway {
    upstream: Arc<UpstreamClient>,
    api_key_var: Arc<str>,
}

impl ProxyGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Ok(Self {
            upstream: Arc::new(UpstreamClient::new(config.upstream_url)?),
            api_key_var: Arc::from(config.api_key_var),
        })
    }

    /// Validate, forward, and pass the upstream answer through.
    ///
    /// The only statuses produced here are 400 for bad parameters (upstream is
    /// never contacted) and 500 when the upstream call itself fails.
    pub async fn fetch_contracts(&self, query: &OptionContractsQuery) -> (StatusCode, Value) {
        let request = match query.validate() {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejected option contracts request");
                return error_response(&e);
            }
        };

        // Read per call so a rotated credential is picked up without restart
        let api_key = config::read_api_key(&self.api_key_var);

        match self.upstream.fetch_contracts(&request, &api_key).await {
            Ok((status, body)) => {
                info!(
                    ticker = %request.ticker_symbol,
                    contract_type = %request.contract_type,
                    status = status.as_u16(),
                    "Upstream responded"
                );
                (status, body)
            }
            Err(e) => {
                error!(
                    ticker = %request.ticker_symbol,
                    contract_type = %request.contract_type,
                    error = %e,
                    "Error fetching from external API"
                );
                error_response(&e)
            }
        }
    }
}

fn error_response(err: &GatewayError) -> (StatusCode, Value) {
    (err.status(), json!({ "error": err.public_message() }))
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/option-contracts?ticker_symbol=AAPL&limit=20&days_forward=14&contract_type=call
async fn get_option_contracts(
    Query(query): Query<OptionContractsQuery>,
    State(gateway): State<ProxyGateway>,
) -> (StatusCode, Json<Value>) {
    let (status, body) = gateway.fetch_contracts(&query).await;
    (status, Json(body))
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn router(gateway: ProxyGateway) -> Router {
    Router::new()
        .route(config::OPTION_CONTRACTS_ROUTE, get(get_option_contracts))
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

/// Serve the gateway on an already-bound listener
pub async fn serve(listener: tokio::net::TcpListener, gateway: ProxyGateway) -> Result<()> {
    axum::serve(listener, router(gateway))
        .await
        .context("Gateway server stopped unexpectedly")
}

pub async fn start_server(port: u16, config: GatewayConfig) -> Result<()> {
    let gateway = ProxyGateway::new(config)?;

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, upstream = %gateway.upstream.url(), "Option contracts gateway listening");
    println!("🚀 Option Contracts Gateway running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  {}?ticker_symbol=AAPL&limit=20&days_forward=14&contract_type=call", config::OPTION_CONTRACTS_ROUTE);
    println!();

    serve(listener, gateway).await
}
