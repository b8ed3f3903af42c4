use crate::config;
use crate::error::GatewayError;
use crate::models::ContractType;
use crate::utility::timing::Timer;
use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Validated parameters for one upstream call
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRequest {
    pub ticker_symbol: String,
    pub limit: u32,
    pub days_forward: u32,
    pub contract_type: ContractType,
}

// -----------------------------------------------
// CLIENT WRAPPER
// -----------------------------------------------
pub struct UpstreamClient {
    client: Client,
    url: String,
}

impl UpstreamClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue the single GET to the provider and hand back its status and JSON
    /// body untouched. Anything that prevents a JSON body from arriving is a
    /// transport error.
    pub async fn fetch_contracts(
        &self,
        request: &ContractRequest,
        api_key: &str,
    ) -> Result<(StatusCode, Value), GatewayError> {
        let headers = upstream_headers(request, api_key)?;

        debug!(
            ticker = %request.ticker_symbol,
            contract_type = %request.contract_type,
            limit = request.limit,
            days_forward = request.days_forward,
            "Forwarding option contracts request upstream"
        );

        let timer = Timer::start_with_threshold("upstream option contracts", config::SLOW_UPSTREAM_MS);

        let res = self.client.get(&self.url).headers(headers).send().await?;
        let status = res.status();
        let text = res.text().await?;

        timer.stop();

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            warn!(status = status.as_u16(), %preview, "Upstream returned a non-JSON body");
            GatewayError::UpstreamTransport(format!("Non-JSON response: {}", e))
        })?;

        Ok((status, body))
    }
}

// -----------------------------------------------
// HEADER ADAPTER
// -----------------------------------------------

/// The provider takes every parameter, credential included, as a request
/// header rather than a query string or body. Header names are fixed by the
/// provider and must not change.
pub fn upstream_headers(request: &ContractRequest, api_key: &str) -> Result<HeaderMap, GatewayError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let fields = [
        (config::HEADER_TICKER_SYMBOL, request.ticker_symbol.clone()),
        (config::HEADER_API_KEY, api_key.to_string()),
        (config::HEADER_LIMIT, request.limit.to_string()),
        (config::HEADER_DAYS_FORWARD, request.days_forward.to_string()),
        (config::HEADER_CONTRACT_TYPE, request.contract_type.as_str().to_string()),
    ];

    for (name, value) in fields {
        // Report the header name only; the value may be the credential.
        let value = HeaderValue::from_str(&value).map_err(|_| {
            GatewayError::UpstreamTransport(format!("Value for header '{}' is not representable", name))
        })?;
        headers.insert(HeaderName::from_static(name), value);
    }

    Ok(headers)
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}
