use crate::config;
use crate::envelope;
use crate::error::FetchError;
use crate::models::{ContractType, OptionContract};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

/// Where the selection controller gets its contract lists from.
#[async_trait]
pub trait ContractSource: Send + Sync {
    /// Fetch and decode one side of the chain for `ticker`.
    async fn fetch_contracts(
        &self,
        ticker: &str,
        contract_type: ContractType,
    ) -> Result<Vec<OptionContract>, FetchError>;
}

/// HTTP client for the option contracts gateway
pub struct GatewayClient {
    client: Client,
    base_url: String,
    limit: u32,
    days_forward: u32,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config::HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit: config::DEFAULT_LIMIT,
            days_forward: config::DEFAULT_DAYS_FORWARD,
        })
    }

    pub fn contracts_url(&self, ticker: &str, contract_type: ContractType) -> String {
        format!(
            "{}{}?ticker_symbol={}&limit={}&days_forward={}&contract_type={}",
            self.base_url,
            config::OPTION_CONTRACTS_ROUTE,
            urlencoding::encode(ticker),
            self.limit,
            self.days_forward,
            contract_type
        )
    }
}

#[async_trait]
impl ContractSource for GatewayClient {
    async fn fetch_contracts(
        &self,
        ticker: &str,
        contract_type: ContractType,
    ) -> Result<Vec<OptionContract>, FetchError> {
        let url = self.contracts_url(ticker, contract_type);
        debug!(%url, "Fetching option contracts");

        let res = self
            .client
            .get(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let preview: String = text.chars().take(200).collect();
            return Err(FetchError::Status {
                status: status.as_u16(),
                preview,
            });
        }

        Ok(envelope::decode(&text)?)
    }
}
