use std::time::Duration;

// -----------------------------------------------
// UPSTREAM PROVIDER
// -----------------------------------------------
pub const UPSTREAM_URL: &str = "https://wg2rfvqgbqsxc6ucdfnqldlzoa0buncf.lambda-url.us-east-1.on.aws/";

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

// Upstream expects every parameter as a request header with these names
pub const HEADER_TICKER_SYMBOL: &str = "ticker_symbol";
pub const HEADER_API_KEY: &str = "api_key";
pub const HEADER_LIMIT: &str = "limit";
pub const HEADER_DAYS_FORWARD: &str = "days_forward";
pub const HEADER_CONTRACT_TYPE: &str = "contract_type";

// -----------------------------------------------
// GATEWAY
// -----------------------------------------------
pub const OPTION_CONTRACTS_ROUTE: &str = "/api/option-contracts";

pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_DAYS_FORWARD: u32 = 14;
pub const DEFAULT_PORT: u16 = 3001;

pub const MSG_TICKER_REQUIRED: &str = "ticker_symbol is required";
pub const MSG_UPSTREAM_FAILED: &str = "Failed to fetch data from external API";

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// SELECTION
// -----------------------------------------------
pub const DEFAULT_TICKER: &str = "AAPL";

pub const MSG_SELECTION_FAILED: &str = "Failed to fetch option contracts. Please try again.";

// Upstream round trips slower than this are logged at warn
pub const SLOW_UPSTREAM_MS: u128 = 5_000;

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to server
pub fn get_execution_mode() -> String {
    std::env::var("OPTIONS_MODE").unwrap_or_else(|_| "server".to_string())
}

/// Upstream endpoint, overridable for staging deployments
pub fn get_upstream_url() -> String {
    std::env::var("OPTIONS_UPSTREAM_URL").unwrap_or_else(|_| UPSTREAM_URL.to_string())
}

/// Ticker used for the initial auto-selection
pub fn get_default_ticker() -> String {
    std::env::var("OPTIONS_TICKER")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TICKER.to_string())
}

/// Read the provider credential. Absent credential is forwarded as empty.
pub fn read_api_key(var: &str) -> String {
    std::env::var(var).unwrap_or_default()
}
