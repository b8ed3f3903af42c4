pub mod api_server_axum;
pub mod app_config;
pub mod config;
pub mod contract_source;
pub mod display;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod models;
pub mod processor;
pub mod selection;
pub mod upstream_client;
pub mod utility;

// Re-exports (public API)
pub use api_server_axum::{GatewayConfig, OptionContractsQuery, ProxyGateway};
pub use contract_source::{ContractSource, GatewayClient};
pub use error::{DecodeError, FetchError, GatewayError};
pub use models::{
    AnnotatedContract, ContractType, Greeks, GreeksDisplay, LastQuote, MoneynessLabel,
    OptionContract, ResponseEnvelope,
};
pub use processor::annotate;
pub use selection::{SelectionController, SelectionState, SelectionStatus};
