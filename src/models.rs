use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Call,
    Put,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Call => "call",
            ContractType::Put => "put",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(ContractType::Call),
            "put" => Ok(ContractType::Put),
            other => Err(format!("must be one of: call, put (got '{}')", other)),
        }
    }
}

/// Outer wrapper returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub req_id: Option<String>,

    /// A second JSON document, encoded as a string
    pub response: String,
}

/// One option contract as the provider sends it.
///
/// Numeric-looking fields are string-encoded by the provider and kept as text;
/// coercion happens in the processor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptionContract {
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub expiration_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub implied_volatility: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub open_interest: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub strike_price: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub ticker: Option<String>,

    #[serde(default)]
    pub last_quote: Option<LastQuote>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub day_change: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub day_change_percent: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub day_volume: Option<String>,

    #[serde(default)]
    pub greeks: Option<Greeks>,
}

impl OptionContract {
    /// Typed contract side, if the provider sent a recognised value
    pub fn kind(&self) -> Option<ContractType> {
        self.contract_type.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn underlying_price(&self) -> Option<f64> {
        self.last_quote.as_ref().and_then(|q| q.underlying_price)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LastQuote {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub underlying_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Greeks {
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
}

/// Inner document carried in `ResponseEnvelope::response`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsPayload {
    pub option_contracts: Vec<OptionContract>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MoneynessLabel {
    AboveUnderlying,
    BelowUnderlying,
}

impl MoneynessLabel {
    pub fn description(&self) -> &'static str {
        match self {
            MoneynessLabel::AboveUnderlying => "above current price",
            MoneynessLabel::BelowUnderlying => "below current price",
        }
    }
}

/// Greeks pre-rendered for display. Empty string when a value is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GreeksDisplay {
    pub delta: String,
    pub gamma: String,
    pub theta: String,
    pub vega: String,
}

/// Contract with the derived metrics shown on a card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedContract {
    #[serde(flatten)]
    pub base: OptionContract,

    pub moneyness_percent: Option<f64>,
    pub moneyness_label: Option<MoneynessLabel>,
    pub formatted_expiration: Option<String>,
    pub greeks_display: GreeksDisplay,
}

// -----------------------------------------------
// LENIENT FIELD DECODERS
// -----------------------------------------------

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
