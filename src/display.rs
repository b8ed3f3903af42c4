//! Text rendering of annotated contracts and of the whole selection view.

use crate::models::{AnnotatedContract, ContractType};
use crate::processor::parse_price;
use crate::selection::{SelectionState, SelectionStatus};
use colored::Colorize;

const NOT_AVAILABLE: &str = "n/a";

/// "$150.00"
pub fn format_strike(raw: Option<&str>) -> String {
    match raw.and_then(parse_price) {
        Some(strike) => format!("${:.2}", strike),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// "+7.14%" / "-7.14%"; the plus sign only for strictly positive values
pub fn format_moneyness(pct: Option<f64>) -> String {
    match pct {
        Some(p) if p > 0.0 => format!("+{:.2}%", p),
        Some(p) => format!("{:.2}%", p),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// One contract card
pub fn render_card(contract: &AnnotatedContract, contract_type: ContractType) -> String {
    let base = &contract.base;
    let strike = format_strike(base.strike_price.as_deref());
    let strike = match contract_type {
        ContractType::Call => strike.blue().bold(),
        ContractType::Put => strike.yellow().bold(),
    };
    let label = contract
        .moneyness_label
        .map(|l| l.description())
        .unwrap_or(NOT_AVAILABLE);
    let g = &contract.greeks_display;

    let mut lines = Vec::with_capacity(8);
    lines.push(format!(
        "{}  {}  {}",
        strike,
        format_moneyness(contract.moneyness_percent).bold(),
        label.italic()
    ));
    lines.push(format!("  Implied Volatility: {}", text(&base.implied_volatility)));
    lines.push(format!("  Open Interest:      {}", text(&base.open_interest)));
    lines.push(format!(
        "  Day Change:         {} ({})",
        text(&base.day_change),
        text(&base.day_change_percent)
    ));
    lines.push(format!("  Day Volume:         {}", text(&base.day_volume)));
    lines.push(format!(
        "  Delta {} | Gamma {} | Theta {} | Vega {}",
        g.delta, g.gamma, g.theta, g.vega
    ));
    lines.push(format!(
        "  {}  {}",
        contract
            .formatted_expiration
            .as_deref()
            .unwrap_or(NOT_AVAILABLE)
            .bold(),
        "contract expires".italic()
    ));
    lines.join("\n")
}

/// Column of cards for one side of the chain
pub fn render_column(contracts: &[AnnotatedContract], contract_type: ContractType) -> String {
    let (title, empty) = match contract_type {
        ContractType::Call => ("Call Options", "No call options available for this stock."),
        ContractType::Put => ("Put Options", "No put options available for this stock."),
    };

    let mut out = vec![title.cyan().bold().to_string()];
    if contracts.is_empty() {
        out.push(empty.dimmed().to_string());
    } else {
        out.extend(contracts.iter().map(|c| render_card(c, contract_type)));
    }
    out.join("\n\n")
}

/// Whole view: error line, then either a loading indicator or both columns
pub fn render_view(state: &SelectionState) -> String {
    let mut out = vec![format!("{} {}", "Ticker:".cyan(), state.ticker.yellow())];

    if let Some(message) = &state.error_message {
        out.push(message.red().to_string());
    }

    match state.status {
        SelectionStatus::Loading => out.push("⏳ Loading option contracts...".dimmed().to_string()),
        _ => {
            out.push(render_column(&state.call_contracts, ContractType::Call));
            out.push(render_column(&state.put_contracts, ContractType::Put));
        }
    }
    out.join("\n\n")
}
