use crate::models::{AnnotatedContract, Greeks, GreeksDisplay, MoneynessLabel, OptionContract};
use chrono::NaiveDate;

/// Parse a provider-formatted decimal ("150", " 150.50 ").
/// Returns None for anything that is not a finite number.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Percentage distance of the strike from the underlying, sign preserved.
/// Not computable when the underlying is zero.
pub fn calculate_moneyness(strike: f64, underlying: f64) -> Option<f64> {
    if underlying == 0.0 || !underlying.is_finite() || !strike.is_finite() {
        return None;
    }
    Some((strike - underlying) / underlying * 100.0)
}

/// Strike strictly above the underlying is Above; ties go Below.
pub fn classify_moneyness(strike: f64, underlying: f64) -> MoneynessLabel {
    if strike > underlying {
        MoneynessLabel::AboveUnderlying
    } else {
        MoneynessLabel::BelowUnderlying
    }
}

/// Render an ISO expiration date as "Mar 14".
///
/// Only the calendar date part is read, so a trailing time or offset can never
/// move the rendered day.
pub fn format_expiration(raw: &str) -> Option<String> {
    let date_part = raw.trim().get(..10)?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some(date.format("%b %-d").to_string())
}

/// Four decimal places, empty when absent
pub fn format_greek(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

pub fn format_greeks(greeks: Option<&Greeks>) -> GreeksDisplay {
    match greeks {
        Some(g) => GreeksDisplay {
            delta: format_greek(g.delta),
            gamma: format_greek(g.gamma),
            theta: format_greek(g.theta),
            vega: format_greek(g.vega),
        },
        None => GreeksDisplay::default(),
    }
}

/// Derive display metrics for one contract. Never fails: fields that cannot be
/// computed are left as None so one bad row does not take down the list.
pub fn annotate(contract: OptionContract) -> AnnotatedContract {
    let strike = contract.strike_price.as_deref().and_then(parse_price);
    let underlying = contract.underlying_price().filter(|v| v.is_finite());

    let (moneyness_percent, moneyness_label) = match (strike, underlying) {
        (Some(s), Some(u)) => match calculate_moneyness(s, u) {
            Some(pct) => (Some(pct), Some(classify_moneyness(s, u))),
            None => (None, None),
        },
        _ => (None, None),
    };

    let formatted_expiration = contract
        .expiration_date
        .as_deref()
        .and_then(format_expiration);

    let greeks_display = format_greeks(contract.greeks.as_ref());

    AnnotatedContract {
        base: contract,
        moneyness_percent,
        moneyness_label,
        formatted_expiration,
        greeks_display,
    }
}

/// Annotate a whole list, keeping upstream order
pub fn annotate_all(contracts: Vec<OptionContract>) -> Vec<AnnotatedContract> {
    contracts.into_iter().map(annotate).collect()
}
