use async_trait::async_trait;
use option_contracts_viewer::{
    ContractSource, ContractType, FetchError, LastQuote, OptionContract, SelectionController,
    SelectionState, SelectionStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

const FAILED: &str = "Failed to fetch option contracts. Please try again.";

type CallLog = Arc<Mutex<Vec<(String, ContractType)>>>;

fn contract(ticker: &str, strike: &str) -> OptionContract {
    OptionContract {
        ticker: Some(ticker.to_string()),
        strike_price: Some(strike.to_string()),
        expiration_date: Some("2024-03-14".to_string()),
        last_quote: Some(LastQuote { underlying_price: Some(140.0) }),
        ..OptionContract::default()
    }
}

fn chain(symbol: &str, side: ContractType, count: usize) -> Vec<OptionContract> {
    (0..count)
        .map(|i| contract(&format!("O:{}-{}-{}", symbol, side, i), &format!("{}", 130 + i * 5)))
        .collect()
}

fn status_error(status: u16) -> FetchError {
    FetchError::Status { status, preview: String::new() }
}

/// Answers from a fixed table; optionally fails one side or everything
struct ScriptedSource {
    counts: HashMap<String, (usize, usize)>,
    fail_side: Option<ContractType>,
    fail_all: Arc<AtomicBool>,
    log: CallLog,
}

impl ScriptedSource {
    fn new(counts: &[(&str, usize, usize)]) -> Self {
        Self {
            counts: counts.iter().map(|(t, c, p)| (t.to_string(), (*c, *p))).collect(),
            fail_side: None,
            fail_all: Arc::new(AtomicBool::new(false)),
            log: CallLog::default(),
        }
    }
}

#[async_trait]
impl ContractSource for ScriptedSource {
    async fn fetch_contracts(
        &self,
        ticker: &str,
        contract_type: ContractType,
    ) -> Result<Vec<OptionContract>, FetchError> {
        self.log.lock().unwrap().push((ticker.to_string(), contract_type));

        if self.fail_all.load(Ordering::SeqCst) || self.fail_side == Some(contract_type) {
            return Err(status_error(502));
        }
        let (calls, puts) = self.counts.get(ticker).copied().ok_or_else(|| status_error(404))?;
        let count = match contract_type {
            ContractType::Call => calls,
            ContractType::Put => puts,
        };
        Ok(chain(ticker, contract_type, count))
    }
}

/// Every fetch for a gated ticker waits for one permit
struct GatedSource {
    gated: Vec<String>,
    gate: Arc<Semaphore>,
    log: CallLog,
}

#[async_trait]
impl ContractSource for GatedSource {
    async fn fetch_contracts(
        &self,
        ticker: &str,
        contract_type: ContractType,
    ) -> Result<Vec<OptionContract>, FetchError> {
        self.log.lock().unwrap().push((ticker.to_string(), contract_type));
        if self.gated.iter().any(|g| g == ticker) {
            self.gate.acquire().await.unwrap().forget();
        }
        Ok(chain(ticker, contract_type, 2))
    }
}

fn gated(tickers: &[&str]) -> (GatedSource, Arc<Semaphore>, CallLog) {
    let gate = Arc::new(Semaphore::new(0));
    let log = CallLog::default();
    let source = GatedSource {
        gated: tickers.iter().map(|t| t.to_string()).collect(),
        gate: Arc::clone(&gate),
        log: Arc::clone(&log),
    };
    (source, gate, log)
}

async fn wait_for_log_len(log: &CallLog, len: usize) {
    while log.lock().unwrap().len() < len {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let controller = SelectionController::new(ScriptedSource::new(&[]), "AAPL");
        assert_eq!(controller.state(), SelectionState::new("AAPL"));
        assert_eq!(controller.state().status, SelectionStatus::Idle);
        assert!(controller.state().error_message.is_none());
    }

    #[tokio::test]
    async fn test_select_loads_both_sides_in_order() {
        let source = ScriptedSource::new(&[("AAPL", 5, 3)]);
        let log = Arc::clone(&source.log);
        let controller = SelectionController::new(source, "AAPL");

        assert_eq!(controller.select("AAPL").await, SelectionStatus::Loaded);

        let state = controller.state();
        assert_eq!(state.status, SelectionStatus::Loaded);
        assert_eq!(state.ticker, "AAPL");
        assert_eq!(state.call_contracts.len(), 5);
        assert_eq!(state.put_contracts.len(), 3);
        assert!(state.error_message.is_none());

        let tickers: Vec<_> = state
            .call_contracts
            .iter()
            .map(|c| c.base.ticker.clone().unwrap())
            .collect();
        assert_eq!(tickers[0], "O:AAPL-call-0");
        assert_eq!(tickers[4], "O:AAPL-call-4");

        // Annotated on the way in
        assert!(state.call_contracts[0].moneyness_percent.is_some());
        assert_eq!(state.put_contracts[0].formatted_expiration.as_deref(), Some("Mar 14"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("AAPL".to_string(), ContractType::Call),
                ("AAPL".to_string(), ContractType::Put)
            ]
        );
    }

    #[tokio::test]
    async fn test_call_failure_skips_put_fetch() {
        let mut source = ScriptedSource::new(&[("AAPL", 5, 3)]);
        source.fail_side = Some(ContractType::Call);
        let log = Arc::clone(&source.log);
        let controller = SelectionController::new(source, "AAPL");

        assert_eq!(controller.select("AAPL").await, SelectionStatus::Error);
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(controller.state().error_message.as_deref(), Some(FAILED));
    }

    #[tokio::test]
    async fn test_put_failure_discards_calls() {
        let mut source = ScriptedSource::new(&[("AAPL", 5, 3)]);
        source.fail_side = Some(ContractType::Put);
        let controller = SelectionController::new(source, "AAPL");

        assert_eq!(controller.select("AAPL").await, SelectionStatus::Error);
        let state = controller.state();
        assert!(state.call_contracts.is_empty());
        assert!(state.put_contracts.is_empty());
        assert_eq!(state.error_message.as_deref(), Some(FAILED));
    }

    #[tokio::test]
    async fn test_error_clears_on_next_success() {
        let source = ScriptedSource::new(&[("AAPL", 2, 2), ("MSFT", 4, 1)]);
        let fail_all = Arc::clone(&source.fail_all);
        let controller = SelectionController::new(source, "AAPL");

        assert_eq!(controller.select("AAPL").await, SelectionStatus::Loaded);

        fail_all.store(true, Ordering::SeqCst);
        assert_eq!(controller.select("MSFT").await, SelectionStatus::Error);
        assert_eq!(controller.state().ticker, "MSFT");

        fail_all.store(false, Ordering::SeqCst);
        assert_eq!(controller.select("MSFT").await, SelectionStatus::Loaded);
        let state = controller.state();
        assert!(state.error_message.is_none());
        assert_eq!((state.call_contracts.len(), state.put_contracts.len()), (4, 1));
    }

    #[tokio::test]
    async fn test_unknown_ticker_errors() {
        let controller = SelectionController::new(ScriptedSource::new(&[]), "AAPL");
        assert_eq!(controller.select("ZZZZ").await, SelectionStatus::Error);
        assert_eq!(controller.state().error_message.as_deref(), Some(FAILED));
    }

    #[tokio::test]
    async fn test_blank_ticker_errors_without_fetching() {
        let source = ScriptedSource::new(&[("AAPL", 1, 1)]);
        let log = Arc::clone(&source.log);
        let controller = SelectionController::new(source, "AAPL");

        assert_eq!(controller.select("  ").await, SelectionStatus::Error);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transitions_and_sequential_fetches() {
        let (source, gate, log) = gated(&["AAPL"]);
        let controller = Arc::new(SelectionController::new(source, "AAPL"));
        let mut rx = controller.subscribe();
        assert_eq!(rx.borrow().status, SelectionStatus::Idle);

        let task = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.select("AAPL").await })
        };

        rx.wait_for(|s| s.is_loading()).await.unwrap();
        assert!(rx.borrow().error_message.is_none());

        // Call fetch is in flight; put has not been issued
        wait_for_log_len(&log, 1).await;
        tokio::task::yield_now().await;
        assert_eq!(*log.lock().unwrap(), vec![("AAPL".to_string(), ContractType::Call)]);

        gate.add_permits(1);
        wait_for_log_len(&log, 2).await;
        assert_eq!(log.lock().unwrap()[1], ("AAPL".to_string(), ContractType::Put));
        assert!(controller.state().is_loading());

        gate.add_permits(1);
        assert_eq!(task.await.unwrap(), SelectionStatus::Loaded);
        assert_eq!(rx.borrow_and_update().status, SelectionStatus::Loaded);
    }

    #[tokio::test]
    async fn test_previous_lists_kept_while_loading() {
        let (source, gate, _log) = gated(&["MSFT"]);
        let controller = Arc::new(SelectionController::new(source, "AAPL"));

        assert_eq!(controller.select("AAPL").await, SelectionStatus::Loaded);
        let mut rx = controller.subscribe();

        let task = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.select("MSFT").await })
        };

        rx.wait_for(|s| s.is_loading()).await.unwrap();
        {
            let state = rx.borrow();
            assert_eq!(state.ticker, "MSFT");
            assert_eq!(state.call_contracts.len(), 2);
            assert_eq!(state.call_contracts[0].base.ticker.as_deref(), Some("O:AAPL-call-0"));
        }

        gate.add_permits(2);
        assert_eq!(task.await.unwrap(), SelectionStatus::Loaded);
        assert_eq!(
            controller.state().call_contracts[0].base.ticker.as_deref(),
            Some("O:MSFT-call-0")
        );
    }

    #[tokio::test]
    async fn test_superseded_selection_is_discarded() {
        let (source, gate, log) = gated(&["SLOW"]);
        let controller = Arc::new(SelectionController::new(source, "AAPL"));

        let slow = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.select("SLOW").await })
        };
        wait_for_log_len(&log, 1).await;

        assert_eq!(controller.select("FAST").await, SelectionStatus::Loaded);
        assert_eq!(controller.state().ticker, "FAST");

        // Let the abandoned selection finish; it must not overwrite FAST
        gate.add_permits(2);
        slow.await.unwrap();

        let state = controller.state();
        assert_eq!(state.ticker, "FAST");
        assert_eq!(state.status, SelectionStatus::Loaded);
        assert_eq!(state.call_contracts[0].base.ticker.as_deref(), Some("O:FAST-call-0"));
        assert_eq!(state.put_contracts[0].base.ticker.as_deref(), Some("O:FAST-put-0"));
    }

    #[tokio::test]
    async fn test_activate_selects_default_once() {
        let source = ScriptedSource::new(&[("AAPL", 5, 3)]);
        let log = Arc::clone(&source.log);
        let controller = SelectionController::new(source, "AAPL");

        assert!(controller.activate().await);
        assert_eq!(controller.state().status, SelectionStatus::Loaded);
        assert_eq!(controller.state().ticker, "AAPL");

        assert!(!controller.activate().await);
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
