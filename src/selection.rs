//! Selection state machine.
//!
//! One controller per session owns the [`SelectionState`]. A `select` moves the
//! state to `Loading`, fetches calls and then puts (strictly one after the
//! other), and settles in `Loaded` or `Error`. Every `select` is stamped with a
//! generation number; only the newest generation may write its outcome, so a
//! slow answer for an abandoned ticker never overwrites a newer selection.

use crate::config;
use crate::contract_source::ContractSource;
use crate::error::FetchError;
use crate::models::{AnnotatedContract, ContractType};
use crate::processor;
use crate::utility::timing::timed_async;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// View state for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    pub ticker: String,
    pub status: SelectionStatus,
    pub call_contracts: Vec<AnnotatedContract>,
    pub put_contracts: Vec<AnnotatedContract>,
    /// Set only in `Error`
    pub error_message: Option<String>,
}

impl SelectionState {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            status: SelectionStatus::Idle,
            call_contracts: Vec::new(),
            put_contracts: Vec::new(),
            error_message: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SelectionStatus::Loading
    }
}

type ContractLists = (Vec<AnnotatedContract>, Vec<AnnotatedContract>);

pub struct SelectionController<S> {
    source: S,
    state: watch::Sender<SelectionState>,
    generation: AtomicU64,
    activated: AtomicBool,
    default_ticker: String,
}

impl<S: ContractSource> SelectionController<S> {
    pub fn new(source: S, default_ticker: impl Into<String>) -> Self {
        let default_ticker = default_ticker.into();
        let (state, _) = watch::channel(SelectionState::new(default_ticker.clone()));
        Self {
            source,
            state,
            generation: AtomicU64::new(0),
            activated: AtomicBool::new(false),
            default_ticker,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    /// Read-only feed of state changes
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// First activation selects the default ticker. Returns false when the
    /// controller was already activated and nothing was done.
    pub async fn activate(&self) -> bool {
        if self.activated.swap(true, Ordering::SeqCst) {
            return false;
        }
        let ticker = self.default_ticker.clone();
        info!(%ticker, "Auto-selecting default ticker");
        self.select(&ticker).await;
        true
    }

    /// Load both sides of the chain for `ticker` and return the status the
    /// session ends up in.
    pub async fn select(&self, ticker: &str) -> SelectionStatus {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let ticker = ticker.trim().to_string();

        // Previous lists stay visible until the new ones arrive
        self.state.send_modify(|s| {
            s.ticker = ticker.clone();
            s.status = SelectionStatus::Loading;
            s.error_message = None;
        });

        let result = if ticker.is_empty() {
            warn!("Selection with an empty ticker");
            Err(None)
        } else {
            timed_async(format!("selection {}", ticker), || self.load(&ticker))
                .await
                .map_err(Some)
        };

        let applied = self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match &result {
                Ok((calls, puts)) => {
                    s.status = SelectionStatus::Loaded;
                    s.call_contracts = calls.clone();
                    s.put_contracts = puts.clone();
                    s.error_message = None;
                }
                Err(_) => {
                    s.status = SelectionStatus::Error;
                    s.call_contracts.clear();
                    s.put_contracts.clear();
                    s.error_message = Some(config::MSG_SELECTION_FAILED.to_string());
                }
            }
            true
        });

        match (&result, applied) {
            (_, false) => debug!(%ticker, generation, "Discarding result of superseded selection"),
            (Ok((calls, puts)), true) => info!(
                %ticker,
                calls = calls.len(),
                puts = puts.len(),
                "Option contracts loaded"
            ),
            (Err(Some(e)), true) => error!(%ticker, error = %e, "Failed to fetch option contracts"),
            (Err(None), true) => {}
        }

        self.state.borrow().status
    }

    /// Calls first, then puts. Either failure fails the cycle and drops
    /// whatever was already fetched.
    async fn load(&self, ticker: &str) -> Result<ContractLists, FetchError> {
        let calls = self.source.fetch_contracts(ticker, ContractType::Call).await?;
        let puts = self.source.fetch_contracts(ticker, ContractType::Put).await?;
        Ok((processor::annotate_all(calls), processor::annotate_all(puts)))
    }
}
