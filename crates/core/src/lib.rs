pub mod errors;
pub mod feed;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use errors::CoreError;
use feed::api_client::PredictionApi;
use feed::poller::PriceFeed;
use models::ledger::Ledger;
use models::price::PriceSample;
use models::settings::Settings;
use models::transaction::{Transaction, TransactionFilter};
use services::history_service::{HistoryPage, HistoryService};
use services::ledger_service::LedgerService;
use services::valuation_service::{Valuation, ValuationService};
use storage::store::LedgerStore;

/// Main entry point for the paper-trader core library.
///
/// Owns the ledger and the services that operate on it, plus the
/// injected persistence boundary. All mutations are synchronous and
/// single-writer; the only background activity is the [`PriceFeed`]
/// built by [`PaperTrader::price_feed`], which never touches the
/// ledger.
///
/// Every mutating operation is persisted best-effort: a failing store
/// write logs a warning and leaves the dirty flag set, but the
/// operation itself still succeeds.
#[must_use]
pub struct PaperTrader {
    ledger: Ledger,
    settings: Settings,
    ledger_service: LedgerService,
    history_service: HistoryService,
    valuation_service: ValuationService,
    store: Box<dyn LedgerStore>,
    /// Tracks whether any mutation has occurred since the last
    /// successful save/load.
    dirty: bool,
}

impl std::fmt::Debug for PaperTrader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperTrader")
            .field("cash", &self.ledger.cash)
            .field("asset", &self.ledger.asset)
            .field("transactions", &self.ledger.transactions.len())
            .field("settings", &self.settings)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PaperTrader {
    /// Restore from the store if a saved state exists, otherwise start
    /// with the documented defaults (10 000 cash, no BTC, empty
    /// history). A corrupt or unreadable save falls back to defaults
    /// rather than propagating the error.
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        let (ledger, settings) = match store.load() {
            Ok(Some(envelope)) => (envelope.ledger, envelope.settings),
            Ok(None) => (Ledger::default(), Settings::default()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore saved state, starting fresh");
                (Ledger::default(), Settings::default())
            }
        };
        Self::build(ledger, settings, store)
    }

    /// Start from explicit state, ignoring whatever the store holds.
    /// The store is still used for subsequent saves.
    pub fn with_state(ledger: Ledger, settings: Settings, store: Box<dyn LedgerStore>) -> Self {
        Self::build(ledger, settings, store)
    }

    // ── Ledger Operations ───────────────────────────────────────────

    /// Add cash to the wallet. Returns the new transaction's id.
    pub fn deposit(&mut self, amount: f64) -> Result<Uuid, CoreError> {
        let id = self.ledger_service.deposit(&mut self.ledger, amount)?;
        self.persist();
        Ok(id)
    }

    /// Take cash out of the wallet. Fails with `InsufficientFunds`
    /// when the amount exceeds the cash balance.
    pub fn withdraw(&mut self, amount: f64) -> Result<Uuid, CoreError> {
        let id = self.ledger_service.withdraw(&mut self.ledger, amount)?;
        self.persist();
        Ok(id)
    }

    /// Buy BTC for `cash_amount` at `price` (typically the latest feed
    /// price at call time).
    pub fn buy(&mut self, cash_amount: f64, price: f64) -> Result<Uuid, CoreError> {
        let id = self.ledger_service.buy(&mut self.ledger, cash_amount, price)?;
        self.persist();
        Ok(id)
    }

    /// Sell BTC worth `cash_amount` at `price`.
    pub fn sell(&mut self, cash_amount: f64, price: f64) -> Result<Uuid, CoreError> {
        let id = self.ledger_service.sell(&mut self.ledger, cash_amount, price)?;
        self.persist();
        Ok(id)
    }

    // ── Views ───────────────────────────────────────────────────────

    /// A filtered, 1-based page of transaction history, newest first.
    pub fn history(
        &self,
        filter: TransactionFilter,
        page: usize,
        page_size: usize,
    ) -> Result<HistoryPage<'_>, CoreError> {
        self.history_service
            .page(&self.ledger, filter, page, page_size)
    }

    /// Portfolio value and unrealized P/L at the given price sample.
    #[must_use]
    pub fn valuation(&self, sample: &PriceSample) -> Valuation {
        self.valuation_service.valuate(&self.ledger, sample)
    }

    /// Get a single transaction by its id.
    #[must_use]
    pub fn get_transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.ledger.transactions.iter().find(|tx| tx.id == id)
    }

    // ── Feed ────────────────────────────────────────────────────────

    /// Build a price feed over the configured prediction API. The
    /// caller owns it and decides when to start/stop polling.
    #[must_use]
    pub fn price_feed(&self) -> PriceFeed {
        let source = Arc::new(PredictionApi::new(self.settings.api_base_url.clone()));
        PriceFeed::new(source)
    }

    /// The configured polling interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.settings.poll_interval_secs)
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Change the prediction API base URL. Takes effect for feeds
    /// built after the change.
    pub fn set_api_base_url(&mut self, url: impl Into<String>) -> Result<(), CoreError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() || !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(CoreError::InvalidInput(format!(
                "Invalid API base URL '{url}': must start with http:// or https://"
            )));
        }
        self.settings.api_base_url = trimmed.to_string();
        self.persist();
        Ok(())
    }

    /// Change the feed polling interval.
    pub fn set_poll_interval_secs(&mut self, secs: u64) -> Result<(), CoreError> {
        if secs == 0 {
            return Err(CoreError::InvalidInput(
                "Poll interval must be at least 1 second".into(),
            ));
        }
        self.settings.poll_interval_secs = secs;
        self.persist();
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── State Access ────────────────────────────────────────────────

    #[must_use]
    pub fn cash(&self) -> f64 {
        self.ledger.cash
    }

    #[must_use]
    pub fn asset(&self) -> f64 {
        self.ledger.asset
    }

    #[must_use]
    pub fn purchase_price(&self) -> f64 {
        self.ledger.purchase_price
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.ledger.transactions.len()
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Explicitly flush the current state to the store, propagating
    /// the error (unlike the automatic best-effort saves).
    pub fn save(&mut self) -> Result<(), CoreError> {
        self.store.save(&self.ledger, &self.settings)?;
        self.dirty = false;
        Ok(())
    }

    /// Returns `true` if state has changed since the last successful
    /// save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Best-effort save after a mutation. A write failure must not
    /// fail the operation that triggered it.
    fn persist(&mut self) {
        self.dirty = true;
        match self.store.save(&self.ledger, &self.settings) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist ledger state, continuing");
            }
        }
    }

    fn build(ledger: Ledger, settings: Settings, store: Box<dyn LedgerStore>) -> Self {
        Self {
            ledger,
            settings,
            ledger_service: LedgerService::new(),
            history_service: HistoryService::new(),
            valuation_service: ValuationService::new(),
            store,
            dirty: false,
        }
    }
}
