use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::transaction::{Transaction, TransactionFilter};

/// One page of transaction history, newest first.
#[derive(Debug, Clone)]
pub struct HistoryPage<'a> {
    /// The transactions on this page
    pub transactions: Vec<&'a Transaction>,

    /// Requested page number (1-based)
    pub page: usize,

    /// Total pages for the filtered history (0 when empty)
    pub total_pages: usize,

    /// Total filtered transaction count across all pages
    pub total_count: usize,
}

/// Read-only, paginated view over the ledger's transaction history.
///
/// Filtering is applied before pagination, so "page 1 of trades" is the
/// ten most recent buys/sells regardless of interleaved deposits.
pub struct HistoryService;

impl HistoryService {
    pub fn new() -> Self {
        Self
    }

    /// Slice the (filtered) history into a 1-based page.
    ///
    /// A page number past the end yields an empty page with the correct
    /// totals, so callers can clamp their own pagination controls.
    pub fn page<'a>(
        &self,
        ledger: &'a Ledger,
        filter: TransactionFilter,
        page: usize,
        page_size: usize,
    ) -> Result<HistoryPage<'a>, CoreError> {
        if page == 0 {
            return Err(CoreError::InvalidInput(
                "page numbers are 1-based, got 0".into(),
            ));
        }
        if page_size == 0 {
            return Err(CoreError::InvalidInput("page size must be positive".into()));
        }

        // History is stored newest-first, so filtering preserves order.
        let filtered: Vec<&Transaction> = ledger
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx.kind))
            .collect();

        let total_count = filtered.len();
        let total_pages = total_count.div_ceil(page_size);

        let start = (page - 1).saturating_mul(page_size);
        let transactions = if start >= total_count {
            Vec::new()
        } else {
            filtered[start..(start + page_size).min(total_count)].to_vec()
        };

        Ok(HistoryPage {
            transactions,
            page,
            total_pages,
            total_count,
        })
    }
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new()
    }
}
