pub mod history_service;
pub mod ledger_service;
pub mod valuation_service;
