use serde::{Deserialize, Serialize};

/// Default base URL of the prediction/chart backend.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default feed polling interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// User-configurable settings, persisted alongside the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the prediction/chart API
    pub api_base_url: String,

    /// Seconds between feed polls
    pub poll_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}
