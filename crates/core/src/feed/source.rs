use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::price::Prediction;

/// A price/prediction reading from the external service.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Current price in currency units per BTC
    pub price: f64,

    /// Model prediction attached to the price
    pub prediction: Prediction,
}

/// Trait abstraction for the external market-data service.
///
/// The poller only sees this trait; the HTTP client lives behind it, so
/// tests (and any replacement backend) swap in their own source without
/// touching the feed.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the current price and prediction label.
    async fn fetch_quote(&self) -> Result<Quote, CoreError>;

    /// Fetch the current chart image as opaque bytes.
    async fn fetch_chart(&self) -> Result<Vec<u8>, CoreError>;
}
