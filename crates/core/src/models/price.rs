use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prediction label attached to a price sample.
///
/// The closed set the rest of the system understands. Labels the API
/// returns outside this set map to `Unknown` rather than failing the
/// whole sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    /// Model expects the price to rise
    Up,
    /// Model expects the price to fall
    Down,
    /// No prediction yet (model warming up / before first fetch)
    Waiting,
    /// Unrecognized label from the API
    Unknown,
}

impl Prediction {
    /// Parse an API label, case-insensitively. Anything unrecognized
    /// becomes `Unknown`.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "UP" => Prediction::Up,
            "DOWN" => Prediction::Down,
            "WAITING" => Prediction::Waiting,
            _ => Prediction::Unknown,
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prediction::Up => write!(f, "UP"),
            Prediction::Down => write!(f, "DOWN"),
            Prediction::Waiting => write!(f, "WAITING"),
            Prediction::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// The latest known price/prediction reading from the feed.
///
/// Replaced wholesale on every successful poll. On a failed poll the
/// prior price and prediction are kept and `stale` is set, so consumers
/// keep rendering the last good value with a degraded-state marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Last successfully fetched price; `None` before the first success
    pub price: Option<f64>,

    /// Prediction label from the last successful fetch
    pub prediction: Prediction,

    /// Set when the most recent fetch attempt failed
    pub stale: bool,

    /// When the price was last successfully fetched
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PriceSample {
    /// The initial sample, before any fetch has succeeded.
    #[must_use]
    pub fn waiting() -> Self {
        Self {
            price: None,
            prediction: Prediction::Waiting,
            stale: false,
            fetched_at: None,
        }
    }

    /// A fresh sample from a successful fetch.
    #[must_use]
    pub fn fresh(price: f64, prediction: Prediction) -> Self {
        Self {
            price: Some(price),
            prediction,
            stale: false,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Whether any price has ever been fetched successfully.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

impl Default for PriceSample {
    fn default() -> Self {
        Self::waiting()
    }
}

/// State of the chart image fetched alongside the price.
///
/// The bytes are opaque to the core — the UI renders them. Fetch
/// failure is an explicit state so the UI shows "unavailable" instead
/// of a silent blank.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    /// No fetch attempted yet
    NotLoaded,
    /// Last fetch succeeded; raw image bytes
    Ready(Vec<u8>),
    /// Last fetch failed
    Unavailable,
}

impl ChartState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, ChartState::Ready(_))
    }
}
