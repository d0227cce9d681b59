use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::source::{MarketDataSource, Quote};
use crate::errors::CoreError;
use crate::models::price::Prediction;

/// HTTP client for the prediction backend.
///
/// - `GET {base}/predict` → `{ "price": <number|string>, "prediction": <label> }`
/// - `GET {base}/chart`   → binary image payload
///
/// The backend serves `price` as a JSON number but older builds sent a
/// numeric string; both are accepted.
pub struct PredictionApi {
    client: Client,
    base_url: String,
}

impl PredictionApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// ── Prediction API response types ───────────────────────────────────

#[derive(Deserialize)]
struct PredictResponse {
    price: RawPrice,
    prediction: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn parse(&self) -> Result<f64, CoreError> {
        match self {
            RawPrice::Number(n) => Ok(*n),
            RawPrice::Text(s) => s.trim().parse().map_err(|e| CoreError::Api {
                endpoint: "/predict".into(),
                message: format!("Invalid price format '{s}': {e}"),
            }),
        }
    }
}

#[async_trait]
impl MarketDataSource for PredictionApi {
    fn name(&self) -> &str {
        "PredictionApi"
    }

    async fn fetch_quote(&self) -> Result<Quote, CoreError> {
        let url = format!("{}/predict", self.base_url);
        let resp: PredictResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                endpoint: "/predict".into(),
                message: format!("Failed to parse prediction response: {e}"),
            })?;

        let price = resp.price.parse()?;
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::Api {
                endpoint: "/predict".into(),
                message: format!("Invalid price returned: {price} (must be finite and positive)"),
            });
        }

        Ok(Quote {
            price,
            prediction: Prediction::parse(&resp.prediction),
        })
    }

    async fn fetch_chart(&self) -> Result<Vec<u8>, CoreError> {
        let url = format!("{}/chart", self.base_url);
        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if bytes.is_empty() {
            return Err(CoreError::Api {
                endpoint: "/chart".into(),
                message: "Empty chart payload".into(),
            });
        }

        Ok(bytes.to_vec())
    }
}
