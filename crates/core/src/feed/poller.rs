use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::source::MarketDataSource;
use crate::models::price::{ChartState, PriceSample};

/// State shared between the poller task and its readers.
struct FeedShared {
    sample: Mutex<PriceSample>,
    chart: Mutex<ChartState>,
}

/// Periodically polls the market-data source and publishes the latest
/// price sample and chart image.
///
/// One background tokio task per feed: an immediate first poll, then
/// one per interval tick. Each poll fetches the quote and the chart
/// independently — a failure of either flags a degraded state
/// (`stale` sample / `Unavailable` chart) without disturbing the last
/// good price.
///
/// `stop()` aborts the task, so a fetch in flight at stop time is
/// dropped at its await point and its result is never applied. Dropping
/// the feed stops it too, so the task can't outlive its owner.
pub struct PriceFeed {
    source: Arc<dyn MarketDataSource>,
    shared: Arc<FeedShared>,
    task: Option<JoinHandle<()>>,
}

impl PriceFeed {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            shared: Arc::new(FeedShared {
                sample: Mutex::new(PriceSample::waiting()),
                chart: Mutex::new(ChartState::NotLoaded),
            }),
            task: None,
        }
    }

    /// Begin periodic polling. Restarting replaces any running task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, interval: Duration) {
        self.stop();

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately; a slow fetch delays the
            // next tick instead of stacking overlapping fetches.
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll(source.as_ref(), &shared).await;
            }
        }));
    }

    /// Cancel future polls. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether a polling task is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Run a single fetch/apply cycle without the timer — used for an
    /// explicit "refresh now" and by tests.
    pub async fn poll_once(&self) {
        poll(self.source.as_ref(), &self.shared).await;
    }

    /// The most recent applied price sample. Returns the initial
    /// waiting sample before the first successful fetch.
    #[must_use]
    pub fn latest(&self) -> PriceSample {
        self.shared
            .sample
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The current chart image state.
    #[must_use]
    pub fn latest_chart(&self) -> ChartState {
        self.shared
            .chart
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One poll: fetch the quote and the chart, apply whatever succeeded.
async fn poll(source: &dyn MarketDataSource, shared: &FeedShared) {
    match source.fetch_quote().await {
        Ok(quote) => {
            let mut sample = shared.sample.lock().unwrap_or_else(|e| e.into_inner());
            *sample = PriceSample::fresh(quote.price, quote.prediction);
        }
        Err(e) => {
            tracing::warn!(source = source.name(), error = %e, "price fetch failed, keeping last sample");
            let mut sample = shared.sample.lock().unwrap_or_else(|e| e.into_inner());
            sample.stale = true;
        }
    }

    match source.fetch_chart().await {
        Ok(bytes) => {
            let mut chart = shared.chart.lock().unwrap_or_else(|e| e.into_inner());
            *chart = ChartState::Ready(bytes);
        }
        Err(e) => {
            tracing::warn!(source = source.name(), error = %e, "chart fetch failed");
            let mut chart = shared.chart.lock().unwrap_or_else(|e| e.into_inner());
            *chart = ChartState::Unavailable;
        }
    }
}
