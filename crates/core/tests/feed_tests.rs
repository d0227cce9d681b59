// ═══════════════════════════════════════════════════════════════════
// Feed Tests — PriceFeed polling, staleness, chart state, teardown
// ═══════════════════════════════════════════════════════════════════

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use paper_trader_core::errors::CoreError;
use paper_trader_core::feed::poller::PriceFeed;
use paper_trader_core::feed::source::{MarketDataSource, Quote};
use paper_trader_core::models::price::{ChartState, Prediction};

// ═══════════════════════════════════════════════════════════════════
// Mock Source
// ═══════════════════════════════════════════════════════════════════

/// Scripted market-data source: each fetch pops the next response.
/// When the script runs out, the last behavior repeats (`repeat_last`).
struct MockSource {
    quotes: Mutex<VecDeque<Result<Quote, CoreError>>>,
    charts: Mutex<VecDeque<Result<Vec<u8>, CoreError>>>,
    quote_calls: AtomicUsize,
}

impl MockSource {
    fn new() -> Self {
        Self {
            quotes: Mutex::new(VecDeque::new()),
            charts: Mutex::new(VecDeque::new()),
            quote_calls: AtomicUsize::new(0),
        }
    }

    fn push_quote(&self, price: f64, prediction: Prediction) {
        self.quotes
            .lock()
            .unwrap()
            .push_back(Ok(Quote { price, prediction }));
    }

    fn push_quote_error(&self) {
        self.quotes.lock().unwrap().push_back(Err(CoreError::Api {
            endpoint: "/predict".into(),
            message: "backend down".into(),
        }));
    }

    fn push_chart(&self, bytes: Vec<u8>) {
        self.charts.lock().unwrap().push_back(Ok(bytes));
    }

    fn push_chart_error(&self) {
        self.charts.lock().unwrap().push_back(Err(CoreError::Api {
            endpoint: "/chart".into(),
            message: "backend down".into(),
        }));
    }
}

#[async_trait]
impl MarketDataSource for MockSource {
    fn name(&self) -> &str {
        "MockSource"
    }

    async fn fetch_quote(&self) -> Result<Quote, CoreError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CoreError::Api {
                    endpoint: "/predict".into(),
                    message: "script exhausted".into(),
                })
            })
    }

    async fn fetch_chart(&self) -> Result<Vec<u8>, CoreError> {
        self.charts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CoreError::Api {
                    endpoint: "/chart".into(),
                    message: "script exhausted".into(),
                })
            })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Sample lifecycle
// ═══════════════════════════════════════════════════════════════════

mod sample {
    use super::*;

    #[tokio::test]
    async fn initial_sample_is_waiting() {
        let feed = PriceFeed::new(Arc::new(MockSource::new()));

        let sample = feed.latest();
        assert!(sample.price.is_none());
        assert_eq!(sample.prediction, Prediction::Waiting);
        assert!(!sample.stale);
        assert_eq!(feed.latest_chart(), ChartState::NotLoaded);
    }

    #[tokio::test]
    async fn successful_poll_applies_fresh_sample() {
        let source = Arc::new(MockSource::new());
        source.push_quote(64_000.0, Prediction::Up);
        source.push_chart(vec![1, 2, 3]);
        let feed = PriceFeed::new(source);

        feed.poll_once().await;

        let sample = feed.latest();
        assert_eq!(sample.price, Some(64_000.0));
        assert_eq!(sample.prediction, Prediction::Up);
        assert!(!sample.stale);
        assert!(sample.fetched_at.is_some());
    }

    #[tokio::test]
    async fn failed_poll_keeps_last_price_and_flags_stale() {
        let source = Arc::new(MockSource::new());
        source.push_quote(64_000.0, Prediction::Up);
        source.push_chart(vec![1]);
        source.push_quote_error();
        source.push_chart(vec![2]);
        let feed = PriceFeed::new(source);

        feed.poll_once().await;
        feed.poll_once().await;

        let sample = feed.latest();
        // Price and prediction survive the failed fetch
        assert_eq!(sample.price, Some(64_000.0));
        assert_eq!(sample.prediction, Prediction::Up);
        assert!(sample.stale);
    }

    #[tokio::test]
    async fn recovery_clears_the_stale_flag() {
        let source = Arc::new(MockSource::new());
        source.push_quote_error();
        source.push_chart_error();
        source.push_quote(65_500.0, Prediction::Down);
        source.push_chart(vec![9]);
        let feed = PriceFeed::new(source);

        feed.poll_once().await;
        assert!(feed.latest().stale);

        feed.poll_once().await;
        let sample = feed.latest();
        assert_eq!(sample.price, Some(65_500.0));
        assert!(!sample.stale);
    }

    #[tokio::test]
    async fn failure_before_first_success_stays_priceless() {
        let source = Arc::new(MockSource::new());
        source.push_quote_error();
        source.push_chart_error();
        let feed = PriceFeed::new(source);

        feed.poll_once().await;

        let sample = feed.latest();
        assert!(sample.price.is_none());
        assert_eq!(sample.prediction, Prediction::Waiting);
        assert!(sample.stale);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Chart state
// ═══════════════════════════════════════════════════════════════════

mod chart {
    use super::*;

    #[tokio::test]
    async fn chart_bytes_are_published() {
        let source = Arc::new(MockSource::new());
        source.push_quote(64_000.0, Prediction::Up);
        source.push_chart(vec![0x89, 0x50, 0x4e, 0x47]);
        let feed = PriceFeed::new(source);

        feed.poll_once().await;

        match feed.latest_chart() {
            ChartState::Ready(bytes) => assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]),
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chart_failure_is_an_explicit_state() {
        let source = Arc::new(MockSource::new());
        source.push_quote(64_000.0, Prediction::Up);
        source.push_chart_error();
        let feed = PriceFeed::new(source);

        feed.poll_once().await;

        // Quote succeeded, chart failed — independent outcomes
        assert_eq!(feed.latest().price, Some(64_000.0));
        assert_eq!(feed.latest_chart(), ChartState::Unavailable);
    }

    #[tokio::test]
    async fn chart_failure_replaces_previous_image() {
        let source = Arc::new(MockSource::new());
        source.push_quote(64_000.0, Prediction::Up);
        source.push_chart(vec![1]);
        source.push_quote(64_100.0, Prediction::Up);
        source.push_chart_error();
        let feed = PriceFeed::new(source);

        feed.poll_once().await;
        assert!(feed.latest_chart().is_ready());

        feed.poll_once().await;
        assert_eq!(feed.latest_chart(), ChartState::Unavailable);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Polling task lifecycle
// ═══════════════════════════════════════════════════════════════════

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn start_polls_immediately_then_on_interval() {
        let source = Arc::new(MockSource::new());
        source.push_quote(64_000.0, Prediction::Up);
        source.push_chart(vec![1]);
        let mut feed = PriceFeed::new(Arc::clone(&source) as Arc<dyn MarketDataSource>);

        feed.start(Duration::from_millis(20));
        assert!(feed.is_running());

        // The first poll fires without waiting for the interval
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(feed.latest().price, Some(64_000.0));
        // And the ticker kept polling afterwards
        assert!(source.quote_calls.load(Ordering::SeqCst) >= 2);

        feed.stop();
    }

    #[tokio::test]
    async fn stop_cancels_future_polls() {
        let source = Arc::new(MockSource::new());
        let mut feed = PriceFeed::new(Arc::clone(&source) as Arc<dyn MarketDataSource>);

        feed.start(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        feed.stop();
        assert!(!feed.is_running());

        let calls_at_stop = source.quote_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(source.quote_calls.load(Ordering::SeqCst), calls_at_stop);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut feed = PriceFeed::new(Arc::new(MockSource::new()));
        feed.start(Duration::from_millis(10));
        feed.stop();
        feed.stop();
        assert!(!feed.is_running());
    }

    #[tokio::test]
    async fn restart_replaces_the_previous_task() {
        let source = Arc::new(MockSource::new());
        source.push_quote(64_000.0, Prediction::Up);
        source.push_chart(vec![1]);
        let mut feed = PriceFeed::new(Arc::clone(&source) as Arc<dyn MarketDataSource>);

        feed.start(Duration::from_millis(10));
        feed.start(Duration::from_millis(10));
        assert!(feed.is_running());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(feed.latest().has_price());
        feed.stop();
    }

    #[tokio::test]
    async fn dropping_the_feed_stops_polling() {
        let source = Arc::new(MockSource::new());
        {
            let mut feed = PriceFeed::new(Arc::clone(&source) as Arc<dyn MarketDataSource>);
            feed.start(Duration::from_millis(10));
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        let calls_after_drop = source.quote_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.quote_calls.load(Ordering::SeqCst), calls_after_drop);
    }
}
