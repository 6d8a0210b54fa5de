use crate::config::AppConfig;
use crate::feeds::market_data::{MarketDataService, SourcedQuote};
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

// ── Messages OUT to dashboard clients ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "quote")]
    Quote(SourcedQuote),

    #[serde(rename = "feed_error")]
    FeedError { symbol: String, error: String },
}

// ── Performance Counters (lock-free) ──

#[derive(Debug, Default)]
pub struct PerfCounters {
    pub quotes_fetched: AtomicU64,
    pub mock_fallbacks: AtomicU64,
    pub analyses_run: AtomicU64,
    pub requests_rejected: AtomicU64,
    pub ws_messages_sent: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            quotes_fetched: self.quotes_fetched.load(Ordering::Relaxed),
            mock_fallbacks: self.mock_fallbacks.load(Ordering::Relaxed),
            analyses_run: self.analyses_run.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            ws_messages_sent: self.ws_messages_sent.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CountersSnapshot {
    pub quotes_fetched: u64,
    pub mock_fallbacks: u64,
    pub analyses_run: u64,
    pub requests_rejected: u64,
    pub ws_messages_sent: u64,
}

// ── Application shared state (channels, not locks) ──

pub struct AppState {
    pub config: AppConfig,
    pub market_data: MarketDataService,

    // Feed -> Dashboard: latest watched quote (watch = single producer, multi consumer)
    pub quote_tx: watch::Sender<Option<SourcedQuote>>,
    pub quote_rx: watch::Receiver<Option<SourcedQuote>>,

    // Feed -> Dashboard: event stream (broadcast for WS clients)
    pub ws_tx: broadcast::Sender<WsMessage>,

    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let (ws_tx, _) = broadcast::channel(256);
        let (quote_tx, quote_rx) = watch::channel(None);
        let market_data = MarketDataService::new(&config);

        Arc::new(Self {
            config,
            market_data,
            quote_tx,
            quote_rx,
            ws_tx,
            counters: PerfCounters::new(),
        })
    }

    #[inline]
    pub fn broadcast(&self, msg: WsMessage) {
        self.counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
        let _ = self.ws_tx.send(msg);
    }

    #[inline]
    pub fn latest_quote(&self) -> Option<SourcedQuote> {
        self.quote_rx.borrow().clone()
    }
}
