use futures::future;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::chain::tick_reader::TickReader;
use crate::engine::book::{project_order_book, OrderBookConfig};
use crate::engine::buckets::price_decimals;
use crate::engine::format::LevelUnits;
use crate::models::{OrderBook, OrderBookLevel, PoolDescriptor};

/// Latest outcome of the polling loop.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBookState {
    Loading,
    Failed(String),
    Ready(OrderBook),
}

/// What consumers read: the current book plus loading/error flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookView {
    pub asks: Vec<OrderBookLevel>,
    pub bids: Vec<OrderBookLevel>,
    pub last_price: Option<String>,
    pub last_price_raw: Option<f64>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
}

impl From<&OrderBookState> for OrderBookView {
    fn from(state: &OrderBookState) -> Self {
        let empty = |is_loading, error: Option<String>| OrderBookView {
            asks: Vec::new(),
            bids: Vec::new(),
            last_price: None,
            last_price_raw: None,
            is_loading,
            is_error: error.is_some(),
            error,
        };
        match state {
            OrderBookState::Loading => empty(true, None),
            OrderBookState::Failed(e) => empty(false, Some(e.clone())),
            OrderBookState::Ready(book) => OrderBookView {
                asks: book.asks.clone(),
                bids: book.bids.clone(),
                last_price: book.last_price.clone(),
                last_price_raw: book.last_price_raw,
                is_loading: false,
                is_error: false,
                error: None,
            },
        }
    }
}

/// Re-reads the pool on demand and keeps the most recent projection.
///
/// Every `refresh` takes a new generation number; a pass that finishes after a newer one
/// started is dropped, so an older snapshot never overwrites a newer one.
pub struct OrderBookService<R> {
    reader: R,
    pool: PoolDescriptor,
    config: OrderBookConfig,
    units: LevelUnits,
    generation: AtomicU64,
    latest: RwLock<OrderBookState>,
}

impl<R: TickReader> OrderBookService<R> {
    pub fn new(reader: R, pool: PoolDescriptor, config: OrderBookConfig, units: LevelUnits) -> Self {
        Self {
            reader,
            pool,
            config,
            units,
            generation: AtomicU64::new(0),
            latest: RwLock::new(OrderBookState::Loading),
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub async fn state(&self) -> OrderBookState {
        self.latest.read().await.clone()
    }

    pub async fn snapshot(&self) -> OrderBookView {
        OrderBookView::from(&*self.latest.read().await)
    }

    /// Run one pass. Returns false when the result was superseded and discarded.
    pub async fn refresh(&self) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        let state = self.compute().await;

        let mut latest = self.latest.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("Discarding stale order book pass #{}", generation);
            return false;
        }
        match &state {
            OrderBookState::Ready(book) => log::info!(
                "Order book pass #{} in {:?}: {} bids, {} asks, last {:?}",
                generation,
                started.elapsed(),
                book.bids.len(),
                book.asks.len(),
                book.last_price
            ),
            OrderBookState::Failed(e) => log::error!("Order book pass #{} failed: {}", generation, e),
            OrderBookState::Loading => {}
        }
        *latest = state;
        true
    }

    async fn compute(&self) -> OrderBookState {
        let ticks = self.config.tick_range(self.pool.tick_spacing);
        if self.config.validate().is_err() || ticks.is_empty() {
            log::warn!(
                "No ticks to read for window [{}, {}] at spacing {}",
                self.config.min_price_tick,
                self.config.max_price_tick,
                self.pool.tick_spacing
            );
            return OrderBookState::Ready(OrderBook::empty(price_decimals(self.config.bucket_size)));
        }

        let (live, reads) = future::join(self.reader.read_pool_state(), self.reader.read_ticks(&ticks)).await;
        match (live, reads) {
            (Ok(live), Ok(reads)) => {
                OrderBookState::Ready(project_order_book(&reads, &self.pool, &live, &self.config, &self.units))
            }
            (Err(e), _) | (_, Err(e)) => OrderBookState::Failed(e.to_string()),
        }
    }

    /// Poll forever at `interval`. The first pass starts immediately.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.refresh().await;
        }
    }
}
