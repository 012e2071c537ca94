//! Tick-to-signal orchestration.
//!
//! For every market tick the pipeline runs each registered strategy
//! once, turns at most one signal per strategy into an order, replays
//! that order into the local book for bookkeeping, forwards it to the
//! execution venue, and tracks per-tick latency.

use thiserror::Error;
use tracing::{debug, warn};

use kestrel_core::{
    BookError, ClientId, Decimal, OrderBook, OrderStatus, OrderType, Side, SlotPool, SymbolId,
};
use kestrel_metrics::{Clock, LatencyStats};

use crate::executor::{ExecutionVenue, ExecutorStatus};
use crate::strategy::Strategy;
use crate::tick::{MarketTick, SignalAction};

/// Errors surfaced by tick processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Tick pool saturated. Backpressure: drop, retry, or escalate.
    #[error("tick pool exhausted")]
    PoolExhausted,
    /// The internal book rejected a signal's order.
    #[error("book error: {0}")]
    Book(#[from] BookError),
}

/// Pipeline tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    /// Symbol this pipeline trades.
    pub symbol: SymbolId,
    /// Capacity of the pooled tick slots (power of two).
    pub tick_pool_capacity: usize,
    /// Capacity of the book's order arena (power of two).
    pub book_capacity: usize,
    /// Per-tick latency above this emits a non-fatal warning.
    pub latency_warn_ns: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbol: SymbolId(0),
            tick_pool_capacity: 1024,
            book_capacity: 1 << 16,
            latency_warn_ns: 1_000_000, // 1 ms
        }
    }
}

/// Outcome summary for one processed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Actionable (non-hold) signals emitted.
    pub signals: usize,
    /// Trades produced in the local book by those signals.
    pub trades: usize,
    /// Wall time spent processing the tick, nanoseconds.
    pub latency_ns: u64,
}

/// The per-symbol orchestrator.
///
/// Owned by exactly one thread; ticks typically arrive through a
/// `kestrel-ring` consumer on that thread.
pub struct TickPipeline {
    config: PipelineConfig,
    book: OrderBook,
    tick_pool: SlotPool<MarketTick>,
    strategies: Vec<Box<dyn Strategy>>,
    executor: Box<dyn ExecutionVenue>,
    clock: Box<dyn Clock>,
    latency: LatencyStats,
    executor_errors: u64,
    ticks_processed: u64,
}

impl TickPipeline {
    /// Create a pipeline around the given venue and clock.
    pub fn new(
        config: PipelineConfig,
        executor: Box<dyn ExecutionVenue>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            book: OrderBook::new(config.symbol, config.book_capacity),
            tick_pool: SlotPool::with_capacity(config.tick_pool_capacity),
            strategies: Vec::new(),
            executor,
            clock,
            latency: LatencyStats::new(),
            executor_errors: 0,
            ticks_processed: 0,
            config,
        }
    }

    /// Register a strategy. Strategies run in registration order.
    pub fn register_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    /// Process one market tick.
    pub fn process_tick(&mut self, tick: MarketTick) -> Result<TickReport, PipelineError> {
        let slot = self
            .tick_pool
            .insert(tick)
            .ok_or(PipelineError::PoolExhausted)?;

        let start = self.clock.now_ns();
        let result = self.run_strategies(&tick, start);
        let latency_ns = self.clock.now_ns().saturating_sub(start);

        self.tick_pool.release(slot);
        self.ticks_processed += 1;
        self.latency.record(latency_ns);
        if latency_ns > self.config.latency_warn_ns {
            warn!(
                latency_ns,
                threshold_ns = self.config.latency_warn_ns,
                sequence = tick.sequence,
                "tick processing exceeded latency threshold"
            );
        }

        let (signals, trades) = result?;
        Ok(TickReport {
            signals,
            trades,
            latency_ns,
        })
    }

    fn run_strategies(
        &mut self,
        tick: &MarketTick,
        now_ns: u64,
    ) -> Result<(usize, usize), PipelineError> {
        let trades_before = self.book.trades().len();
        let mut signals = 0;

        for strategy in &mut self.strategies {
            let Some(signal) = strategy.on_tick(tick) else {
                continue; // tick unusable for this strategy
            };
            let side = match signal.action {
                SignalAction::Buy => Side::Buy,
                SignalAction::Sell => Side::Sell,
                SignalAction::Hold => continue,
            };
            signals += 1;

            // Replay into the local book for internal bookkeeping.
            let order = self.book.add_order(
                side,
                OrderType::Limit,
                signal.target_price,
                signal.quantity,
                ClientId(0),
                now_ns,
            )?;

            // Forward to the venue. Failures are backpressure-style
            // conditions for the layer above, never fatal here.
            if let Err(err) = self.executor.send_order(&order) {
                self.executor_errors += 1;
                warn!(
                    strategy = strategy.name(),
                    order_id = order.id.0,
                    %err,
                    "execution venue rejected order"
                );
            }

            // State transitions happen only on a confirmed book fill.
            if order.status == OrderStatus::Filled {
                debug!(
                    strategy = strategy.name(),
                    order_id = order.id.0,
                    qty = %order.quantity,
                    "order filled"
                );
                strategy.on_fill(&order);
            }
        }

        Ok((signals, self.book.trades().len() - trades_before))
    }

    /// The pipeline's internal book.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Mutable book access, for seeding liquidity and maintenance by
    /// the owning layer.
    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    /// Latency statistics over all processed ticks.
    pub fn latency(&self) -> &LatencyStats {
        &self.latency
    }

    /// Ticks processed so far.
    pub fn ticks_processed(&self) -> u64 {
        self.ticks_processed
    }

    /// Venue send failures observed so far.
    pub fn executor_errors(&self) -> u64 {
        self.executor_errors
    }

    /// Health of the wired execution venue.
    pub fn executor_status(&self) -> ExecutorStatus {
        self.executor.status()
    }
}
