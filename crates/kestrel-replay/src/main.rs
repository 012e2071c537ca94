//! Kestrel Replay - synthetic feed replay and latency benchmark.
//!
//! A feed thread publishes synthetic market ticks into an SPSC ring;
//! the main thread drains the ring into a tick pipeline with a paper
//! execution venue and reports latency distributions.

use std::thread;

use clap::Parser;
use tracing::info;

use kestrel_core::{ClientId, Decimal, OrderType, Side, SymbolId};
use kestrel_engine::{
    MarketTick, PaperExecutor, PipelineConfig, PipelineError, SpreadStrategy, StrategyParams,
    TickPipeline,
};
use kestrel_metrics::{LatencyHistogram, MonotonicClock};
use kestrel_ring::SpscRing;

/// Ring capacity; one slot stays reserved, so 65535 ticks fit.
const RING_CAPACITY: usize = 65536;

#[derive(Parser, Debug)]
#[command(name = "kestrel-replay", about = "Synthetic tick replay benchmark")]
struct Args {
    /// Number of ticks to replay.
    #[arg(long, default_value_t = 500_000)]
    ticks: u64,

    /// Per-tick latency warning threshold, nanoseconds.
    #[arg(long, default_value_t = 1_000_000)]
    warn_ns: u64,

    /// Minimum edge the strategy requires, e.g. "0.05".
    #[arg(long, default_value = "0.05")]
    min_edge: String,
}

/// Random-walk top-of-book generator.
struct TickGenerator {
    symbol: SymbolId,
    mid_raw: i128,
    sequence: u64,
    state: u64,
}

impl TickGenerator {
    fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            mid_raw: Decimal::from_int(150).raw(),
            sequence: 0,
            state: 0x9e3779b97f4a7c15,
        }
    }

    // xorshift; determinism matters more than quality here
    fn next_rand(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_tick(&mut self) -> MarketTick {
        let step = (self.next_rand() % 21) as i128 - 10; // +/- 10 ticks of 0.001
        self.mid_raw += step * (Decimal::SCALE / 1000);
        let half_spread = Decimal::SCALE / 25; // 0.04
        self.sequence += 1;
        MarketTick {
            symbol: self.symbol,
            bid: Decimal::from_raw(self.mid_raw - half_spread),
            ask: Decimal::from_raw(self.mid_raw + half_spread),
            bid_size: Decimal::from_int(500),
            ask_size: Decimal::from_int(500),
            timestamp: self.sequence * 1_000,
            sequence: self.sequence,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let min_edge: Decimal = args
        .min_edge
        .parse()
        .unwrap_or_else(|e| panic!("invalid --min-edge {:?}: {e}", args.min_edge));

    let symbol = SymbolId(1);
    let mut pipeline = TickPipeline::new(
        PipelineConfig {
            symbol,
            latency_warn_ns: args.warn_ns,
            ..PipelineConfig::default()
        },
        Box::new(PaperExecutor::new()),
        Box::new(MonotonicClock::new()),
    );
    pipeline.register_strategy(Box::new(SpreadStrategy::new(
        "spread",
        StrategyParams {
            min_edge,
            ..StrategyParams::default()
        },
    )));

    // Passive liquidity around the generator's starting mid so the
    // strategy's orders have something to cross.
    for i in 0..200i64 {
        let offset = Decimal::from_raw(i as i128 * Decimal::SCALE / 100);
        pipeline
            .book_mut()
            .add_order(
                Side::Sell,
                OrderType::Limit,
                Decimal::from_int(150).checked_add(offset).expect("seed price"),
                Decimal::from_int(10_000),
                ClientId(99),
                0,
            )
            .expect("seed ask");
        pipeline
            .book_mut()
            .add_order(
                Side::Buy,
                OrderType::Limit,
                Decimal::from_int(149).checked_sub(offset).expect("seed price"),
                Decimal::from_int(10_000),
                ClientId(99),
                0,
            )
            .expect("seed bid");
    }

    info!(ticks = args.ticks, "starting replay");

    let mut ring: SpscRing<MarketTick, RING_CAPACITY> = SpscRing::new();
    let (mut producer, mut consumer) = ring.split();
    let total = args.ticks;

    let mut hist = LatencyHistogram::new();
    let mut dropped = 0u64;
    let mut consumed = 0u64;

    thread::scope(|s| {
        s.spawn(move || {
            let mut generator = TickGenerator::new(symbol);
            for _ in 0..total {
                let tick = generator.next_tick();
                // Caller-side backpressure policy: spin until space
                while !producer.try_push(tick) {
                    thread::yield_now();
                }
            }
        });

        while consumed < total {
            let Some(tick) = consumer.try_pop() else {
                thread::yield_now();
                continue;
            };
            consumed += 1;
            match pipeline.process_tick(tick) {
                Ok(report) => hist.record(report.latency_ns),
                Err(PipelineError::PoolExhausted) => dropped += 1,
                Err(PipelineError::Book(err)) => {
                    // Arithmetic or capacity trouble on this tick only
                    tracing::warn!(%err, sequence = tick.sequence, "tick skipped");
                    dropped += 1;
                }
            }
        }
    });

    println!("Replayed {} ticks ({} dropped)", consumed, dropped);
    println!(
        "Processed {} ticks: {} book trades, {} venue errors",
        pipeline.ticks_processed(),
        pipeline.book().trades().len(),
        pipeline.executor_errors(),
    );
    hist.print_summary("  Tick Latency");
    println!(
        "  Average: {}   Peak: {}",
        LatencyHistogram::format_latency(pipeline.latency().average_ns()),
        LatencyHistogram::format_latency(pipeline.latency().peak_ns()),
    );
}
