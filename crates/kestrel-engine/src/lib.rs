//! # Kestrel Engine
//!
//! Tick-to-signal processing pipeline: pooled tick ingestion, strategy
//! evaluation, order-book replay, and execution-venue egress.
//!
//! The pipeline owns one [`kestrel_core::OrderBook`] and is single
//! threaded; ticks cross the thread boundary through `kestrel-ring`.

pub mod executor;
pub mod pipeline;
pub mod strategy;
pub mod tick;

pub use executor::{
    ExecutionResult, ExecutionVenue, ExecutorError, ExecutorStatus, NullExecutor, PaperExecutor,
};
pub use pipeline::{PipelineConfig, PipelineError, TickPipeline, TickReport};
pub use strategy::{SpreadStrategy, Strategy, StrategyParams, MAX_TICK_WINDOW};
pub use tick::{MarketTick, Signal, SignalAction};
