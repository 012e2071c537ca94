//! # Kestrel Core
//!
//! Per-symbol order book and matching engine built on fixed-point
//! decimal arithmetic.
//!
//! ## Design Principles
//! - No allocation in the matching hot path (fixed order arena)
//! - Fixed-point arithmetic (no floats in money math)
//! - Single-threaded, externally synchronized ownership
//! - Arithmetic failures surface as typed errors, never as zeros

pub mod book;
pub mod decimal;
pub mod level;
pub mod order;
pub mod pool;

pub use book::{BookDepth, BookError, CancelOutcome, LevelView, OrderBook};
pub use decimal::{Decimal, DecimalError};
pub use level::PriceLevel;
pub use order::{
    ClientId, Order, OrderId, OrderStatus, OrderType, Side, SymbolId, Trade, TradeId,
};
pub use pool::{Slot, SlotPool};
