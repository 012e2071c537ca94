//! Execution venue capability.
//!
//! The pipeline depends only on the three-method surface below; which
//! concrete venue is wired in (paper simulation, discard, or a live
//! adapter from an outer crate) is invisible to the core.

use rustc_hash::FxHashSet;
use thiserror::Error;

use kestrel_core::{Decimal, Order, OrderId};

/// Errors reported by an execution venue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// The venue is not reachable.
    #[error("execution venue unavailable")]
    Unavailable,
    /// The venue refused the order.
    #[error("order rejected by venue")]
    Rejected,
    /// Cancel target is unknown to the venue.
    #[error("unknown order id")]
    UnknownOrder,
}

/// Venue acknowledgement for a submitted order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExecutionResult {
    /// Order the venue acted on.
    pub order_id: OrderId,
    /// Quantity the venue reports as filled.
    pub filled_qty: Decimal,
    /// Average fill price, zero when nothing filled.
    pub avg_price: Decimal,
}

/// Venue health as seen by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorStatus {
    /// Accepting orders.
    Ready,
    /// Not accepting orders.
    Offline,
}

/// Capability surface for order egress.
pub trait ExecutionVenue {
    /// Submit an order for execution.
    fn send_order(&mut self, order: &Order) -> Result<ExecutionResult, ExecutorError>;

    /// Request cancellation of a previously sent order.
    fn cancel_order(&mut self, id: OrderId) -> Result<(), ExecutorError>;

    /// Current venue health.
    fn status(&self) -> ExecutorStatus;
}

/// Paper-trading venue: acknowledges every order as immediately filled
/// at its own price. Useful for dry runs and tests.
#[derive(Default)]
pub struct PaperExecutor {
    seen: FxHashSet<OrderId>,
    orders_sent: u64,
}

impl PaperExecutor {
    /// Create a fresh paper venue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders acknowledged so far.
    pub fn orders_sent(&self) -> u64 {
        self.orders_sent
    }
}

impl ExecutionVenue for PaperExecutor {
    fn send_order(&mut self, order: &Order) -> Result<ExecutionResult, ExecutorError> {
        self.seen.insert(order.id);
        self.orders_sent += 1;
        Ok(ExecutionResult {
            order_id: order.id,
            filled_qty: order.quantity,
            avg_price: order.price,
        })
    }

    fn cancel_order(&mut self, id: OrderId) -> Result<(), ExecutorError> {
        if self.seen.remove(&id) {
            Ok(())
        } else {
            Err(ExecutorError::UnknownOrder)
        }
    }

    fn status(&self) -> ExecutorStatus {
        ExecutorStatus::Ready
    }
}

/// Discard-only venue: accepts everything and executes nothing.
#[derive(Default)]
pub struct NullExecutor;

impl NullExecutor {
    /// Create a discard venue.
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionVenue for NullExecutor {
    fn send_order(&mut self, order: &Order) -> Result<ExecutionResult, ExecutorError> {
        Ok(ExecutionResult {
            order_id: order.id,
            filled_qty: Decimal::ZERO,
            avg_price: Decimal::ZERO,
        })
    }

    fn cancel_order(&mut self, _id: OrderId) -> Result<(), ExecutorError> {
        Ok(())
    }

    fn status(&self) -> ExecutorStatus {
        ExecutorStatus::Ready
    }
}
