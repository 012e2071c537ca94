//! Price level queue management.
//!
//! A price level holds every resting order at one price, organized as a
//! FIFO queue of arena slots (price-time priority). The cached
//! aggregate quantity is maintained with checked decimal arithmetic;
//! failures surface to the caller instead of being zeroed out.

use std::collections::VecDeque;

use crate::decimal::{Decimal, DecimalError};
use crate::pool::Slot;

/// A single price level in the order book.
#[derive(Debug)]
pub struct PriceLevel {
    /// The level's price.
    pub price: Decimal,
    /// Total remaining quantity across all resting orders.
    /// Invariant: equals the sum of remaining_qty over `orders`.
    total_qty: Decimal,
    /// FIFO queue of order slots; front matches first.
    orders: VecDeque<Slot>,
}

impl PriceLevel {
    /// Create an empty level at `price`.
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            total_qty: Decimal::ZERO,
            orders: VecDeque::new(),
        }
    }

    /// Check if the level has no resting orders.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of resting orders.
    #[inline(always)]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Total remaining quantity at this level.
    #[inline(always)]
    pub fn total_qty(&self) -> Decimal {
        self.total_qty
    }

    /// Append an order to the back of the queue (latest time priority).
    pub fn push_back(&mut self, slot: Slot, qty: Decimal) -> Result<(), DecimalError> {
        self.total_qty = self.total_qty.checked_add(qty)?;
        self.orders.push_back(slot);
        Ok(())
    }

    /// Slot with the best time priority, without removing it.
    #[inline(always)]
    pub fn front(&self) -> Option<Slot> {
        self.orders.front().copied()
    }

    /// Remove the front order from the queue.
    ///
    /// Does not touch `total_qty`; the caller accounts for the filled
    /// quantity via [`PriceLevel::reduce_qty`].
    #[inline(always)]
    pub fn pop_front(&mut self) -> Option<Slot> {
        self.orders.pop_front()
    }

    /// Remove a specific slot from anywhere in the queue (cancellation).
    ///
    /// Returns `false` if the slot is not resident in this level.
    pub fn remove(&mut self, slot: Slot) -> bool {
        match self.orders.iter().position(|&s| s == slot) {
            Some(pos) => {
                self.orders.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Reduce the cached aggregate after a fill or cancellation.
    pub fn reduce_qty(&mut self, qty: Decimal) -> Result<(), DecimalError> {
        self.total_qty = self.total_qty.checked_sub(qty)?;
        debug_assert!(!self.total_qty.is_negative(), "level quantity underflow");
        Ok(())
    }

    /// Iterate resting slots in time-priority order.
    pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
        self.orders.iter().copied()
    }
}
