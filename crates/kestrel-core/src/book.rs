//! Per-symbol order book and price-time priority matching.
//!
//! Orders live in a fixed-capacity arena and are addressed by stable
//! slots; price levels hold slots, never pointers, so cancellation and
//! level removal cannot dangle. Both sides are kept strictly sorted
//! with at most one level per distinct price. All id counters are
//! scoped to the owning book instance.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::decimal::{Decimal, DecimalError};
use crate::level::PriceLevel;
use crate::order::{ClientId, Order, OrderId, OrderStatus, OrderType, Side, SymbolId, Trade, TradeId};
use crate::pool::{Slot, SlotPool};

/// Errors surfaced by order submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BookError {
    /// Order arena exhausted. Backpressure, not fatal.
    #[error("order arena exhausted")]
    PoolExhausted,
    /// Quantity must be strictly positive.
    #[error("invalid order quantity")]
    InvalidQuantity,
    /// Priced orders need a strictly positive price.
    #[error("invalid order price")]
    InvalidPrice,
    /// Decimal arithmetic failed while matching. Surfaced, never
    /// silently treated as zero.
    #[error("arithmetic failure during matching: {0}")]
    Arithmetic(#[from] DecimalError),
}

/// Three-way cancellation result. "Not found" and "already terminal"
/// are deliberately distinct so callers can branch on either.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Order was live and has been removed from its level.
    Cancelled,
    /// No order with that id exists in this book.
    NotFound,
    /// Order exists but was already filled, cancelled, or rejected.
    AlreadyTerminal,
}

/// Read-only snapshot of one price level for depth queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelView {
    /// Level price.
    pub price: Decimal,
    /// Total remaining quantity.
    pub total_qty: Decimal,
    /// Number of resting orders.
    pub order_count: usize,
}

/// Top-N depth snapshot, best levels first on both sides.
#[derive(Clone, Debug, Default)]
pub struct BookDepth {
    /// Bid levels, descending by price.
    pub bids: Vec<LevelView>,
    /// Ask levels, ascending by price.
    pub asks: Vec<LevelView>,
}

/// The order book for a single symbol.
///
/// Not internally synchronized: owned and mutated by exactly one
/// thread, or wrapped in caller-supplied mutual exclusion.
pub struct OrderBook {
    symbol: SymbolId,
    /// Bid levels; iterated descending for best-first order.
    bids: BTreeMap<Decimal, PriceLevel>,
    /// Ask levels; iterated ascending for best-first order.
    asks: BTreeMap<Decimal, PriceLevel>,
    /// Append-only trade log.
    trades: Vec<Trade>,
    /// id -> arena slot. Orders stay addressable after going terminal.
    index: FxHashMap<OrderId, Slot>,
    /// Order arena. Slots are stable for the life of the book.
    arena: SlotPool<Order>,
    next_order_id: u64,
    next_trade_id: u64,
}

impl OrderBook {
    /// Create a book for `symbol` with a fixed order arena capacity
    /// (must be a power of two).
    pub fn new(symbol: SymbolId, arena_capacity: usize) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            trades: Vec::new(),
            index: FxHashMap::default(),
            arena: SlotPool::with_capacity(arena_capacity),
            next_order_id: 1,
            next_trade_id: 1,
        }
    }

    /// Symbol this book trades.
    #[inline(always)]
    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    /// Submit an order. Matches immediately; any limit remainder rests
    /// at its sorted position, any market remainder is cancelled.
    ///
    /// Returns a snapshot of the order after matching completes.
    pub fn add_order(
        &mut self,
        side: Side,
        order_type: OrderType,
        price: Decimal,
        quantity: Decimal,
        client_id: ClientId,
        timestamp: u64,
    ) -> Result<Order, BookError> {
        if !quantity.is_positive() {
            return Err(BookError::InvalidQuantity);
        }
        let priced = order_type.should_rest();
        if priced && !price.is_positive() {
            return Err(BookError::InvalidPrice);
        }

        let id = OrderId(self.next_order_id);
        let order = Order {
            id,
            symbol: self.symbol,
            side,
            order_type,
            price,
            quantity,
            filled_qty: Decimal::ZERO,
            timestamp,
            status: OrderStatus::Pending,
            client_id,
        };
        let slot = self.arena.insert(order).ok_or(BookError::PoolExhausted)?;
        self.next_order_id += 1;
        self.index.insert(id, slot);

        self.match_incoming(slot, timestamp)?;
        Ok(*self.arena.get(slot))
    }

    /// Core matching loop: walk the opposite side from the best price
    /// outward, then dispose of any remainder.
    fn match_incoming(&mut self, taker_slot: Slot, timestamp: u64) -> Result<(), BookError> {
        // Work on a local copy so the arena isn't mutably borrowed
        // across level operations; written back before returning.
        let mut taker = *self.arena.get(taker_slot);
        // Stop orders trade with market semantics once submitted;
        // trigger management lives in the layer above the book.
        let is_market = !taker.order_type.should_rest();

        loop {
            if taker.remaining_qty().is_zero() {
                break;
            }
            let best_price = match taker.side {
                Side::Buy => self.asks.keys().next().copied(),
                Side::Sell => self.bids.keys().next_back().copied(),
            };
            let Some(best_price) = best_price else {
                break; // opposite side exhausted
            };
            if !is_market {
                let crosses = match taker.side {
                    Side::Buy => taker.price >= best_price,
                    Side::Sell => taker.price <= best_price,
                };
                if !crosses {
                    break;
                }
            }
            self.match_at_level(&mut taker, best_price, timestamp)?;
        }

        if !taker.remaining_qty().is_zero() {
            if taker.order_type.should_rest() {
                // Rest the remainder on the taker's own side.
                if taker.status == OrderStatus::Pending {
                    taker.set_status(OrderStatus::Open);
                }
                let own_side = match taker.side {
                    Side::Buy => &mut self.bids,
                    Side::Sell => &mut self.asks,
                };
                let level = own_side
                    .entry(taker.price)
                    .or_insert_with(|| PriceLevel::new(taker.price));
                if let Err(err) = level.push_back(taker_slot, taker.remaining_qty()) {
                    // Failed to rest: the order must not linger live.
                    if level.is_empty() {
                        own_side.remove(&taker.price);
                    }
                    taker.set_status(OrderStatus::Rejected);
                    *self.arena.get_mut(taker_slot) = taker;
                    return Err(err.into());
                }
            } else {
                // Market remainders never rest.
                taker.set_status(OrderStatus::Cancelled);
            }
        }

        *self.arena.get_mut(taker_slot) = taker;
        Ok(())
    }

    /// Consume makers at one opposite level in strict FIFO order.
    /// Removes the level the moment it empties.
    fn match_at_level(
        &mut self,
        taker: &mut Order,
        level_price: Decimal,
        timestamp: u64,
    ) -> Result<(), BookError> {
        let opposite = match taker.side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };
        let Some(level) = opposite.get_mut(&level_price) else {
            return Ok(());
        };

        while !taker.remaining_qty().is_zero() {
            let Some(maker_slot) = level.front() else {
                break;
            };
            let maker = self.arena.get_mut(maker_slot);
            let fill_qty = taker.remaining_qty().min(maker.remaining_qty());

            maker.apply_fill(fill_qty);
            taker.apply_fill(fill_qty);
            let maker_done = maker.is_filled();
            // Trade price is always the resting order's price.
            let (buyer, seller) = match taker.side {
                Side::Buy => (taker.id, maker.id),
                Side::Sell => (maker.id, taker.id),
            };

            level.reduce_qty(fill_qty)?;
            if maker_done {
                level.pop_front();
            }

            self.trades.push(Trade {
                id: TradeId(self.next_trade_id),
                symbol: self.symbol,
                price: level_price,
                quantity: fill_qty,
                buyer_order_id: buyer,
                seller_order_id: seller,
                timestamp,
            });
            self.next_trade_id += 1;
        }

        if level.is_empty() {
            opposite.remove(&level_price);
        }
        Ok(())
    }

    /// Cancel a resting order by id.
    pub fn cancel_order(&mut self, id: OrderId) -> CancelOutcome {
        let Some(&slot) = self.index.get(&id) else {
            return CancelOutcome::NotFound;
        };
        let order = *self.arena.get(slot);
        if order.status.is_terminal() {
            return CancelOutcome::AlreadyTerminal;
        }

        let side_map = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = side_map.get_mut(&order.price) {
            if level.remove(slot) {
                // Subtracting part of the sum it maintains; failure here
                // is a book invariant violation, not a runtime condition.
                let reduced = level.reduce_qty(order.remaining_qty());
                debug_assert!(reduced.is_ok(), "level quantity diverged");
                if level.is_empty() {
                    side_map.remove(&order.price);
                }
            }
        }

        self.arena.get_mut(slot).set_status(OrderStatus::Cancelled);
        CancelOutcome::Cancelled
    }

    /// Look up an order by id, terminal orders included.
    pub fn get_order(&self, id: OrderId) -> Option<&Order> {
        self.index.get(&id).map(|&slot| self.arena.get(slot))
    }

    /// Best (highest) bid price.
    #[inline(always)]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    /// Best (lowest) ask price.
    #[inline(always)]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Midpoint of the best bid and ask.
    pub fn mid_price(&self) -> Option<Decimal> {
        let (bid, ask) = (self.best_bid()?, self.best_ask()?);
        let sum = bid.checked_add(ask).ok()?;
        sum.checked_div(Decimal::from_int(2)).ok()
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<Decimal> {
        let (bid, ask) = (self.best_bid()?, self.best_ask()?);
        ask.checked_sub(bid).ok()
    }

    /// Top-`levels` depth snapshot per side, best levels first.
    pub fn depth(&self, levels: usize) -> BookDepth {
        let view = |l: &PriceLevel| LevelView {
            price: l.price,
            total_qty: l.total_qty(),
            order_count: l.order_count(),
        };
        BookDepth {
            bids: self.bids.values().rev().take(levels).map(view).collect(),
            asks: self.asks.values().take(levels).map(view).collect(),
        }
    }

    /// Append-only trade log.
    #[inline(always)]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Number of orders ever submitted to this book, terminal included.
    #[inline(always)]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Verify sort order and level-conservation invariants.
    /// Test support; panics on violation.
    #[cfg(test)]
    fn assert_invariants(&self) {
        for (side_map, _descending) in [(&self.bids, true), (&self.asks, false)] {
            for (price, level) in side_map {
                assert_eq!(*price, level.price);
                assert!(!level.is_empty(), "empty level not removed");
                let mut sum = Decimal::ZERO;
                for slot in level.iter() {
                    let order = self.arena.get(slot);
                    assert!(!order.status.is_terminal());
                    assert!(order.filled_qty >= Decimal::ZERO);
                    assert!(order.filled_qty <= order.quantity);
                    sum = sum.checked_add(order.remaining_qty()).unwrap();
                }
                assert_eq!(sum, level.total_qty(), "level quantity diverged");
            }
        }
    }
}
