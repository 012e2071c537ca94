//! Order and trade types and lifecycle management.

use crate::decimal::Decimal;

/// Side of the order book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Bid side (buyers).
    Buy = 0,
    /// Ask side (sellers).
    Sell = 1,
}

impl Side {
    /// Get the opposite side.
    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Check if this is the buy side.
    #[inline(always)]
    pub const fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }
}

/// Order type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OrderType {
    /// Execute immediately at the best available prices; never rests.
    Market = 0,
    /// Cross what is marketable, rest the remainder at the limit price.
    Limit = 1,
    /// Stop order; matched with market semantics once submitted.
    Stop = 2,
    /// Stop-limit order; matched with limit semantics once submitted.
    StopLimit = 3,
}

impl OrderType {
    /// Whether an unfilled remainder rests on the book.
    #[inline(always)]
    pub const fn should_rest(self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }
}

/// Order lifecycle state. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OrderStatus {
    /// Accepted, not yet processed.
    Pending = 0,
    /// Resting on the book with no fill.
    Open = 1,
    /// Some quantity filled, remainder live.
    PartiallyFilled = 2,
    /// Fully filled. Terminal.
    Filled = 3,
    /// Cancelled with remaining quantity. Terminal.
    Cancelled = 4,
    /// Rejected before entering the book. Terminal.
    Rejected = 5,
}

impl OrderStatus {
    /// Check if the order can no longer trade.
    #[inline(always)]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// Whether `next` is a legal forward transition from `self`.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        match self {
            OrderStatus::Pending => !matches!(next, OrderStatus::Pending),
            OrderStatus::Open => matches!(
                next,
                OrderStatus::PartiallyFilled | OrderStatus::Filled | OrderStatus::Cancelled
            ),
            OrderStatus::PartiallyFilled => matches!(
                next,
                OrderStatus::PartiallyFilled | OrderStatus::Filled | OrderStatus::Cancelled
            ),
            // Terminal states never transition.
            _ => false,
        }
    }
}

/// Symbol identifier, pre-mapped at startup ("AAPL" -> SymbolId(42)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct SymbolId(pub u32);

/// Unique order identifier, scoped to one [`crate::OrderBook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct OrderId(pub u64);

/// Client identifier carried through for attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct ClientId(pub u32);

/// A single order. Mutated in place during matching; remains
/// addressable by id after reaching a terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier assigned by the owning book.
    pub id: OrderId,
    /// Symbol this order trades.
    pub symbol: SymbolId,
    /// Buy or sell.
    pub side: Side,
    /// Matching semantics.
    pub order_type: OrderType,
    /// Limit price. Ignored for market orders.
    pub price: Decimal,
    /// Original quantity.
    pub quantity: Decimal,
    /// Quantity filled so far. Invariant: 0 <= filled_qty <= quantity.
    pub filled_qty: Decimal,
    /// Submission timestamp, nanoseconds.
    pub timestamp: u64,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Submitting client.
    pub client_id: ClientId,
}

impl Order {
    /// Quantity still live on the book.
    #[inline(always)]
    pub fn remaining_qty(&self) -> Decimal {
        // filled_qty <= quantity by invariant, so this cannot underflow
        Decimal::from_raw(self.quantity.raw() - self.filled_qty.raw())
    }

    /// Check if the order is completely filled.
    #[inline(always)]
    pub fn is_filled(&self) -> bool {
        self.filled_qty == self.quantity
    }

    /// Record a fill and advance the status.
    ///
    /// Debug-panics if `qty` exceeds the remaining quantity.
    pub fn apply_fill(&mut self, qty: Decimal) {
        debug_assert!(
            qty <= self.remaining_qty(),
            "fill quantity exceeds remaining"
        );
        self.filled_qty = Decimal::from_raw(self.filled_qty.raw() + qty.raw());
        let next = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        debug_assert!(self.status.can_transition_to(next) || self.status == next);
        self.status = next;
    }

    /// Advance the status, debug-asserting forward-only transitions.
    pub fn set_status(&mut self, next: OrderStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal status transition"
        );
        self.status = next;
    }
}

/// Unique trade identifier, scoped to one book's trade log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct TradeId(pub u64);

/// An executed match. Appended to the book's trade log; the price is
/// always the resting (passive) order's price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trade {
    /// Monotonically increasing identifier.
    pub id: TradeId,
    /// Symbol traded.
    pub symbol: SymbolId,
    /// Execution price (the passive order's price).
    pub price: Decimal,
    /// Execution quantity.
    pub quantity: Decimal,
    /// Buy-side order id.
    pub buyer_order_id: OrderId,
    /// Sell-side order id.
    pub seller_order_id: OrderId,
    /// Execution timestamp, nanoseconds.
    pub timestamp: u64,
}
