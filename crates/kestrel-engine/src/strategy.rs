//! Strategy trait and the spread-capture reference strategy.
//!
//! Strategy state moves between Flat, Long, and Short only on
//! confirmed fills: venue execution is asynchronous and may reject or
//! partially fill, so signal emission alone never changes state.

use arrayvec::ArrayVec;

use kestrel_core::{Decimal, Order, OrderStatus, Side, SymbolId};

use crate::tick::{MarketTick, Signal, SignalAction};

/// Upper bound on the rolling mid-price window.
pub const MAX_TICK_WINDOW: usize = 64;

/// Tunable strategy parameters.
#[derive(Clone, Copy, Debug)]
pub struct StrategyParams {
    /// Largest position the strategy will hold, in quantity units.
    pub max_position: Decimal,
    /// Skip ticks whose spread is wider than this (stale or illiquid).
    pub max_spread: Decimal,
    /// Minimum spread required to open a position.
    pub min_edge: Decimal,
    /// Mid prices observed before the strategy starts trading.
    /// Clamped to [`MAX_TICK_WINDOW`].
    pub tick_window: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            max_position: Decimal::from_int(100),
            max_spread: Decimal::from_int(1),
            min_edge: Decimal::from_raw(Decimal::SCALE / 20), // 0.05
            tick_window: 8,
        }
    }
}

/// A per-tick trading strategy.
pub trait Strategy {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Evaluate one tick. `None` means the tick was unusable (bad
    /// arithmetic, warm-up); a `Hold` signal means "seen, no action".
    fn on_tick(&mut self, tick: &MarketTick) -> Option<Signal>;

    /// Notification that an order produced by this strategy reported a
    /// status change in the book. Position moves here, never in
    /// [`Strategy::on_tick`].
    fn on_fill(&mut self, order: &Order);
}

/// Spread-capture strategy over the states Flat, Long, Short.
///
/// Flat: buys when the spread offers at least `min_edge`.
/// Long: exits the full position. Short: covers the full position.
pub struct SpreadStrategy {
    name: String,
    params: StrategyParams,
    /// Signed position; sign encodes long/short/flat.
    position: Decimal,
    realized_pnl: Decimal,
    /// Entry price of the current position, zero when flat.
    entry_price: Decimal,
    /// Rolling window of observed mid prices.
    mids: ArrayVec<Decimal, MAX_TICK_WINDOW>,
}

impl SpreadStrategy {
    /// Create a strategy with the given parameters.
    pub fn new(name: impl Into<String>, mut params: StrategyParams) -> Self {
        params.tick_window = params.tick_window.clamp(1, MAX_TICK_WINDOW);
        Self {
            name: name.into(),
            params,
            position: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            entry_price: Decimal::ZERO,
            mids: ArrayVec::new(),
        }
    }

    /// Current signed position.
    pub fn position(&self) -> Decimal {
        self.position
    }

    /// Profit realized on closed round trips.
    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    /// Active parameters.
    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn observe_mid(&mut self, tick: &MarketTick) -> Option<()> {
        let sum = tick.bid.checked_add(tick.ask).ok()?;
        let mid = sum.checked_div(Decimal::from_int(2)).ok()?;
        if self.mids.is_full() {
            self.mids.remove(0);
        }
        self.mids.push(mid);
        Some(())
    }

    fn confidence(&self, spread: Decimal) -> f64 {
        if self.params.min_edge.is_zero() {
            return 1.0;
        }
        (spread.to_f64() / self.params.min_edge.to_f64()).clamp(0.0, 1.0)
    }
}

impl Strategy for SpreadStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_tick(&mut self, tick: &MarketTick) -> Option<Signal> {
        let spread = tick.ask.checked_sub(tick.bid).ok()?;
        self.observe_mid(tick)?;

        // Warm-up: observe a full window before trading.
        if self.mids.len() < self.params.tick_window {
            return Some(Signal::hold(tick.symbol, tick.timestamp));
        }
        // A spread wider than max_spread means a stale or illiquid quote.
        if spread > self.params.max_spread {
            return Some(Signal::hold(tick.symbol, tick.timestamp));
        }

        if self.position.is_zero() {
            if spread < self.params.min_edge {
                return Some(Signal::hold(tick.symbol, tick.timestamp));
            }
            Some(Signal {
                symbol: tick.symbol,
                action: SignalAction::Buy,
                confidence: self.confidence(spread),
                target_price: tick.ask,
                quantity: self.params.max_position.min(tick.ask_size),
                timestamp: tick.timestamp,
            })
        } else if self.position.is_positive() {
            // Long: exit the full position.
            Some(Signal {
                symbol: tick.symbol,
                action: SignalAction::Sell,
                confidence: 1.0,
                target_price: tick.bid,
                quantity: self.position,
                timestamp: tick.timestamp,
            })
        } else {
            // Short: cover the full position.
            Some(Signal {
                symbol: tick.symbol,
                action: SignalAction::Buy,
                confidence: 1.0,
                target_price: tick.ask,
                quantity: self.position.abs(),
                timestamp: tick.timestamp,
            })
        }
    }

    fn on_fill(&mut self, order: &Order) {
        if order.status != OrderStatus::Filled {
            return;
        }
        let qty = order.quantity;
        match order.side {
            Side::Buy => {
                if self.position.is_negative() {
                    // Covering a short realizes entry - exit.
                    if let Ok(edge) = self.entry_price.checked_sub(order.price) {
                        if let Ok(pnl) = edge.checked_mul(qty) {
                            self.realized_pnl =
                                self.realized_pnl.checked_add(pnl).unwrap_or(self.realized_pnl);
                        }
                    }
                } else if self.position.is_zero() {
                    self.entry_price = order.price;
                }
                self.position = self.position.checked_add(qty).unwrap_or(self.position);
            }
            Side::Sell => {
                if self.position.is_positive() {
                    if let Ok(edge) = order.price.checked_sub(self.entry_price) {
                        if let Ok(pnl) = edge.checked_mul(qty) {
                            self.realized_pnl =
                                self.realized_pnl.checked_add(pnl).unwrap_or(self.realized_pnl);
                        }
                    }
                } else if self.position.is_zero() {
                    self.entry_price = order.price;
                }
                self.position = self.position.checked_sub(qty).unwrap_or(self.position);
            }
        }
        if self.position.is_zero() {
            self.entry_price = Decimal::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::{ClientId, OrderId, OrderType};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn tick(bid: &str, ask: &str, seq: u64) -> MarketTick {
        MarketTick {
            symbol: SymbolId(1),
            bid: dec(bid),
            ask: dec(ask),
            bid_size: Decimal::from_int(1000),
            ask_size: Decimal::from_int(1000),
            timestamp: seq * 1000,
            sequence: seq,
        }
    }

    fn params() -> StrategyParams {
        StrategyParams {
            max_position: Decimal::from_int(100),
            max_spread: Decimal::from_int(1),
            min_edge: dec("0.1"),
            tick_window: 1,
        }
    }

    fn filled_order(side: Side, price: &str, qty: i64) -> Order {
        Order {
            id: OrderId(1),
            symbol: SymbolId(1),
            side,
            order_type: OrderType::Limit,
            price: dec(price),
            quantity: Decimal::from_int(qty),
            filled_qty: Decimal::from_int(qty),
            timestamp: 0,
            status: OrderStatus::Filled,
            client_id: ClientId(0),
        }
    }

    #[test]
    fn test_flat_buys_on_sufficient_edge() {
        let mut s = SpreadStrategy::new("spread", params());
        let signal = s.on_tick(&tick("149.9", "150.1", 1)).unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.target_price, dec("150.1"));
        assert_eq!(signal.quantity, Decimal::from_int(100));
        assert!(signal.confidence > 0.99);
        // Emission alone never moves the position.
        assert!(s.position().is_zero());
    }

    #[test]
    fn test_flat_holds_below_edge() {
        let mut s = SpreadStrategy::new("spread", params());
        let signal = s.on_tick(&tick("150.0", "150.05", 1)).unwrap();
        assert_eq!(signal.action, SignalAction::Hold);
    }

    #[test]
    fn test_wide_spread_is_skipped() {
        let mut s = SpreadStrategy::new("spread", params());
        let signal = s.on_tick(&tick("149.0", "151.0", 1)).unwrap();
        assert_eq!(signal.action, SignalAction::Hold);
    }

    #[test]
    fn test_warm_up_window() {
        let mut p = params();
        p.tick_window = 3;
        let mut s = SpreadStrategy::new("spread", p);

        for seq in 0..2 {
            let signal = s.on_tick(&tick("149.9", "150.1", seq)).unwrap();
            assert_eq!(signal.action, SignalAction::Hold);
        }
        let signal = s.on_tick(&tick("149.9", "150.1", 2)).unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
    }

    #[test]
    fn test_fill_moves_flat_to_long_then_exit() {
        let mut s = SpreadStrategy::new("spread", params());
        s.on_tick(&tick("149.9", "150.1", 1)).unwrap();

        s.on_fill(&filled_order(Side::Buy, "150.1", 100));
        assert_eq!(s.position(), Decimal::from_int(100));

        // Long: next tick exits the full position at the bid.
        let signal = s.on_tick(&tick("150.2", "150.4", 2)).unwrap();
        assert_eq!(signal.action, SignalAction::Sell);
        assert_eq!(signal.quantity, Decimal::from_int(100));
        assert_eq!(signal.target_price, dec("150.2"));

        s.on_fill(&filled_order(Side::Sell, "150.2", 100));
        assert!(s.position().is_zero());
        // (150.2 - 150.1) * 100 = 10
        assert_eq!(s.realized_pnl(), Decimal::from_int(10));
    }

    #[test]
    fn test_short_covers_full_position() {
        let mut s = SpreadStrategy::new("spread", params());
        s.on_tick(&tick("149.9", "150.1", 1)).unwrap();
        s.on_fill(&filled_order(Side::Sell, "150.2", 50));
        assert_eq!(s.position(), Decimal::from_int(-50));

        let signal = s.on_tick(&tick("149.9", "150.1", 2)).unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.quantity, Decimal::from_int(50));

        s.on_fill(&filled_order(Side::Buy, "150.1", 50));
        assert!(s.position().is_zero());
        // (150.2 - 150.1) * 50 = 5
        assert_eq!(s.realized_pnl(), Decimal::from_int(5));
    }

    #[test]
    fn test_non_filled_status_is_ignored() {
        let mut s = SpreadStrategy::new("spread", params());
        let mut order = filled_order(Side::Buy, "150.1", 100);
        order.status = OrderStatus::PartiallyFilled;
        order.filled_qty = Decimal::from_int(40);
        s.on_fill(&order);
        assert!(s.position().is_zero());
    }
}
