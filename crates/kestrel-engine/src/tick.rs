//! Market data and strategy output types.
//!
//! Both types are plain `Copy` values sized for pooled slots and ring
//! hand-off; neither is persisted.

use kestrel_core::{Decimal, SymbolId};

/// One top-of-book market data update from an external feed adapter.
///
/// `sequence` is caller-assigned and strictly increasing per feed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarketTick {
    /// Symbol this update belongs to.
    pub symbol: SymbolId,
    /// Best bid price.
    pub bid: Decimal,
    /// Best ask price.
    pub ask: Decimal,
    /// Size available at the bid.
    pub bid_size: Decimal,
    /// Size available at the ask.
    pub ask_size: Decimal,
    /// Feed timestamp, nanoseconds.
    pub timestamp: u64,
    /// Feed sequence number.
    pub sequence: u64,
}

/// Trading intent for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SignalAction {
    /// Open or extend a long position.
    Buy = 0,
    /// Reduce or open short.
    Sell = 1,
    /// No action this tick.
    Hold = 2,
}

/// A strategy's output for one tick. Ephemeral: produced once per tick
/// per strategy and not persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Signal {
    /// Symbol the signal applies to.
    pub symbol: SymbolId,
    /// Intent.
    pub action: SignalAction,
    /// Conviction in [0, 1].
    pub confidence: f64,
    /// Desired execution price.
    pub target_price: Decimal,
    /// Desired quantity.
    pub quantity: Decimal,
    /// Emission timestamp, nanoseconds.
    pub timestamp: u64,
}

impl Signal {
    /// A no-action signal.
    pub fn hold(symbol: SymbolId, timestamp: u64) -> Self {
        Self {
            symbol,
            action: SignalAction::Hold,
            confidence: 0.0,
            target_price: Decimal::ZERO,
            quantity: Decimal::ZERO,
            timestamp,
        }
    }

    /// Check if the signal requests an order.
    #[inline(always)]
    pub fn is_actionable(&self) -> bool {
        self.action != SignalAction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_is_not_actionable() {
        let s = Signal::hold(SymbolId(1), 0);
        assert!(!s.is_actionable());
        assert_eq!(s.confidence, 0.0);
    }
}
