//! Price tick computation and side-aware rounding.

use crate::decimal::Decimal;

/// Which side of the book an order sits on, for conservative rounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

/// Computes and applies tick sizing for a market's price decimals.
#[derive(Clone, Copy, Debug)]
pub struct PriceTick {
    max_decimals: u8,
}

impl PriceTick {
    pub fn new(max_decimals: u8) -> PriceTick {
        PriceTick { max_decimals }
    }

    /// Spot markets: `max_decimals = 8 - size_decimals`.
    pub fn spot(size_decimals: u8) -> PriceTick {
        PriceTick::new(8u8.saturating_sub(size_decimals))
    }

    /// Perpetual markets: `max_decimals = 6 - size_decimals`.
    pub fn perp(size_decimals: u8) -> PriceTick {
        PriceTick::new(6u8.saturating_sub(size_decimals))
    }

    /// Number of decimal places a price at this tick size should round to.
    fn decimals_for(&self, price: &Decimal) -> u8 {
        let sig_figs = match price.floor_log10() {
            Some(exponent) => exponent + 1,
            None => return self.max_decimals,
        };
        let target = 5 - sig_figs;
        target.clamp(0, self.max_decimals as i32) as u8
    }

    /// Rounds `price` to the nearest tick, half away from zero.
    pub fn round(&self, price: &Decimal) -> Decimal {
        let decimals = self.decimals_for(price);
        price.round_dp(decimals)
    }

    /// Rounds in the direction that disadvantages the caller:
    /// ask-conservative rounds up, bid-conservative rounds down;
    /// non-conservative reverses the direction.
    pub fn round_by_side(&self, side: Side, price: &Decimal, conservative: bool) -> Decimal {
        let decimals = self.decimals_for(price);
        let rounds_up = match (side, conservative) {
            (Side::Ask, true) => true,
            (Side::Ask, false) => false,
            (Side::Bid, true) => false,
            (Side::Bid, false) => true,
        };
        price.round_dp_directed(decimals, rounds_up)
    }
}
