//! Iron Condor strategy: a short put spread plus a short call spread.

use crate::chain::{OptionContract, OptionType};

use super::params::{IronCondorParams, StrategyParameters};
use super::result::{BreakevenDirection, BreakevenPoint, StrategyGreeks};
use super::{to_f64, StrategyError};

/// Short put at `put_sell`, long put at `put_buy`, short call at
/// `call_sell`, long call at `call_buy`, all sharing one expiration.
///
/// Short legs are sold at the bid, long legs bought at the ask.
/// Construction rejects any violation of
/// `put_buy < put_sell < call_sell < call_buy`.
#[derive(Debug, Clone)]
pub struct IronCondor {
    symbol: String,
    put_sell: OptionContract,
    put_buy: OptionContract,
    call_sell: OptionContract,
    call_buy: OptionContract,
    quantity: u32,
}

impl IronCondor {
    pub fn new(
        symbol: impl Into<String>,
        put_sell: OptionContract,
        put_buy: OptionContract,
        call_sell: OptionContract,
        call_buy: OptionContract,
        quantity: u32,
    ) -> Result<Self, StrategyError> {
        for (leg, expected) in [
            (&put_sell, OptionType::Put),
            (&put_buy, OptionType::Put),
            (&call_sell, OptionType::Call),
            (&call_buy, OptionType::Call),
        ] {
            if leg.option_type != expected {
                return Err(StrategyError::ContractTypeMismatch {
                    expected,
                    found: leg.option_type,
                });
            }
        }

        if put_buy.strike >= put_sell.strike {
            return Err(StrategyError::InvalidStrikeOrder(
                "put buy strike must be below put sell strike",
            ));
        }
        if call_sell.strike >= call_buy.strike {
            return Err(StrategyError::InvalidStrikeOrder(
                "call sell strike must be below call buy strike",
            ));
        }
        if put_sell.strike >= call_sell.strike {
            return Err(StrategyError::InvalidStrikeOrder(
                "put sell strike must be below call sell strike",
            ));
        }

        let expiration = put_sell.expiration;
        for leg in [&put_buy, &call_sell, &call_buy] {
            if leg.expiration != expiration {
                return Err(StrategyError::ExpirationMismatch {
                    expected: expiration,
                    found: leg.expiration,
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            put_sell,
            put_buy,
            call_sell,
            call_buy,
            quantity,
        })
    }

    /// Build from parameters plus the four resolved leg contracts.
    pub fn from_params(
        params: &IronCondorParams,
        put_sell: OptionContract,
        put_buy: OptionContract,
        call_sell: OptionContract,
        call_buy: OptionContract,
    ) -> Result<Self, StrategyError> {
        Self::new(
            params.symbol.clone(),
            put_sell,
            put_buy,
            call_sell,
            call_buy,
            params.quantity,
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn multiplier(&self) -> f64 {
        100.0 * self.quantity as f64
    }

    /// Net credit contributed by the put spread.
    fn put_credit(&self) -> f64 {
        (to_f64(self.put_sell.bid) - to_f64(self.put_buy.ask)) * self.multiplier()
    }

    /// Net credit contributed by the call spread.
    fn call_credit(&self) -> f64 {
        (to_f64(self.call_sell.bid) - to_f64(self.call_buy.ask)) * self.multiplier()
    }

    /// Signed entry cost; negative because the condor normally
    /// collects a net credit.
    pub fn entry_cost(&self) -> f64 {
        -(self.put_credit() + self.call_credit())
    }

    /// P&L held to expiration at `underlying_price`: each spread is
    /// flat at its credit outside the strikes, linear between them,
    /// and flat at its max loss beyond the long strike.
    pub fn profit_loss(&self, underlying_price: f64) -> f64 {
        let put_sell_strike = to_f64(self.put_sell.strike);
        let put_buy_strike = to_f64(self.put_buy.strike);
        let call_sell_strike = to_f64(self.call_sell.strike);
        let call_buy_strike = to_f64(self.call_buy.strike);

        let put_pnl = if underlying_price >= put_sell_strike {
            self.put_credit()
        } else if underlying_price <= put_buy_strike {
            self.put_credit() - (put_sell_strike - put_buy_strike) * self.multiplier()
        } else {
            self.put_credit() - (put_sell_strike - underlying_price) * self.multiplier()
        };

        let call_pnl = if underlying_price <= call_sell_strike {
            self.call_credit()
        } else if underlying_price >= call_buy_strike {
            self.call_credit() - (call_buy_strike - call_sell_strike) * self.multiplier()
        } else {
            self.call_credit() - (underlying_price - call_sell_strike) * self.multiplier()
        };

        put_pnl + call_pnl
    }

    /// Max profit is the full net credit, kept when price expires
    /// between the short strikes.
    pub fn max_profit(&self) -> f64 {
        -self.entry_cost()
    }

    /// Max loss: combined spread widths less the net credit, floored
    /// at zero.
    pub fn max_loss(&self) -> f64 {
        let put_width = to_f64(self.put_sell.strike) - to_f64(self.put_buy.strike);
        let call_width = to_f64(self.call_buy.strike) - to_f64(self.call_sell.strike);

        let max_loss = (put_width + call_width) * self.multiplier() - self.max_profit();
        max_loss.max(0.0)
    }

    /// Two breakevens: short put strike less the credit per share, and
    /// short call strike plus the credit per share.
    pub fn breakeven_points(&self) -> Vec<BreakevenPoint> {
        let credit_per_share = self.max_profit() / self.multiplier();

        vec![
            BreakevenPoint {
                price: to_f64(self.put_sell.strike) - credit_per_share,
                direction: BreakevenDirection::Below,
            },
            BreakevenPoint {
                price: to_f64(self.call_sell.strike) + credit_per_share,
                direction: BreakevenDirection::Above,
            },
        ]
    }

    /// Signed sum of the four legs' Greeks (short legs negated).
    /// `None` when any leg is missing its delta; missing secondary
    /// Greeks on a leg contribute zero.
    pub fn greeks(&self) -> Option<StrategyGreeks> {
        let put_sell_delta = self.put_sell.delta?;
        let put_buy_delta = self.put_buy.delta?;
        let call_sell_delta = self.call_sell.delta?;
        let call_buy_delta = self.call_buy.delta?;

        let m = self.multiplier();
        let sum = |short: &OptionContract, long: &OptionContract, f: fn(&OptionContract) -> Option<f64>| {
            (f(long).unwrap_or(0.0) - f(short).unwrap_or(0.0)) * m
        };

        Some(StrategyGreeks {
            delta: (put_buy_delta - put_sell_delta + call_buy_delta - call_sell_delta) * m,
            gamma: sum(&self.put_sell, &self.put_buy, |c| c.gamma)
                + sum(&self.call_sell, &self.call_buy, |c| c.gamma),
            theta: sum(&self.put_sell, &self.put_buy, |c| c.theta)
                + sum(&self.call_sell, &self.call_buy, |c| c.theta),
            vega: sum(&self.put_sell, &self.put_buy, |c| c.vega)
                + sum(&self.call_sell, &self.call_buy, |c| c.vega),
        })
    }

    pub(super) fn parameters(&self) -> StrategyParameters {
        StrategyParameters::IronCondor(IronCondorParams {
            symbol: self.symbol.clone(),
            put_sell_strike: self.put_sell.strike,
            put_buy_strike: self.put_buy.strike,
            call_sell_strike: self.call_sell.strike,
            call_buy_strike: self.call_buy.strike,
            expiration: self.put_sell.expiration,
            quantity: self.quantity,
        })
    }

    /// Profile range extending past both long strikes.
    pub(super) fn profile_bounds(&self) -> (f64, f64) {
        let lo = to_f64(self.put_buy.strike) * 0.8;
        let hi = to_f64(self.call_buy.strike) * 1.2;
        (lo, hi)
    }
}
