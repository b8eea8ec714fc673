//! Covered Call strategy: long stock plus short calls against it.

use rust_decimal::Decimal;

use crate::chain::{OptionContract, OptionType};

use super::params::{CoveredCallParams, StrategyParameters};
use super::result::{BreakevenDirection, BreakevenPoint, StrategyGreeks};
use super::{to_f64, StrategyError};

/// Long `stock_quantity` shares at `stock_price`, short
/// `call_quantity` calls. Premium is the call's bid, since the calls
/// are sold at entry.
#[derive(Debug, Clone)]
pub struct CoveredCall {
    symbol: String,
    stock_price: f64,
    stock_quantity: u32,
    call: OptionContract,
    call_quantity: u32,
    call_strike: f64,
    call_premium: f64,
}

impl CoveredCall {
    pub fn new(
        symbol: impl Into<String>,
        stock_price: Decimal,
        stock_quantity: u32,
        call: OptionContract,
        call_quantity: u32,
    ) -> Result<Self, StrategyError> {
        if call.option_type != OptionType::Call {
            return Err(StrategyError::ContractTypeMismatch {
                expected: OptionType::Call,
                found: call.option_type,
            });
        }

        let stock_price = to_f64(stock_price);
        if stock_price <= 0.0 {
            return Err(StrategyError::MissingStockPrice);
        }

        let call_strike = to_f64(call.strike);
        let call_premium = to_f64(call.bid);

        Ok(Self {
            symbol: symbol.into(),
            stock_price,
            stock_quantity,
            call,
            call_quantity,
            call_strike,
            call_premium,
        })
    }

    /// Build from parameters plus the resolved call contract. The
    /// explicit `stock_price` wins over the one in the parameters.
    pub fn from_params(
        params: &CoveredCallParams,
        call: OptionContract,
        stock_price: Option<Decimal>,
    ) -> Result<Self, StrategyError> {
        let stock_price = stock_price
            .or(params.stock_price)
            .ok_or(StrategyError::MissingStockPrice)?;

        Self::new(
            params.symbol.clone(),
            stock_price,
            params.stock_quantity,
            call,
            params.quantity,
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn contract(&self) -> &OptionContract {
        &self.call
    }

    fn premium_received(&self) -> f64 {
        self.call_premium * 100.0 * self.call_quantity as f64
    }

    /// Stock cost minus premium received.
    pub fn entry_cost(&self) -> f64 {
        self.stock_price * self.stock_quantity as f64 - self.premium_received()
    }

    /// P&L held to expiration at `underlying_price`.
    pub fn profit_loss(&self, underlying_price: f64) -> f64 {
        let stock_pnl = (underlying_price - self.stock_price) * self.stock_quantity as f64;

        // Short call: keep the premium, give back intrinsic above the strike.
        let mut call_pnl = self.premium_received();
        if underlying_price > self.call_strike {
            call_pnl -=
                (underlying_price - self.call_strike) * 100.0 * self.call_quantity as f64;
        }

        stock_pnl + call_pnl
    }

    /// Max profit, reached at or above the call strike.
    pub fn max_profit(&self) -> f64 {
        if self.call_strike >= self.stock_price {
            (self.call_strike - self.stock_price) * self.stock_quantity as f64
                + self.premium_received()
        } else {
            // In-the-money call: premium only.
            self.premium_received()
        }
    }

    /// Max loss, with the stock going to zero.
    pub fn max_loss(&self) -> f64 {
        let max_loss = self.stock_price * self.stock_quantity as f64 - self.premium_received();
        max_loss.max(0.0)
    }

    /// Single breakeven below the stock entry: entry price less the
    /// premium received per share.
    pub fn breakeven_points(&self) -> Vec<BreakevenPoint> {
        let premium_per_share = self.premium_received() / self.stock_quantity as f64;
        vec![BreakevenPoint {
            price: self.stock_price - premium_per_share,
            direction: BreakevenDirection::Below,
        }]
    }

    /// Net Greeks: stock contributes delta only, the short call is
    /// negated. `None` when the call has no delta; missing secondary
    /// Greeks on the call contribute zero.
    pub fn greeks(&self) -> Option<StrategyGreeks> {
        let call_delta = self.call.delta?;

        let contracts = 100.0 * self.call_quantity as f64;
        let stock_delta = self.stock_quantity as f64;

        Some(StrategyGreeks {
            delta: stock_delta - call_delta * contracts,
            gamma: -self.call.gamma.unwrap_or(0.0) * contracts,
            theta: -self.call.theta.unwrap_or(0.0) * contracts,
            vega: -self.call.vega.unwrap_or(0.0) * contracts,
        })
    }

    pub(super) fn parameters(&self) -> StrategyParameters {
        StrategyParameters::CoveredCall(CoveredCallParams {
            symbol: self.symbol.clone(),
            stock_quantity: self.stock_quantity,
            call_strike: self.call.strike,
            call_expiration: self.call.expiration,
            stock_price: Decimal::try_from(self.stock_price).ok(),
            quantity: self.call_quantity,
        })
    }

    /// Profile range covering the breakeven, the stock entry, and the
    /// call strike.
    pub(super) fn profile_bounds(&self) -> (f64, f64) {
        let breakeven = self.stock_price - self.premium_received() / self.stock_quantity as f64;
        let lo = (breakeven.min(self.call_strike) * 0.5).max(0.0);
        let hi = self.stock_price.max(self.call_strike) * 1.5;
        (lo, hi)
    }
}
