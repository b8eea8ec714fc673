//! Strategy payoff model.
//!
//! Provides:
//! - The closed [`Strategy`] type over the supported strategies
//! - Covered Call and Iron Condor payoff, Greeks, and breakeven math
//! - Parameter and result value types
//!
//! Every computation here is a pure function of the constructed
//! strategy: no I/O, no shared state, usable concurrently without
//! synchronization.

pub mod covered_call;
pub mod iron_condor;
pub mod params;
pub mod result;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::OptionType;

pub use covered_call::CoveredCall;
pub use iron_condor::IronCondor;
pub use params::{CoveredCallParams, IronCondorParams, StrategyParameters};
pub use result::{
    BreakevenDirection, BreakevenPoint, ProfitPoint, StrategyGreeks, StrategyResult,
};

/// Number of intervals in a default profit profile.
const PROFILE_POINTS: usize = 100;

/// Supported strategy kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    CoveredCall,
    IronCondor,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoveredCall => "covered_call",
            Self::IronCondor => "iron_condor",
        }
    }
}

/// Errors raised while constructing a strategy.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("stock price must be provided")]
    MissingStockPrice,

    #[error("invalid strike order: {0}")]
    InvalidStrikeOrder(&'static str),

    #[error("expected a {expected:?} contract, got {found:?}")]
    ContractTypeMismatch {
        expected: OptionType,
        found: OptionType,
    },

    #[error("all legs must expire {expected}, got a leg expiring {found}")]
    ExpirationMismatch {
        expected: NaiveDate,
        found: NaiveDate,
    },
}

/// Quote-to-float boundary conversion used by the payoff math.
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.try_into().unwrap_or(0.0)
}

/// A fully specified strategy instance.
///
/// Closed over the supported variants so downstream engines can match
/// exhaustively.
#[derive(Debug, Clone)]
pub enum Strategy {
    CoveredCall(CoveredCall),
    IronCondor(IronCondor),
}

impl From<CoveredCall> for Strategy {
    fn from(strategy: CoveredCall) -> Self {
        Self::CoveredCall(strategy)
    }
}

impl From<IronCondor> for Strategy {
    fn from(strategy: IronCondor) -> Self {
        Self::IronCondor(strategy)
    }
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::CoveredCall(_) => StrategyKind::CoveredCall,
            Self::IronCondor(_) => StrategyKind::IronCondor,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::CoveredCall(s) => s.symbol(),
            Self::IronCondor(s) => s.symbol(),
        }
    }

    /// Signed net entry cost; negative means credit received.
    pub fn entry_cost(&self) -> f64 {
        match self {
            Self::CoveredCall(s) => s.entry_cost(),
            Self::IronCondor(s) => s.entry_cost(),
        }
    }

    /// P&L held to expiration at `underlying_price`. Continuous and
    /// piecewise-linear in the price.
    pub fn profit_loss(&self, underlying_price: f64) -> f64 {
        match self {
            Self::CoveredCall(s) => s.profit_loss(underlying_price),
            Self::IronCondor(s) => s.profit_loss(underlying_price),
        }
    }

    pub fn max_profit(&self) -> f64 {
        match self {
            Self::CoveredCall(s) => s.max_profit(),
            Self::IronCondor(s) => s.max_profit(),
        }
    }

    /// Maximum loss as a non-negative value.
    pub fn max_loss(&self) -> f64 {
        match self {
            Self::CoveredCall(s) => s.max_loss(),
            Self::IronCondor(s) => s.max_loss(),
        }
    }

    pub fn breakeven_points(&self) -> Vec<BreakevenPoint> {
        match self {
            Self::CoveredCall(s) => s.breakeven_points(),
            Self::IronCondor(s) => s.breakeven_points(),
        }
    }

    /// Net position Greeks, `None` when a required leg Greek is
    /// missing.
    pub fn greeks(&self) -> Option<StrategyGreeks> {
        match self {
            Self::CoveredCall(s) => s.greeks(),
            Self::IronCondor(s) => s.greeks(),
        }
    }

    /// `max_profit / max_loss`, `None` when max loss is zero.
    pub fn risk_reward_ratio(&self) -> Option<f64> {
        let max_loss = self.max_loss();
        if max_loss == 0.0 {
            return None;
        }
        Some(self.max_profit() / max_loss)
    }

    /// Delta-proxy probability of profit, clamped to [0, 1].
    ///
    /// A deliberate simplification rather than a statistical estimate;
    /// the default ranking weights depend on this exact scale.
    pub fn probability_of_profit(&self) -> Option<f64> {
        let greeks = self.greeks()?;
        Some(greeks.delta.abs().clamp(0.0, 1.0))
    }

    /// Evaluate P&L at `num_points + 1` evenly spaced prices across
    /// `[min_price, max_price]`. ROI is relative to |entry cost| and
    /// zero when the entry cost is zero.
    pub fn generate_profit_profile(
        &self,
        min_price: f64,
        max_price: f64,
        num_points: usize,
    ) -> Vec<ProfitPoint> {
        let step = (max_price - min_price) / num_points as f64;
        let entry_cost = self.entry_cost();

        (0..=num_points)
            .map(|i| {
                let price = min_price + step * i as f64;
                let profit_loss = self.profit_loss(price);
                let roi = if entry_cost != 0.0 {
                    profit_loss / entry_cost.abs() * 100.0
                } else {
                    0.0
                };
                ProfitPoint {
                    underlying_price: price,
                    profit_loss,
                    roi,
                }
            })
            .collect()
    }

    fn parameters(&self) -> StrategyParameters {
        match self {
            Self::CoveredCall(s) => s.parameters(),
            Self::IronCondor(s) => s.parameters(),
        }
    }

    fn profile_bounds(&self) -> (f64, f64) {
        match self {
            Self::CoveredCall(s) => s.profile_bounds(),
            Self::IronCondor(s) => s.profile_bounds(),
        }
    }

    /// Complete analysis: entry cost, extremes, breakevens, Greeks,
    /// ratios, and a profit profile over a range covering the
    /// strategy's strikes.
    pub fn analyze(&self) -> StrategyResult {
        let (min_price, max_price) = self.profile_bounds();
        let profit_profile = self.generate_profit_profile(min_price, max_price, PROFILE_POINTS);

        StrategyResult {
            strategy_type: self.kind(),
            symbol: self.symbol().to_string(),
            parameters: self.parameters(),
            entry_cost: self.entry_cost(),
            max_profit: self.max_profit(),
            max_loss: self.max_loss(),
            breakeven_points: self.breakeven_points(),
            profit_profile,
            greeks: self.greeks(),
            probability_of_profit: self.probability_of_profit(),
            risk_reward_ratio: self.risk_reward_ratio(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::OptionContract;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn call_contract() -> OptionContract {
        OptionContract {
            symbol: "AAPL".to_string(),
            strike: dec!(155),
            expiration: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            option_type: OptionType::Call,
            bid: dec!(2.50),
            ask: dec!(2.60),
            last: None,
            volume: 300,
            open_interest: 1_200,
            implied_volatility: Some(0.21),
            delta: Some(0.30),
            gamma: Some(0.02),
            theta: Some(-0.04),
            vega: Some(0.11),
            contract_id: None,
            exchange: None,
        }
    }

    fn covered_call() -> Strategy {
        CoveredCall::new("AAPL", dec!(150), 100, call_contract(), 1)
            .unwrap()
            .into()
    }

    #[test]
    fn test_profile_spacing_and_roi() {
        let strategy = covered_call();
        let profile = strategy.generate_profit_profile(100.0, 200.0, 100);

        assert_eq!(profile.len(), 101);
        assert_relative_eq!(profile[0].underlying_price, 100.0);
        assert_relative_eq!(profile[100].underlying_price, 200.0);
        // Even spacing.
        assert_relative_eq!(
            profile[1].underlying_price - profile[0].underlying_price,
            1.0
        );
        // ROI is P&L over |entry cost|.
        let point = &profile[100];
        assert_relative_eq!(point.roi, point.profit_loss / 14_750.0 * 100.0);
    }

    #[test]
    fn test_analyze_composes_result() {
        let strategy = covered_call();
        let result = strategy.analyze();

        assert_eq!(result.strategy_type, StrategyKind::CoveredCall);
        assert_eq!(result.symbol, "AAPL");
        assert_relative_eq!(result.entry_cost, 14_750.0);
        assert_relative_eq!(result.max_profit, 750.0);
        assert_eq!(result.breakeven_points.len(), 1);
        assert!(result.greeks.is_some());
        assert!(result.risk_reward_ratio.is_some());

        // Profile covers both the breakeven and the strike.
        let lo = result.profit_profile.first().unwrap().underlying_price;
        let hi = result.profit_profile.last().unwrap().underlying_price;
        assert!(lo <= 147.5 && hi >= 155.0);
    }

    #[test]
    fn test_probability_of_profit_clamped() {
        let strategy = covered_call();
        // Net delta 100 - 30 = 70, clamped to 1.0.
        assert_relative_eq!(strategy.probability_of_profit().unwrap(), 1.0);

        let mut contract = call_contract();
        contract.delta = None;
        let strategy: Strategy = CoveredCall::new("AAPL", dec!(150), 100, contract, 1)
            .unwrap()
            .into();
        assert_eq!(strategy.probability_of_profit(), None);
    }

    #[test]
    fn test_risk_reward_ratio() {
        let strategy = covered_call();
        assert_relative_eq!(
            strategy.risk_reward_ratio().unwrap(),
            750.0 / 14_750.0
        );
    }
}
