//! Strategy analysis result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::params::StrategyParameters;
use super::StrategyKind;

/// Side of the nearest strike a breakeven sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakevenDirection {
    Below,
    Above,
}

/// Underlying price at which the strategy's P&L crosses zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BreakevenPoint {
    pub price: f64,
    pub direction: BreakevenDirection,
}

/// P&L at one underlying price on the profit curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProfitPoint {
    pub underlying_price: f64,
    pub profit_loss: f64,
    /// Return on investment as a percentage of |entry cost|.
    pub roi: f64,
}

/// Net position Greeks (signed per-leg sums, short legs negated).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrategyGreeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

/// Complete analysis of one strategy instance.
///
/// Created once per `analyze` call and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy_type: StrategyKind,

    pub symbol: String,

    /// The parameters this result was computed from.
    pub parameters: StrategyParameters,

    /// Signed net cost: negative means credit received, positive means
    /// debit paid.
    pub entry_cost: f64,

    pub max_profit: f64,

    /// Maximum loss as a non-negative value.
    pub max_loss: f64,

    pub breakeven_points: Vec<BreakevenPoint>,

    /// P&L evaluated across a price range covering the strikes.
    pub profit_profile: Vec<ProfitPoint>,

    pub greeks: Option<StrategyGreeks>,

    /// Delta-proxy probability in [0, 1]; a rough heuristic, not a
    /// statistical estimate.
    pub probability_of_profit: Option<f64>,

    /// `max_profit / max_loss`, absent when max loss is zero.
    pub risk_reward_ratio: Option<f64>,

    pub timestamp: DateTime<Utc>,
}

impl StrategyResult {
    /// Whether entry is a net credit.
    pub fn is_credit(&self) -> bool {
        self.entry_cost < 0.0
    }

    /// Distance between the outermost breakeven points, 0.0 when there
    /// are fewer than two.
    pub fn breakeven_range(&self) -> f64 {
        if self.breakeven_points.len() < 2 {
            return 0.0;
        }
        let prices = self.breakeven_points.iter().map(|bp| bp.price);
        let max = prices.clone().fold(f64::MIN, f64::max);
        let min = prices.fold(f64::MAX, f64::min);
        max - min
    }
}
