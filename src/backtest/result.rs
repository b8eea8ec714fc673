//! Backtest input and result types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// One point of a historical underlying price series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub underlying_price: f64,
}

/// One evaluated point in the backtest trade log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub underlying_price: f64,
    pub pnl: f64,
    pub capital: f64,
}

/// Results of replaying a strategy over a historical series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy_type: StrategyKind,

    pub symbol: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    /// Total return percentage over the period.
    pub total_return: f64,

    /// Annualized Sharpe ratio; only the vectorized engine produces
    /// one, and a degenerate (zero-variance) return series yields
    /// `None`.
    pub sharpe_ratio: Option<f64>,

    /// Peak-to-trough drawdown percentage (zero or negative).
    pub max_drawdown: Option<f64>,

    /// Percentage of evaluated points with positive P&L; `None` when
    /// nothing was evaluated. A point with exactly zero P&L counts as
    /// a loss, so a series flat at breakeven has a win rate of 0.
    pub win_rate: Option<f64>,

    pub total_trades: usize,

    pub profitable_trades: usize,

    /// Capital at each step, seeded with the initial capital.
    pub equity_curve: Vec<f64>,

    pub trades: Vec<TradeRecord>,
}
