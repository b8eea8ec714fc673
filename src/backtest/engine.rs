//! Backtest engines.
//!
//! Replays a strategy's expiration payoff over a historical underlying
//! price series. Two engines produce identical numbers:
//! - row-by-row: one pass over the series
//! - vectorized: whole-series P&L computed in parallel, plus an
//!   annualized Sharpe ratio from the return series
//!
//! The engine is chosen at construction; there is no runtime probing.

use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;
use tracing::error;

use crate::strategy::Strategy;

use super::result::{BacktestResult, PricePoint, TradeRecord};

/// Trading periods per year used to annualize the Sharpe ratio.
const PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("historical data is empty")]
    EmptyData,

    #[error("no data in the requested date range")]
    EmptyRange,
}

/// Engine selection for a [`Backtester`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BacktestEngine {
    /// Single pass over the series; no Sharpe ratio.
    #[default]
    RowByRow,
    /// Whole-series evaluation with a Sharpe ratio.
    Vectorized,
}

/// Replays strategies over historical price series.
#[derive(Debug, Default)]
pub struct Backtester {
    engine: BacktestEngine,
}

impl Backtester {
    pub fn new(engine: BacktestEngine) -> Self {
        Self { engine }
    }

    /// Row-by-row backtester.
    pub fn row_by_row() -> Self {
        Self::new(BacktestEngine::RowByRow)
    }

    /// Vectorized backtester.
    pub fn vectorized() -> Self {
        Self::new(BacktestEngine::Vectorized)
    }

    /// Replay `strategy`'s payoff over `series` restricted to the
    /// inclusive `[start, end]` window.
    ///
    /// Points with a non-positive underlying price are skipped. Each
    /// remaining point is marked at `initial_capital + profit_loss`,
    /// simulating entry at fixed cost and exit at that price.
    pub fn backtest_strategy(
        &self,
        strategy: &Strategy,
        series: &[PricePoint],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        initial_capital: f64,
    ) -> Result<BacktestResult, BacktestError> {
        if series.is_empty() {
            return Err(BacktestError::EmptyData);
        }

        let window: Vec<PricePoint> = series
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s) && end.map_or(true, |e| p.date <= e))
            .copied()
            .collect();

        if window.is_empty() {
            return Err(BacktestError::EmptyRange);
        }

        let start_date = start.unwrap_or_else(|| {
            window
                .iter()
                .map(|p| p.date)
                .min()
                .expect("window is non-empty")
        });
        let end_date = end.unwrap_or_else(|| {
            window
                .iter()
                .map(|p| p.date)
                .max()
                .expect("window is non-empty")
        });

        let evaluated: Vec<TradeRecord> = match self.engine {
            BacktestEngine::RowByRow => Self::evaluate_rows(strategy, &window, initial_capital),
            BacktestEngine::Vectorized => {
                Self::evaluate_vectorized(strategy, &window, initial_capital)
            }
        };

        let mut equity_curve = Vec::with_capacity(evaluated.len() + 1);
        equity_curve.push(initial_capital);
        equity_curve.extend(evaluated.iter().map(|t| t.capital));

        let final_capital = *equity_curve.last().expect("seeded with initial capital");
        let total_return = (final_capital - initial_capital) / initial_capital * 100.0;

        let max_drawdown = Self::max_drawdown(&equity_curve);

        let profitable_trades = evaluated.iter().filter(|t| t.pnl > 0.0).count();
        let win_rate = if evaluated.is_empty() {
            None
        } else {
            Some(profitable_trades as f64 / evaluated.len() as f64 * 100.0)
        };

        let sharpe_ratio = match self.engine {
            BacktestEngine::RowByRow => None,
            BacktestEngine::Vectorized => Self::sharpe_ratio(&equity_curve),
        };

        Ok(BacktestResult {
            strategy_type: strategy.kind(),
            symbol: strategy.symbol().to_string(),
            start_date,
            end_date,
            total_return,
            sharpe_ratio,
            max_drawdown,
            win_rate,
            total_trades: evaluated.len(),
            profitable_trades,
            equity_curve,
            trades: evaluated,
        })
    }

    /// Backtest several strategies over the same series. A failure in
    /// one backtest is logged and skipped.
    pub fn compare_strategies(
        &self,
        strategies: &[Strategy],
        series: &[PricePoint],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        initial_capital: f64,
    ) -> Vec<BacktestResult> {
        let mut results = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            match self.backtest_strategy(strategy, series, start, end, initial_capital) {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(
                        "error backtesting {} {}: {}",
                        strategy.symbol(),
                        strategy.kind().as_str(),
                        e
                    );
                }
            }
        }
        results
    }

    fn evaluate_rows(
        strategy: &Strategy,
        window: &[PricePoint],
        initial_capital: f64,
    ) -> Vec<TradeRecord> {
        let mut records = Vec::with_capacity(window.len());
        for point in window {
            if point.underlying_price <= 0.0 {
                continue;
            }
            let pnl = strategy.profit_loss(point.underlying_price);
            records.push(TradeRecord {
                date: point.date,
                underlying_price: point.underlying_price,
                pnl,
                capital: initial_capital + pnl,
            });
        }
        records
    }

    fn evaluate_vectorized(
        strategy: &Strategy,
        window: &[PricePoint],
        initial_capital: f64,
    ) -> Vec<TradeRecord> {
        window
            .par_iter()
            .filter(|p| p.underlying_price > 0.0)
            .map(|point| {
                let pnl = strategy.profit_loss(point.underlying_price);
                TradeRecord {
                    date: point.date,
                    underlying_price: point.underlying_price,
                    pnl,
                    capital: initial_capital + pnl,
                }
            })
            .collect()
    }

    /// Largest peak-to-trough decline as a percentage of the running
    /// peak, zero or negative.
    fn max_drawdown(equity_curve: &[f64]) -> Option<f64> {
        if equity_curve.is_empty() {
            return None;
        }

        let mut peak = f64::MIN;
        let mut worst = 0.0f64;
        for &equity in equity_curve {
            if equity > peak {
                peak = equity;
            }
            if peak > 0.0 {
                let drawdown = (equity - peak) / peak;
                if drawdown < worst {
                    worst = drawdown;
                }
            }
        }

        Some(worst * 100.0)
    }

    /// Annualized Sharpe ratio over the equity curve's step returns,
    /// `None` when the return series is degenerate.
    fn sharpe_ratio(equity_curve: &[f64]) -> Option<f64> {
        if equity_curve.len() < 2 {
            return None;
        }

        let returns: Vec<f64> = equity_curve
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        if returns.is_empty() {
            return None;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        let std_dev = variance.sqrt();

        if std_dev == 0.0 {
            return None;
        }

        Some(mean * PERIODS_PER_YEAR.sqrt() / std_dev)
    }
}
