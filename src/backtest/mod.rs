//! Historical replay of strategy payoffs.
//!
//! Provides:
//! - Row-by-row and vectorized backtest engines over a price series
//! - Equity curve, drawdown, win rate, and Sharpe summary statistics
//! - Multi-strategy comparison with per-strategy failure isolation

pub mod engine;
pub mod result;

pub use engine::{BacktestEngine, BacktestError, Backtester};
pub use result::{BacktestResult, PricePoint, TradeRecord};
