//! Options strategy analysis and backtesting engine.
//!
//! Given an option chain snapshot, this crate models multi-leg option
//! strategies (covered calls, iron condors), searches for profitable
//! strike combinations, filters and ranks the candidates, and replays
//! strategy payoffs over historical price series:
//! - `chain`: option contract and chain snapshot types
//! - `pricing`: Black-Scholes pricing, Greeks, implied volatility
//! - `strategy`: payoff, Greeks, and breakeven math per strategy
//! - `analyzer`: per-chain candidate generation and condor search
//! - `filter`: criteria filtering and weighted-score ranking
//! - `backtest`: equity-curve replay over historical prices
//!
//! Everything is a pure function of its inputs; fetching chains,
//! persisting results, and serving them belong to the caller.

pub mod analyzer;
pub mod backtest;
pub mod chain;
pub mod filter;
pub mod pricing;
pub mod strategy;

// Re-export commonly used types
pub use analyzer::StrategyAnalyzer;
pub use backtest::{BacktestEngine, BacktestError, BacktestResult, Backtester, PricePoint, TradeRecord};
pub use chain::{ChainError, OptionContract, OptionType, OptionsChain};
pub use filter::{FilterCriteria, FilterEngine, ScoringFn, StrategyRanking};
pub use pricing::{BlackScholes, Greeks, PricingModel};
pub use strategy::{
    BreakevenDirection, BreakevenPoint, CoveredCall, CoveredCallParams, IronCondor,
    IronCondorParams, ProfitPoint, Strategy, StrategyError, StrategyGreeks, StrategyKind,
    StrategyParameters, StrategyResult,
};
