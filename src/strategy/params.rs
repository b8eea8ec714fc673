//! Strategy parameter types.
//!
//! Callers describe the trade they want analyzed with one of these;
//! the analyzer resolves the actual contracts from a chain snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Covered Call parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveredCallParams {
    pub symbol: String,

    /// Number of shares held against the short calls (typically 100
    /// per contract).
    pub stock_quantity: u32,

    pub call_strike: Decimal,

    pub call_expiration: NaiveDate,

    /// Stock entry price; the chain's underlying price is used when
    /// absent.
    pub stock_price: Option<Decimal>,

    /// Number of call contracts to write.
    pub quantity: u32,
}

/// Iron Condor parameters.
///
/// Strikes must satisfy
/// `put_buy_strike < put_sell_strike < call_sell_strike < call_buy_strike`;
/// construction of the strategy enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IronCondorParams {
    pub symbol: String,
    pub put_sell_strike: Decimal,
    pub put_buy_strike: Decimal,
    pub call_sell_strike: Decimal,
    pub call_buy_strike: Decimal,
    pub expiration: NaiveDate,

    /// Number of spreads.
    pub quantity: u32,
}

/// Parameters for any supported strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy_type")]
pub enum StrategyParameters {
    #[serde(rename = "covered_call")]
    CoveredCall(CoveredCallParams),
    #[serde(rename = "iron_condor")]
    IronCondor(IronCondorParams),
}

impl StrategyParameters {
    pub fn symbol(&self) -> &str {
        match self {
            Self::CoveredCall(p) => &p.symbol,
            Self::IronCondor(p) => &p.symbol,
        }
    }
}
