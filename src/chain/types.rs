//! Core market data types for options analysis.
//!
//! An [`OptionsChain`] is an immutable snapshot of one underlying's
//! listed contracts at a point in time, as delivered by an external
//! market-data collaborator. Quoted values (strikes, bid/ask) are kept
//! as `Decimal`; derived analytics (IV, Greeks) are `f64`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Put => "PUT",
        }
    }
}

/// Errors raised while assembling an options chain.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("contract symbol {contract} does not match chain symbol {chain}")]
    SymbolMismatch { chain: String, contract: String },

    #[error("duplicate {option_type:?} contract at strike {strike} expiring {expiration}")]
    DuplicateContract {
        strike: Decimal,
        expiration: NaiveDate,
        option_type: OptionType,
    },
}

/// A single option contract's market state.
///
/// Immutable snapshot of one leg: quotes, size, and (when the data
/// vendor supplies them) implied volatility and Greeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying symbol (e.g., "SPY").
    pub symbol: String,

    /// Strike price.
    pub strike: Decimal,

    /// Expiration date.
    pub expiration: NaiveDate,

    /// Call or put.
    pub option_type: OptionType,

    /// Bid price.
    pub bid: Decimal,

    /// Ask price.
    pub ask: Decimal,

    /// Last traded price, if any trade printed.
    pub last: Option<Decimal>,

    /// Trading volume.
    pub volume: i64,

    /// Open interest.
    pub open_interest: i64,

    /// Implied volatility (annualized).
    pub implied_volatility: Option<f64>,

    /// Per-contract delta.
    pub delta: Option<f64>,

    /// Per-contract gamma.
    pub gamma: Option<f64>,

    /// Per-contract theta.
    pub theta: Option<f64>,

    /// Per-contract vega.
    pub vega: Option<f64>,

    /// Vendor contract identifier.
    pub contract_id: Option<i64>,

    /// Exchange the quote came from (OPRA, SMART, ...).
    pub exchange: Option<String>,
}

impl OptionContract {
    /// Mid price between bid and ask.
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }

    /// Bid-ask spread as a fraction of mid.
    pub fn spread_pct(&self) -> f64 {
        let mid = self.mid();
        if mid.is_zero() {
            return 0.0;
        }
        let spread = self.ask - self.bid;
        (spread / mid).try_into().unwrap_or(0.0)
    }

    /// Whether the quote is usable for trade construction: an offer
    /// exists and the market is not crossed.
    pub fn is_quotable(&self) -> bool {
        self.ask > Decimal::ZERO && self.ask >= self.bid && self.bid >= Decimal::ZERO
    }
}

/// Snapshot of all contracts for one underlying.
///
/// Invariants maintained at construction: every contract carries the
/// chain's symbol, and no two contracts share (strike, expiration,
/// type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsChain {
    /// Underlying symbol.
    pub symbol: String,

    /// Underlying price at snapshot time.
    pub underlying_price: Decimal,

    /// Snapshot timestamp.
    pub timestamp: DateTime<Utc>,

    contracts: Vec<OptionContract>,
}

impl OptionsChain {
    /// Create an empty chain.
    pub fn new(
        symbol: impl Into<String>,
        underlying_price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            underlying_price,
            timestamp,
            contracts: Vec::new(),
        }
    }

    /// Build a chain from a contract list, validating the invariants.
    pub fn with_contracts(
        symbol: impl Into<String>,
        underlying_price: Decimal,
        timestamp: DateTime<Utc>,
        contracts: Vec<OptionContract>,
    ) -> Result<Self, ChainError> {
        let mut chain = Self::new(symbol, underlying_price, timestamp);
        for contract in contracts {
            chain.add_contract(contract)?;
        }
        Ok(chain)
    }

    /// Add a contract, rejecting symbol mismatches and duplicate legs.
    pub fn add_contract(&mut self, contract: OptionContract) -> Result<(), ChainError> {
        if contract.symbol != self.symbol {
            return Err(ChainError::SymbolMismatch {
                chain: self.symbol.clone(),
                contract: contract.symbol,
            });
        }
        if self
            .find(contract.strike, contract.expiration, contract.option_type)
            .is_some()
        {
            return Err(ChainError::DuplicateContract {
                strike: contract.strike,
                expiration: contract.expiration,
                option_type: contract.option_type,
            });
        }
        self.contracts.push(contract);
        Ok(())
    }

    /// All contracts in insertion order.
    pub fn contracts(&self) -> &[OptionContract] {
        &self.contracts
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// All contracts for a specific expiration.
    pub fn contracts_for_expiration(&self, expiration: NaiveDate) -> Vec<&OptionContract> {
        self.contracts
            .iter()
            .filter(|c| c.expiration == expiration)
            .collect()
    }

    /// Calls for a specific expiration.
    pub fn calls_for_expiration(&self, expiration: NaiveDate) -> Vec<&OptionContract> {
        self.contracts
            .iter()
            .filter(|c| c.option_type == OptionType::Call && c.expiration == expiration)
            .collect()
    }

    /// Puts for a specific expiration.
    pub fn puts_for_expiration(&self, expiration: NaiveDate) -> Vec<&OptionContract> {
        self.contracts
            .iter()
            .filter(|c| c.option_type == OptionType::Put && c.expiration == expiration)
            .collect()
    }

    /// Find the contract at a specific (strike, expiration, type), if listed.
    pub fn find(
        &self,
        strike: Decimal,
        expiration: NaiveDate,
        option_type: OptionType,
    ) -> Option<&OptionContract> {
        self.contracts.iter().find(|c| {
            c.strike == strike && c.expiration == expiration && c.option_type == option_type
        })
    }

    /// All expirations present in this chain, sorted and deduped.
    pub fn expirations(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = self.contracts.iter().map(|c| c.expiration).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn contract(strike: Decimal, option_type: OptionType) -> OptionContract {
        OptionContract {
            symbol: "SPY".to_string(),
            strike,
            expiration: NaiveDate::from_ymd_opt(2024, 2, 16).unwrap(),
            option_type,
            bid: dec!(1.00),
            ask: dec!(1.10),
            last: None,
            volume: 100,
            open_interest: 500,
            implied_volatility: Some(0.18),
            delta: Some(0.30),
            gamma: None,
            theta: None,
            vega: None,
            contract_id: None,
            exchange: None,
        }
    }

    #[test]
    fn test_option_type_parsing() {
        assert_eq!(OptionType::parse("C"), Some(OptionType::Call));
        assert_eq!(OptionType::parse("put"), Some(OptionType::Put));
        assert_eq!(OptionType::parse("CALL"), Some(OptionType::Call));
        assert_eq!(OptionType::parse("X"), None);
    }

    #[test]
    fn test_mid_and_spread() {
        let c = contract(dec!(470), OptionType::Call);
        assert_eq!(c.mid(), dec!(1.05));
        let pct = c.spread_pct();
        assert!((pct - 0.0952).abs() < 0.001);
    }

    #[test]
    fn test_chain_rejects_symbol_mismatch() {
        let mut chain = OptionsChain::new("SPY", dec!(480), Utc::now());
        let mut c = contract(dec!(470), OptionType::Call);
        c.symbol = "QQQ".to_string();
        assert!(matches!(
            chain.add_contract(c),
            Err(ChainError::SymbolMismatch { .. })
        ));
    }

    #[test]
    fn test_chain_rejects_duplicate_leg() {
        let mut chain = OptionsChain::new("SPY", dec!(480), Utc::now());
        chain.add_contract(contract(dec!(470), OptionType::Call)).unwrap();
        // Same strike but opposite type is fine.
        chain.add_contract(contract(dec!(470), OptionType::Put)).unwrap();
        assert!(matches!(
            chain.add_contract(contract(dec!(470), OptionType::Call)),
            Err(ChainError::DuplicateContract { .. })
        ));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_expiration_lookups() {
        let mut chain = OptionsChain::new("SPY", dec!(480), Utc::now());
        chain.add_contract(contract(dec!(470), OptionType::Call)).unwrap();
        chain.add_contract(contract(dec!(475), OptionType::Call)).unwrap();
        chain.add_contract(contract(dec!(460), OptionType::Put)).unwrap();

        let exp = NaiveDate::from_ymd_opt(2024, 2, 16).unwrap();
        assert_eq!(chain.calls_for_expiration(exp).len(), 2);
        assert_eq!(chain.puts_for_expiration(exp).len(), 1);
        assert_eq!(chain.expirations(), vec![exp]);
        assert!(chain
            .find(dec!(460), exp, OptionType::Put)
            .is_some());
        let other = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert!(chain.calls_for_expiration(other).is_empty());
    }
}
