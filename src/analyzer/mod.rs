//! Strategy analysis over option chain snapshots.
//!
//! The analyzer instantiates strategies for candidate contracts in a
//! chain and collects their analysis results:
//! - Covered calls across every call at the requested expiration
//! - An iron condor at four named strikes
//! - A combinatorial search over all valid condor strike combinations
//!
//! Missing data is an empty result list, never an error; individual
//! candidates that fail to construct are logged and skipped.

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::chain::{OptionContract, OptionType, OptionsChain};
use crate::strategy::{
    CoveredCall, CoveredCallParams, IronCondor, IronCondorParams, Strategy, StrategyParameters,
    StrategyResult,
};

/// Analyzes option strategies across strikes and expirations.
///
/// Stateless; construct one wherever needed and share it freely
/// across threads.
#[derive(Debug, Default)]
pub struct StrategyAnalyzer;

impl StrategyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch on the parameter variant.
    pub fn analyze(
        &self,
        params: &StrategyParameters,
        chain: &OptionsChain,
    ) -> Vec<StrategyResult> {
        match params {
            StrategyParameters::CoveredCall(p) => self.analyze_covered_call(p, chain),
            StrategyParameters::IronCondor(p) => self.analyze_iron_condor(p, chain),
        }
    }

    /// Analyze a covered call against every call contract at the
    /// requested expiration.
    ///
    /// The stock entry price comes from the parameters when present,
    /// otherwise from the chain's underlying price.
    pub fn analyze_covered_call(
        &self,
        params: &CoveredCallParams,
        chain: &OptionsChain,
    ) -> Vec<StrategyResult> {
        let stock_price = params.stock_price.unwrap_or(chain.underlying_price);
        if stock_price <= Decimal::ZERO {
            error!("stock price not available for {}", params.symbol);
            return Vec::new();
        }

        let calls = chain.calls_for_expiration(params.call_expiration);
        if calls.is_empty() {
            warn!(
                "no call contracts found for {} expiring {}",
                params.symbol, params.call_expiration
            );
            return Vec::new();
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            match CoveredCall::from_params(params, call.clone(), Some(stock_price)) {
                Ok(strategy) => results.push(Strategy::from(strategy).analyze()),
                Err(e) => {
                    error!(
                        "error analyzing covered call with strike {}: {}",
                        call.strike, e
                    );
                }
            }
        }

        results
    }

    /// Analyze an iron condor at the four strikes named in the
    /// parameters. Any missing leg yields an empty list.
    pub fn analyze_iron_condor(
        &self,
        params: &IronCondorParams,
        chain: &OptionsChain,
    ) -> Vec<StrategyResult> {
        let exp = params.expiration;
        let put_sell = chain.find(params.put_sell_strike, exp, OptionType::Put);
        let put_buy = chain.find(params.put_buy_strike, exp, OptionType::Put);
        let call_sell = chain.find(params.call_sell_strike, exp, OptionType::Call);
        let call_buy = chain.find(params.call_buy_strike, exp, OptionType::Call);

        let legs = match (put_sell, put_buy, call_sell, call_buy) {
            (Some(ps), Some(pb), Some(cs), Some(cb)) => (ps, pb, cs, cb),
            _ => {
                let mut missing = Vec::new();
                if put_sell.is_none() {
                    missing.push(format!("put_sell ({})", params.put_sell_strike));
                }
                if put_buy.is_none() {
                    missing.push(format!("put_buy ({})", params.put_buy_strike));
                }
                if call_sell.is_none() {
                    missing.push(format!("call_sell ({})", params.call_sell_strike));
                }
                if call_buy.is_none() {
                    missing.push(format!("call_buy ({})", params.call_buy_strike));
                }
                warn!("missing contracts for iron condor: {}", missing.join(", "));
                return Vec::new();
            }
        };

        match IronCondor::from_params(
            params,
            legs.0.clone(),
            legs.1.clone(),
            legs.2.clone(),
            legs.3.clone(),
        ) {
            Ok(strategy) => vec![Strategy::from(strategy).analyze()],
            Err(e) => {
                error!("error analyzing iron condor: {}", e);
                Vec::new()
            }
        }
    }

    /// Search every valid iron condor strike combination at one
    /// expiration, keeping combinations whose net credit is at least
    /// `min_credit`.
    ///
    /// The enumeration is over index pairs into the strike-sorted put
    /// and call lists, O(P^2 * C^2); callers bound the result volume
    /// by limiting the chain fed in. Put pairs are partitioned across
    /// worker threads, and the output order is deterministic (index
    /// order) regardless of partitioning.
    pub fn analyze_iron_condor_variations(
        &self,
        symbol: &str,
        expiration: NaiveDate,
        chain: &OptionsChain,
        quantity: u32,
        min_credit: f64,
    ) -> Vec<StrategyResult> {
        let contracts = chain.contracts_for_expiration(expiration);
        if contracts.is_empty() {
            warn!("no contracts found for {} expiring {}", symbol, expiration);
            return Vec::new();
        }

        let mut puts: Vec<&OptionContract> = contracts
            .iter()
            .copied()
            .filter(|c| c.option_type == OptionType::Put)
            .collect();
        puts.sort_by_key(|c| c.strike);

        let mut calls: Vec<&OptionContract> = contracts
            .iter()
            .copied()
            .filter(|c| c.option_type == OptionType::Call)
            .collect();
        calls.sort_by_key(|c| c.strike);

        if puts.len() < 2 || calls.len() < 2 {
            warn!(
                "insufficient contracts for iron condor search on {} ({} puts, {} calls)",
                symbol,
                puts.len(),
                calls.len()
            );
            return Vec::new();
        }

        // (put_buy, put_sell) index pairs with put_buy below put_sell.
        let put_pairs: Vec<(usize, usize)> = (0..puts.len() - 1)
            .flat_map(|i| ((i + 1)..puts.len()).map(move |j| (i, j)))
            .collect();

        put_pairs
            .par_iter()
            .flat_map_iter(|&(i, j)| {
                let put_buy = puts[i];
                let put_sell = puts[j];
                let mut found = Vec::new();

                for k in 0..calls.len() - 1 {
                    let call_sell = calls[k];
                    if put_sell.strike >= call_sell.strike {
                        continue;
                    }

                    for &call_buy in &calls[k + 1..] {
                        if let Some(result) = self.try_condor_combination(
                            symbol, put_sell, put_buy, call_sell, call_buy, quantity, min_credit,
                        ) {
                            found.push(result);
                        }
                    }
                }

                found
            })
            .collect()
    }

    /// Evaluate one strike combination, returning `None` when it is
    /// malformed, rejected at construction, or below the credit floor.
    #[allow(clippy::too_many_arguments)]
    fn try_condor_combination(
        &self,
        symbol: &str,
        put_sell: &OptionContract,
        put_buy: &OptionContract,
        call_sell: &OptionContract,
        call_buy: &OptionContract,
        quantity: u32,
        min_credit: f64,
    ) -> Option<StrategyResult> {
        // Unusable quotes: nothing to sell into, or a crossed market.
        if put_sell.bid <= Decimal::ZERO || call_sell.bid <= Decimal::ZERO {
            return None;
        }
        if !put_buy.is_quotable() || !call_buy.is_quotable() {
            return None;
        }

        let condor = match IronCondor::new(
            symbol,
            put_sell.clone(),
            put_buy.clone(),
            call_sell.clone(),
            call_buy.clone(),
            quantity,
        ) {
            Ok(condor) => condor,
            Err(e) => {
                debug!(
                    "skipping condor combination {}/{}/{}/{}: {}",
                    put_buy.strike, put_sell.strike, call_sell.strike, call_buy.strike, e
                );
                return None;
            }
        };

        // Entry cost is negative for a credit.
        if condor.entry_cost() > -min_credit {
            return None;
        }

        Some(Strategy::from(condor).analyze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn contract(
        strike: Decimal,
        option_type: OptionType,
        bid: Decimal,
        ask: Decimal,
        delta: f64,
    ) -> OptionContract {
        OptionContract {
            symbol: "SPY".to_string(),
            strike,
            expiration: NaiveDate::from_ymd_opt(2024, 2, 16).unwrap(),
            option_type,
            bid,
            ask,
            last: None,
            volume: 120,
            open_interest: 600,
            implied_volatility: Some(0.18),
            delta: Some(delta),
            gamma: Some(0.01),
            theta: Some(-0.02),
            vega: Some(0.09),
            contract_id: None,
            exchange: None,
        }
    }

    fn expiration() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 16).unwrap()
    }

    fn condor_chain() -> OptionsChain {
        // Three puts below and three calls above a 150 underlying.
        OptionsChain::with_contracts(
            "SPY",
            dec!(150),
            Utc::now(),
            vec![
                contract(dec!(135), OptionType::Put, dec!(0.60), dec!(0.70), -0.10),
                contract(dec!(140), OptionType::Put, dec!(1.00), dec!(1.10), -0.15),
                contract(dec!(145), OptionType::Put, dec!(2.00), dec!(2.10), -0.25),
                contract(dec!(155), OptionType::Call, dec!(2.00), dec!(2.10), 0.25),
                contract(dec!(160), OptionType::Call, dec!(1.00), dec!(1.10), 0.15),
                contract(dec!(165), OptionType::Call, dec!(0.60), dec!(0.70), 0.10),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_covered_call_sweeps_expiration() {
        let chain = condor_chain();
        let analyzer = StrategyAnalyzer::new();
        let params = CoveredCallParams {
            symbol: "SPY".to_string(),
            stock_quantity: 100,
            call_strike: dec!(155),
            call_expiration: expiration(),
            stock_price: None,
            quantity: 1,
        };

        let results = analyzer.analyze_covered_call(&params, &chain);
        // One result per call in the chain, using the chain's
        // underlying price as the stock entry.
        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .all(|r| r.strategy_type == crate::strategy::StrategyKind::CoveredCall));
    }

    #[test]
    fn test_covered_call_empty_on_missing_expiration() {
        let chain = condor_chain();
        let analyzer = StrategyAnalyzer::new();
        let params = CoveredCallParams {
            symbol: "SPY".to_string(),
            stock_quantity: 100,
            call_strike: dec!(155),
            call_expiration: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
            stock_price: Some(dec!(150)),
            quantity: 1,
        };

        assert!(analyzer.analyze_covered_call(&params, &chain).is_empty());
    }

    #[test]
    fn test_iron_condor_named_strikes() {
        let chain = condor_chain();
        let analyzer = StrategyAnalyzer::new();
        let params = IronCondorParams {
            symbol: "SPY".to_string(),
            put_sell_strike: dec!(145),
            put_buy_strike: dec!(140),
            call_sell_strike: dec!(155),
            call_buy_strike: dec!(160),
            expiration: expiration(),
            quantity: 1,
        };

        let results = analyzer.analyze_iron_condor(&params, &chain);
        assert_eq!(results.len(), 1);
        assert!((results[0].entry_cost + 180.0).abs() < 1e-9);
        assert!((results[0].max_profit - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_iron_condor_missing_leg_is_empty() {
        let chain = condor_chain();
        let analyzer = StrategyAnalyzer::new();
        let params = IronCondorParams {
            symbol: "SPY".to_string(),
            put_sell_strike: dec!(147), // not listed
            put_buy_strike: dec!(140),
            call_sell_strike: dec!(155),
            call_buy_strike: dec!(160),
            expiration: expiration(),
            quantity: 1,
        };

        assert!(analyzer.analyze_iron_condor(&params, &chain).is_empty());
    }

    #[test]
    fn test_variation_search_enumerates_valid_combinations() {
        let chain = condor_chain();
        let analyzer = StrategyAnalyzer::new();

        let results =
            analyzer.analyze_iron_condor_variations("SPY", expiration(), &chain, 1, 0.0);

        // 3 put pairs x 3 call pairs, every put strike below every
        // call strike, all with positive credit.
        assert_eq!(results.len(), 9);
        for result in &results {
            assert!(result.entry_cost < 0.0);
            assert_eq!(result.breakeven_points.len(), 2);
        }
    }

    #[test]
    fn test_variation_search_credit_floor() {
        let chain = condor_chain();
        let analyzer = StrategyAnalyzer::new();

        let all = analyzer.analyze_iron_condor_variations("SPY", expiration(), &chain, 1, 0.0);
        let rich =
            analyzer.analyze_iron_condor_variations("SPY", expiration(), &chain, 1, 180.0);

        assert!(rich.len() < all.len());
        for result in &rich {
            assert!(-result.entry_cost >= 180.0);
        }
    }

    #[test]
    fn test_variation_search_insufficient_contracts() {
        let chain = OptionsChain::with_contracts(
            "SPY",
            dec!(150),
            Utc::now(),
            vec![contract(
                dec!(145),
                OptionType::Put,
                dec!(2.00),
                dec!(2.10),
                -0.25,
            )],
        )
        .unwrap();
        let analyzer = StrategyAnalyzer::new();

        assert!(analyzer
            .analyze_iron_condor_variations("SPY", expiration(), &chain, 1, 0.0)
            .is_empty());
    }

    #[test]
    fn test_dispatch_by_parameter_variant() {
        let chain = condor_chain();
        let analyzer = StrategyAnalyzer::new();

        let params = StrategyParameters::IronCondor(IronCondorParams {
            symbol: "SPY".to_string(),
            put_sell_strike: dec!(145),
            put_buy_strike: dec!(140),
            call_sell_strike: dec!(155),
            call_buy_strike: dec!(160),
            expiration: expiration(),
            quantity: 1,
        });

        assert_eq!(analyzer.analyze(&params, &chain).len(), 1);
    }
}
