//! Filtering and ranking of strategy results.
//!
//! Provides:
//! - Conjunctive filtering against optional numeric/categorical
//!   criteria (intersection semantics, order-independent)
//! - Weighted-sum scoring and stable descending ranking

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::strategy::{StrategyKind, StrategyResult};

/// Optional thresholds a result must satisfy. Unset criteria are
/// ignored; the set ones are combined conjunctively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Minimum max profit.
    pub min_profit: Option<f64>,
    /// Minimum risk/reward ratio; results without one are dropped.
    pub min_risk_reward: Option<f64>,
    /// Minimum probability of profit; results without one are dropped.
    pub min_probability: Option<f64>,
    /// Maximum allowed loss.
    pub max_loss: Option<f64>,
    /// Minimum premium collected; only credit entries qualify.
    pub min_premium_collected: Option<f64>,
    /// Maximum distance between the outer breakeven points.
    pub max_breakeven_range: Option<f64>,
    /// Underlying symbol, compared case-insensitively.
    pub symbol: Option<String>,
    /// Restrict to one strategy kind.
    pub strategy_type: Option<StrategyKind>,
}

/// A scored strategy result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRanking {
    pub result: StrategyResult,
    pub score: f64,
    /// The inputs that fed the score, for display alongside it.
    pub ranking_metrics: HashMap<String, f64>,
}

/// Scoring function for ranking.
pub type ScoringFn = fn(&StrategyResult) -> f64;

/// Filters and ranks strategy results.
///
/// Stateless; construct one wherever needed.
#[derive(Debug, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Keep only results satisfying every set criterion.
    pub fn filter(
        &self,
        results: Vec<StrategyResult>,
        criteria: &FilterCriteria,
    ) -> Vec<StrategyResult> {
        let mut filtered = results;

        if let Some(symbol) = &criteria.symbol {
            filtered.retain(|r| r.symbol.eq_ignore_ascii_case(symbol));
        }

        if let Some(kind) = criteria.strategy_type {
            filtered.retain(|r| r.strategy_type == kind);
        }

        if let Some(min_profit) = criteria.min_profit {
            filtered.retain(|r| r.max_profit >= min_profit);
        }

        if let Some(min_rr) = criteria.min_risk_reward {
            filtered.retain(|r| r.risk_reward_ratio.is_some_and(|rr| rr >= min_rr));
        }

        if let Some(min_prob) = criteria.min_probability {
            filtered.retain(|r| r.probability_of_profit.is_some_and(|p| p >= min_prob));
        }

        if let Some(max_loss) = criteria.max_loss {
            filtered.retain(|r| r.max_loss <= max_loss);
        }

        if let Some(min_premium) = criteria.min_premium_collected {
            filtered.retain(|r| r.is_credit() && r.entry_cost.abs() >= min_premium);
        }

        if let Some(max_range) = criteria.max_breakeven_range {
            filtered.retain(|r| r.breakeven_range() <= max_range);
        }

        debug!("filter kept {} results", filtered.len());
        filtered
    }

    /// Score and sort results, highest score first. The sort is
    /// stable, so equal scores keep their input order.
    pub fn rank(
        &self,
        results: Vec<StrategyResult>,
        scoring: Option<ScoringFn>,
    ) -> Vec<StrategyRanking> {
        let scoring = scoring.unwrap_or(Self::default_score);

        let mut rankings: Vec<StrategyRanking> = results
            .into_iter()
            .map(|result| {
                let score = scoring(&result);
                let ranking_metrics = Self::ranking_metrics(&result);
                StrategyRanking {
                    result,
                    score,
                    ranking_metrics,
                }
            })
            .collect();

        rankings.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        rankings
    }

    /// Filter, then rank the survivors.
    pub fn filter_and_rank(
        &self,
        results: Vec<StrategyResult>,
        criteria: &FilterCriteria,
        scoring: Option<ScoringFn>,
    ) -> Vec<StrategyRanking> {
        let filtered = self.filter(results, criteria);
        self.rank(filtered, scoring)
    }

    /// Default weighted-sum score:
    /// - 0.3 x max profit, normalized against $10,000
    /// - 0.3 x risk/reward, normalized against 10 (when present)
    /// - 0.2 x probability of profit (when present)
    /// - 0.2 x premium collected, normalized against $5,000
    ///   (credit entries only)
    pub fn default_score(result: &StrategyResult) -> f64 {
        let mut score = 0.0;

        score += (result.max_profit / 10_000.0).min(1.0) * 0.3;

        if let Some(risk_reward) = result.risk_reward_ratio {
            score += (risk_reward / 10.0).min(1.0) * 0.3;
        }

        if let Some(probability) = result.probability_of_profit {
            score += probability * 0.2;
        }

        if result.is_credit() {
            score += (result.entry_cost.abs() / 5_000.0).min(1.0) * 0.2;
        }

        score
    }

    fn ranking_metrics(result: &StrategyResult) -> HashMap<String, f64> {
        let mut metrics = HashMap::new();
        metrics.insert("max_profit".to_string(), result.max_profit);
        metrics.insert("max_loss".to_string(), result.max_loss);
        metrics.insert("entry_cost".to_string(), result.entry_cost);

        if let Some(risk_reward) = result.risk_reward_ratio {
            metrics.insert("risk_reward_ratio".to_string(), risk_reward);
        }
        if let Some(probability) = result.probability_of_profit {
            metrics.insert("probability_of_profit".to_string(), probability);
        }
        if let Some(greeks) = &result.greeks {
            metrics.insert("delta".to_string(), greeks.delta);
            metrics.insert("theta".to_string(), greeks.theta);
            metrics.insert("vega".to_string(), greeks.vega);
        }

        metrics.insert("breakeven_range".to_string(), result.breakeven_range());
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{
        BreakevenDirection, BreakevenPoint, CoveredCallParams, StrategyParameters,
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn result(symbol: &str, max_profit: f64, entry_cost: f64) -> StrategyResult {
        StrategyResult {
            strategy_type: StrategyKind::CoveredCall,
            symbol: symbol.to_string(),
            parameters: StrategyParameters::CoveredCall(CoveredCallParams {
                symbol: symbol.to_string(),
                stock_quantity: 100,
                call_strike: dec!(155),
                call_expiration: chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                stock_price: Some(dec!(150)),
                quantity: 1,
            }),
            entry_cost,
            max_profit,
            max_loss: 1_000.0,
            breakeven_points: vec![BreakevenPoint {
                price: 147.5,
                direction: BreakevenDirection::Below,
            }],
            profit_profile: Vec::new(),
            greeks: None,
            probability_of_profit: Some(0.6),
            risk_reward_ratio: Some(max_profit / 1_000.0),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_min_profit_filter() {
        let engine = FilterEngine::new();
        let results = vec![
            result("SPY", 100.0, 500.0),
            result("SPY", 500.0, 500.0),
            result("SPY", 1_000.0, 500.0),
        ];
        let criteria = FilterCriteria {
            min_profit: Some(400.0),
            ..Default::default()
        };

        let filtered = engine.filter(results, &criteria);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.max_profit >= 400.0));
    }

    #[test]
    fn test_filter_is_commutative() {
        let engine = FilterEngine::new();
        let results = vec![
            result("SPY", 100.0, -600.0),
            result("SPY", 500.0, -400.0),
            result("QQQ", 1_000.0, -800.0),
        ];

        // Apply {min_profit, min_premium_collected} in both orders.
        let a_then_b = engine.filter(
            engine.filter(
                results.clone(),
                &FilterCriteria {
                    min_profit: Some(400.0),
                    ..Default::default()
                },
            ),
            &FilterCriteria {
                min_premium_collected: Some(500.0),
                ..Default::default()
            },
        );
        let b_then_a = engine.filter(
            engine.filter(
                results,
                &FilterCriteria {
                    min_premium_collected: Some(500.0),
                    ..Default::default()
                },
            ),
            &FilterCriteria {
                min_profit: Some(400.0),
                ..Default::default()
            },
        );

        assert_eq!(a_then_b.len(), b_then_a.len());
        let symbols: Vec<_> = a_then_b.iter().map(|r| r.symbol.as_str()).collect();
        let symbols_rev: Vec<_> = b_then_a.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, symbols_rev);
    }

    #[test]
    fn test_symbol_filter_case_insensitive() {
        let engine = FilterEngine::new();
        let results = vec![result("SPY", 100.0, 500.0), result("QQQ", 100.0, 500.0)];
        let criteria = FilterCriteria {
            symbol: Some("spy".to_string()),
            ..Default::default()
        };

        let filtered = engine.filter(results, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].symbol, "SPY");
    }

    #[test]
    fn test_premium_filter_only_matches_credits() {
        let engine = FilterEngine::new();
        // Debit entry with a large |entry_cost| must not pass.
        let results = vec![result("SPY", 100.0, 900.0), result("SPY", 100.0, -900.0)];
        let criteria = FilterCriteria {
            min_premium_collected: Some(500.0),
            ..Default::default()
        };

        let filtered = engine.filter(results, &criteria);
        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].entry_cost < 0.0);
    }

    #[test]
    fn test_rank_sorted_descending() {
        let engine = FilterEngine::new();
        let results = vec![
            result("SPY", 100.0, -500.0),
            result("SPY", 5_000.0, -500.0),
            result("SPY", 1_000.0, -500.0),
        ];

        let rankings = engine.rank(results, None);
        assert_eq!(rankings.len(), 3);
        assert!(rankings[0].score >= rankings[1].score);
        assert!(rankings[1].score >= rankings[2].score);
        assert_eq!(rankings[0].result.max_profit, 5_000.0);
    }

    #[test]
    fn test_rank_stable_under_reversal() {
        let engine = FilterEngine::new();
        let results = vec![
            result("SPY", 100.0, -500.0),
            result("SPY", 5_000.0, -500.0),
            result("SPY", 1_000.0, -500.0),
        ];
        let mut reversed = results.clone();
        reversed.reverse();

        let scores: Vec<f64> = engine.rank(results, None).iter().map(|r| r.score).collect();
        let scores_rev: Vec<f64> = engine
            .rank(reversed, None)
            .iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(scores, scores_rev);
    }

    #[test]
    fn test_default_score_weights() {
        let r = result("SPY", 10_000.0, -5_000.0);
        // Profit and premium capped at 1.0, risk/reward 10.0 capped,
        // probability 0.6.
        let expected = 0.3 + 0.3 + 0.6 * 0.2 + 0.2;
        assert!((FilterEngine::default_score(&r) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ranking_metrics_contents() {
        let engine = FilterEngine::new();
        let rankings = engine.rank(vec![result("SPY", 750.0, -250.0)], None);
        let metrics = &rankings[0].ranking_metrics;

        assert_eq!(metrics["max_profit"], 750.0);
        assert_eq!(metrics["entry_cost"], -250.0);
        assert!(metrics.contains_key("probability_of_profit"));
        assert!(metrics.contains_key("breakeven_range"));
        // No greeks on this result.
        assert!(!metrics.contains_key("delta"));
    }

    #[test]
    fn test_filter_and_rank_composes() {
        let engine = FilterEngine::new();
        let results = vec![
            result("SPY", 100.0, -500.0),
            result("SPY", 5_000.0, -500.0),
        ];
        let criteria = FilterCriteria {
            min_profit: Some(400.0),
            ..Default::default()
        };

        let rankings = engine.filter_and_rank(results, &criteria, None);
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].result.max_profit, 5_000.0);
    }

    #[test]
    fn test_custom_scoring_function() {
        let engine = FilterEngine::new();
        let results = vec![
            result("SPY", 100.0, -500.0),
            result("SPY", 5_000.0, -500.0),
        ];

        // Invert the usual preference: smaller profit first.
        let rankings = engine.rank(results, Some(|r| -r.max_profit));
        assert_eq!(rankings[0].result.max_profit, 100.0);
    }
}
