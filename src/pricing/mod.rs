//! Options pricing utilities.
//!
//! Provides:
//! - Black-Scholes pricing, Greeks, and a bisection implied-vol solver
//! - The [`PricingModel`] trait, the injectable backend seam for
//!   callers that want to swap the model

pub mod black_scholes;

use serde::{Deserialize, Serialize};

use crate::chain::OptionType;

pub use black_scholes::BlackScholes;

/// Greeks for a single option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

/// A pricing backend resolved once by the caller and passed where
/// model prices are needed.
///
/// Implementations must not panic on degenerate inputs: a price the
/// model cannot produce is `None`, never NaN or infinity.
pub trait PricingModel: Send + Sync {
    /// Theoretical option price.
    fn price(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Option<f64>;

    /// Full Greeks for one contract.
    fn greeks(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Option<Greeks>;

    /// Implied volatility backing out a market price, `None` on
    /// non-convergence.
    fn implied_vol(
        &self,
        market_price: f64,
        spot: f64,
        strike: f64,
        time: f64,
        option_type: OptionType,
    ) -> Option<f64>;
}
