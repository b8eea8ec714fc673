//! Black-Scholes pricing model.
//!
//! European pricing with continuous dividend yield. Conventions:
//! - theta is per calendar day (annual theta / 365)
//! - vega and rho are per 1% move in vol / rates
//! - implied volatility is solved by bisection and reports
//!   non-convergence as `None`

use std::f64::consts::PI;

use statrs::distribution::{ContinuousCDF, Normal};
use tracing::warn;

use crate::chain::OptionType;

use super::{Greeks, PricingModel};

const IV_LOWER_BOUND: f64 = 0.001;
const IV_UPPER_BOUND: f64 = 5.0;
const IV_MAX_ITER: usize = 100;
const IV_PRICE_TOLERANCE: f64 = 1e-6;

/// Black-Scholes calculator for options pricing and Greeks.
#[derive(Debug, Clone)]
pub struct BlackScholes {
    /// Risk-free interest rate.
    pub rate: f64,
    /// Dividend yield.
    pub dividend: f64,
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self {
            rate: 0.05,
            dividend: 0.01,
        }
    }
}

impl BlackScholes {
    pub fn new(rate: f64, dividend: f64) -> Self {
        Self { rate, dividend }
    }

    /// Calculate d1 parameter.
    fn d1(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        let numerator =
            (spot / strike).ln() + (self.rate - self.dividend + 0.5 * vol * vol) * time;
        numerator / (vol * time.sqrt())
    }

    /// Calculate d2 parameter.
    fn d2(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        self.d1(spot, strike, time, vol) - vol * time.sqrt()
    }

    /// Standard normal CDF.
    fn norm_cdf(x: f64) -> f64 {
        let normal = Normal::new(0.0, 1.0).unwrap();
        normal.cdf(x)
    }

    /// Standard normal PDF.
    fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

    /// Call option price. At or past expiry this is intrinsic value.
    pub fn call_price(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        if time <= 0.0 || vol <= 0.0 {
            return (spot - strike).max(0.0);
        }

        let d1 = self.d1(spot, strike, time, vol);
        let d2 = self.d2(spot, strike, time, vol);

        spot * (-self.dividend * time).exp() * Self::norm_cdf(d1)
            - strike * (-self.rate * time).exp() * Self::norm_cdf(d2)
    }

    /// Put option price. At or past expiry this is intrinsic value.
    pub fn put_price(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        if time <= 0.0 || vol <= 0.0 {
            return (strike - spot).max(0.0);
        }

        let d1 = self.d1(spot, strike, time, vol);
        let d2 = self.d2(spot, strike, time, vol);

        strike * (-self.rate * time).exp() * Self::norm_cdf(-d2)
            - spot * (-self.dividend * time).exp() * Self::norm_cdf(-d1)
    }

    /// Price by option type.
    pub fn price_for(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        option_type: OptionType,
    ) -> f64 {
        match option_type {
            OptionType::Call => self.call_price(spot, strike, time, vol),
            OptionType::Put => self.put_price(spot, strike, time, vol),
        }
    }

    /// Delta. Collapses to 0/±1 at expiry.
    pub fn delta(&self, spot: f64, strike: f64, time: f64, vol: f64, option_type: OptionType) -> f64 {
        if time <= 0.0 || vol <= 0.0 {
            return match option_type {
                OptionType::Call => {
                    if spot > strike {
                        1.0
                    } else {
                        0.0
                    }
                }
                OptionType::Put => {
                    if spot < strike {
                        -1.0
                    } else {
                        0.0
                    }
                }
            };
        }

        let d1 = self.d1(spot, strike, time, vol);
        let discount = (-self.dividend * time).exp();

        match option_type {
            OptionType::Call => discount * Self::norm_cdf(d1),
            OptionType::Put => discount * (Self::norm_cdf(d1) - 1.0),
        }
    }

    /// Gamma (identical for calls and puts).
    pub fn gamma(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        if time <= 0.0 || vol <= 0.0 {
            return 0.0;
        }

        let d1 = self.d1(spot, strike, time, vol);
        let discount = (-self.dividend * time).exp();

        discount * Self::norm_pdf(d1) / (spot * vol * time.sqrt())
    }

    /// Vega per 1% change in volatility (identical for calls and puts).
    pub fn vega(&self, spot: f64, strike: f64, time: f64, vol: f64) -> f64 {
        if time <= 0.0 || vol <= 0.0 {
            return 0.0;
        }

        let d1 = self.d1(spot, strike, time, vol);
        let discount = (-self.dividend * time).exp();

        spot * discount * Self::norm_pdf(d1) * time.sqrt() / 100.0
    }

    /// Theta per calendar day.
    pub fn theta(&self, spot: f64, strike: f64, time: f64, vol: f64, option_type: OptionType) -> f64 {
        if time <= 0.0 || vol <= 0.0 {
            return 0.0;
        }

        let d1 = self.d1(spot, strike, time, vol);
        let d2 = self.d2(spot, strike, time, vol);
        let discount_d = (-self.dividend * time).exp();
        let discount_r = (-self.rate * time).exp();

        let term1 = -spot * discount_d * Self::norm_pdf(d1) * vol / (2.0 * time.sqrt());

        match option_type {
            OptionType::Call => {
                let term2 = self.dividend * spot * discount_d * Self::norm_cdf(d1);
                let term3 = self.rate * strike * discount_r * Self::norm_cdf(d2);
                (term1 + term2 - term3) / 365.0
            }
            OptionType::Put => {
                let term2 = self.dividend * spot * discount_d * Self::norm_cdf(-d1);
                let term3 = self.rate * strike * discount_r * Self::norm_cdf(-d2);
                (term1 - term2 + term3) / 365.0
            }
        }
    }

    /// Rho per 1% change in rates.
    pub fn rho(&self, spot: f64, strike: f64, time: f64, vol: f64, option_type: OptionType) -> f64 {
        if time <= 0.0 || vol <= 0.0 {
            return 0.0;
        }

        let d2 = self.d2(spot, strike, time, vol);
        let discount = (-self.rate * time).exp();

        match option_type {
            OptionType::Call => strike * time * discount * Self::norm_cdf(d2) / 100.0,
            OptionType::Put => -strike * time * discount * Self::norm_cdf(-d2) / 100.0,
        }
    }

    /// Solve implied volatility by bisection on [0.001, 5.0].
    ///
    /// Returns `None` when the market price cannot be bracketed (below
    /// intrinsic or above the model's upper bound) or the solver does
    /// not reach the price tolerance.
    pub fn implied_vol(
        &self,
        market_price: f64,
        spot: f64,
        strike: f64,
        time: f64,
        option_type: OptionType,
    ) -> Option<f64> {
        if time <= 0.0 || market_price <= 0.0 || spot <= 0.0 || strike <= 0.0 {
            return None;
        }

        let mut lo = IV_LOWER_BOUND;
        let mut hi = IV_UPPER_BOUND;

        let price_lo = self.price_for(spot, strike, time, lo, option_type);
        let price_hi = self.price_for(spot, strike, time, hi, option_type);
        if market_price < price_lo || market_price > price_hi {
            return None;
        }

        for _ in 0..IV_MAX_ITER {
            let mid = 0.5 * (lo + hi);
            let diff = self.price_for(spot, strike, time, mid, option_type) - market_price;

            if diff.abs() < IV_PRICE_TOLERANCE {
                return Some(mid);
            }

            if diff < 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        None
    }
}

impl PricingModel for BlackScholes {
    fn price(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Option<f64> {
        if spot <= 0.0 || strike <= 0.0 {
            warn!(
                "cannot price option with spot {} strike {}",
                spot, strike
            );
            return None;
        }
        Some(self.price_for(spot, strike, time, volatility, option_type))
    }

    fn greeks(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Option<Greeks> {
        if spot <= 0.0 || strike <= 0.0 {
            warn!(
                "cannot compute Greeks with spot {} strike {}",
                spot, strike
            );
            return None;
        }
        Some(Greeks {
            delta: self.delta(spot, strike, time, volatility, option_type),
            gamma: self.gamma(spot, strike, time, volatility),
            theta: self.theta(spot, strike, time, volatility, option_type),
            vega: self.vega(spot, strike, time, volatility),
            rho: self.rho(spot, strike, time, volatility, option_type),
        })
    }

    fn implied_vol(
        &self,
        market_price: f64,
        spot: f64,
        strike: f64,
        time: f64,
        option_type: OptionType,
    ) -> Option<f64> {
        BlackScholes::implied_vol(self, market_price, spot, strike, time, option_type)
    }
}
