//! Analytic Black-Scholes engine for European options.
//!
//! Reference: Hull, *Options, Futures, and Other Derivatives*, Ch. 15 for
//! the pricing formula and Ch. 19 for the Greeks. The returned Theta is the
//! negative of the textbook time-decay value; see the crate documentation
//! for the sign convention.

use crate::core::{ExerciseStyle, Greeks, OptionPricer, OptionType, PricingError};
use crate::greeks::ConfiguredPricer;
use crate::instruments::OptionContract;
use crate::market::PricingConfig;
use crate::math::{normal_cdf, normal_pdf};

/// Closed-form Black-Scholes engine.
///
/// Supports European exercise only and prices off the configured fallback
/// rate; the term-structure curve is informational for this engine.
#[derive(Debug, Clone)]
pub struct BlackScholesEngine {
    /// Market and valuation-date configuration.
    pub config: PricingConfig,
}

impl BlackScholesEngine {
    /// Creates an engine from a pricing configuration.
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    fn require_european(&self, option: &OptionContract) -> Result<(), PricingError> {
        match option.style {
            ExerciseStyle::European => Ok(()),
            ExerciseStyle::American => Err(PricingError::UnsupportedStyle(
                "Black-Scholes engine prices European exercise only".to_string(),
            )),
        }
    }
}

#[inline]
fn d1_d2(
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    expiry: f64,
) -> (f64, f64) {
    let sig_sqrt_t = vol * expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate - dividend_yield + 0.5 * vol * vol) * expiry)
        / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

impl OptionPricer for BlackScholesEngine {
    fn price(&self, option: &OptionContract) -> Result<f64, PricingError> {
        option.validate()?;
        self.require_european(option)?;

        let expiry = self.config.effective_maturity()?;
        let rate = self.config.fallback_rate;

        let (d1, d2) = d1_d2(
            option.spot,
            option.strike,
            rate,
            option.dividend_yield,
            option.volatility,
            expiry,
        );
        let df_r = (-rate * expiry).exp();
        let df_q = (-option.dividend_yield * expiry).exp();

        Ok(match option.option_type {
            OptionType::Call => {
                option.spot * df_q * normal_cdf(d1) - option.strike * df_r * normal_cdf(d2)
            }
            OptionType::Put => {
                option.strike * df_r * normal_cdf(-d2) - option.spot * df_q * normal_cdf(-d1)
            }
        })
    }

    fn greeks(&self, option: &OptionContract) -> Result<Greeks, PricingError> {
        option.validate()?;
        self.require_european(option)?;

        let expiry = self.config.effective_maturity()?;
        let rate = self.config.fallback_rate;
        let spot = option.spot;
        let strike = option.strike;
        let vol = option.volatility;
        let q = option.dividend_yield;

        // Shared intermediates, computed once for all five outputs.
        let sqrt_t = expiry.sqrt();
        let (d1, d2) = d1_d2(spot, strike, rate, q, vol, expiry);
        let df_r = (-rate * expiry).exp();
        let df_q = (-q * expiry).exp();
        let pdf_d1 = normal_pdf(d1);

        let (delta, textbook_theta, rho) = match option.option_type {
            OptionType::Call => {
                let nd1 = normal_cdf(d1);
                let nd2 = normal_cdf(d2);
                let theta = -spot * df_q * pdf_d1 * vol / (2.0 * sqrt_t)
                    - rate * strike * df_r * nd2
                    + q * spot * df_q * nd1;
                (df_q * nd1, theta, strike * expiry * df_r * nd2)
            }
            OptionType::Put => {
                let nmd1 = normal_cdf(-d1);
                let nmd2 = normal_cdf(-d2);
                let theta = -spot * df_q * pdf_d1 * vol / (2.0 * sqrt_t)
                    + rate * strike * df_r * nmd2
                    - q * spot * df_q * nmd1;
                (-df_q * nmd1, theta, -strike * expiry * df_r * nmd2)
            }
        };

        let gamma = df_q * pdf_d1 / (spot * vol * sqrt_t);
        let vega = spot * df_q * pdf_d1 * sqrt_t;

        Ok(Greeks {
            delta,
            gamma,
            vega,
            // Returned with the sign flipped relative to the textbook value.
            theta: -textbook_theta,
            rho,
        })
    }
}

impl ConfiguredPricer for BlackScholesEngine {
    fn config(&self) -> &PricingConfig {
        &self.config
    }

    fn with_config(&self, config: PricingConfig) -> Self {
        Self::new(config)
    }
}
