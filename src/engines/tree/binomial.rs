//! Cox-Ross-Rubinstein binomial tree engine.
//!
//! Reference: Cox, Ross, and Rubinstein (1979); Hull Ch. 13 for the
//! backward-induction recursion. The tree recombines with fixed up/down
//! factors while the short rate varies per step: each induction step reads
//! the curve at `i/N` (step index over total steps, so the root is `u = 0`)
//! and rebuilds the risk-neutral probability and discount factor from that
//! local rate.

use crate::core::{ExerciseStyle, Greeks, OptionPricer, PricingError};
use crate::greeks::{bump_and_reprice, ConfiguredPricer};
use crate::instruments::OptionContract;
use crate::market::PricingConfig;

/// CRR binomial tree engine for European and American options.
#[derive(Debug, Clone)]
pub struct BinomialTreeEngine {
    /// Market and discretization configuration.
    pub config: PricingConfig,
}

impl BinomialTreeEngine {
    /// Creates an engine from a pricing configuration.
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }
}

impl OptionPricer for BinomialTreeEngine {
    fn price(&self, option: &OptionContract) -> Result<f64, PricingError> {
        option.validate()?;

        let steps = self.config.binomial_steps;
        if steps == 0 {
            return Err(PricingError::Config(
                "binomial steps must be > 0".to_string(),
            ));
        }

        let expiry = self.config.effective_maturity()?;
        let dt = expiry / steps as f64;
        let up = (option.volatility * dt.sqrt()).exp();
        let down = 1.0 / up;
        let ratio = up / down;

        // Recombination requires fixed up/down factors, so the tree is
        // validated with a single probability built from the fallback rate.
        let growth = ((self.config.fallback_rate - option.dividend_yield) * dt).exp();
        let probability = (growth - down) / (up - down);
        if !(0.0..=1.0).contains(&probability) || !probability.is_finite() {
            return Err(PricingError::UnstableTree(probability));
        }

        let is_american = option.style == ExerciseStyle::American;

        // Terminal payoffs, lowest node first, via the multiplicative
        // recurrence spot * down^steps * ratio^j.
        let mut values = vec![0.0_f64; steps + 1];
        let mut spot = option.spot * down.powi(steps as i32);
        for value in values.iter_mut() {
            *value = option.intrinsic(spot);
            spot *= ratio;
        }

        let mut base = option.spot * down.powi(steps as i32 - 1);
        for i in (0..steps).rev() {
            let normalized = i as f64 / steps as f64;
            let rate = self.config.local_rate(normalized);
            let growth = ((rate - option.dividend_yield) * dt).exp();
            let p_local = (growth - down) / (up - down);
            let discount = (-rate * dt).exp();
            let disc_up = discount * p_local;
            let disc_down = discount * (1.0 - p_local);

            if is_american {
                let mut spot = base;
                for j in 0..=i {
                    let continuation = disc_up * values[j + 1] + disc_down * values[j];
                    values[j] = continuation.max(option.intrinsic(spot));
                    spot *= ratio;
                }
            } else {
                for j in 0..=i {
                    values[j] = disc_up * values[j + 1] + disc_down * values[j];
                }
            }
            base *= up;
        }

        Ok(values[0])
    }

    fn greeks(&self, option: &OptionContract) -> Result<Greeks, PricingError> {
        bump_and_reprice(self, option)
    }
}

impl ConfiguredPricer for BinomialTreeEngine {
    fn config(&self) -> &PricingConfig {
        &self.config
    }

    fn with_config(&self, config: PricingConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::analytic::BlackScholesEngine;
    use approx::assert_abs_diff_eq;

    fn config(steps: usize) -> PricingConfig {
        PricingConfig::builder()
            .maturity(1.0)
            .fallback_rate(0.05)
            .binomial_steps(steps)
            .build()
            .unwrap()
    }

    #[test]
    fn european_call_converges_to_black_scholes() {
        let option = OptionContract::european_call(100.0, 100.0, 0.20, 0.0);
        let tree = BinomialTreeEngine::new(config(500)).price(&option).unwrap();
        let analytic = BlackScholesEngine::new(config(500)).price(&option).unwrap();

        assert_abs_diff_eq!(tree, analytic, epsilon = 1e-2);
    }

    #[test]
    fn american_put_dominates_european_put() {
        let engine = BinomialTreeEngine::new(config(500));
        let european = engine
            .price(&OptionContract::european_put(100.0, 100.0, 0.20, 0.0))
            .unwrap();
        let american = engine
            .price(&OptionContract::american_put(100.0, 100.0, 0.20, 0.0))
            .unwrap();

        assert!(
            american >= european,
            "american={american} european={european}"
        );
        assert_abs_diff_eq!(american, 6.09, epsilon = 2e-2);
    }

    #[test]
    fn american_call_without_dividend_matches_european_call() {
        let engine = BinomialTreeEngine::new(config(500));
        let european = engine
            .price(&OptionContract::european_call(100.0, 100.0, 0.20, 0.0))
            .unwrap();
        let american = engine
            .price(&OptionContract::american_call(100.0, 100.0, 0.20, 0.0))
            .unwrap();

        assert_abs_diff_eq!(american, european, epsilon = 1e-8);
    }

    #[test]
    fn degenerate_probability_is_reported_as_unstable() {
        // Tiny volatility with a large rate pushes the risk-neutral
        // probability above one.
        let config = PricingConfig::builder()
            .maturity(1.0)
            .fallback_rate(1.0)
            .binomial_steps(1)
            .build()
            .unwrap();
        let option = OptionContract::european_call(100.0, 100.0, 0.01, 0.0);

        assert!(matches!(
            BinomialTreeEngine::new(config).price(&option),
            Err(PricingError::UnstableTree(_))
        ));
    }

    #[test]
    fn zero_steps_is_a_config_error() {
        let config = PricingConfig::builder().binomial_steps(0).build().unwrap();
        let option = OptionContract::european_call(100.0, 100.0, 0.20, 0.0);
        assert!(matches!(
            BinomialTreeEngine::new(config).price(&option),
            Err(PricingError::Config(_))
        ));
    }

    #[test]
    fn flat_curve_matches_empty_curve_with_equal_fallback() {
        use crate::rates::YieldCurve;

        let option = OptionContract::american_put(100.0, 100.0, 0.20, 0.0);
        let empty = BinomialTreeEngine::new(config(200)).price(&option).unwrap();
        let flat = BinomialTreeEngine::new(
            config(200).with_curve(YieldCurve::from_points(&[(0.0, 0.05), (1.0, 0.05)])),
        )
        .price(&option)
        .unwrap();

        assert_abs_diff_eq!(empty, flat, epsilon = 1e-12);
    }
}
