//! Finite-difference Greeks for engines without closed-form sensitivities.
//!
//! Bump-and-reprice never mutates the engine or the contract: spot and
//! volatility bumps go through perturbed contract copies, while time and
//! rate bumps rebuild the engine from a perturbed configuration. Every
//! rebuilt engine keeps the original discretization parameters (and, for
//! Monte Carlo, the original seed) so the differences sit on common random
//! numbers.

use crate::core::{Greeks, OptionPricer, PricingError};
use crate::instruments::OptionContract;
use crate::market::PricingConfig;

/// Relative spot bump for Delta and Gamma.
const SPOT_BUMP_FRACTION: f64 = 0.01;
/// Absolute volatility bump for Vega (per unit of vol).
const VOL_BUMP: f64 = 0.01;
/// One day, for the backward Theta difference.
const TIME_BUMP: f64 = 1.0 / 365.0;
/// Absolute rate bump for Rho, applied to the whole curve or the fallback.
const RATE_BUMP: f64 = 0.001;

/// Engines whose valuation is driven by a [`PricingConfig`] and that can be
/// rebuilt around a perturbed configuration.
pub trait ConfiguredPricer: OptionPricer {
    /// The configuration this engine prices under.
    fn config(&self) -> &PricingConfig;

    /// Rebuilds the engine around another configuration, keeping every
    /// engine-local parameter (such as a Monte Carlo seed).
    fn with_config(&self, config: PricingConfig) -> Self
    where
        Self: Sized;
}

/// Central-difference Greeks by bump-and-reprice.
///
/// - `Delta`/`Gamma`: spot bumped by `0.01 * spot`.
/// - `Vega`: volatility bumped by 0.01 (per unit of vol; scale by 0.01 for
///   a per-percent figure). The contract volatility must exceed the bump.
/// - `Theta`: backward difference `(P(T - 1/365) - P(T)) / (-1/365)`,
///   matching the analytic engine's sign convention.
/// - `Rho`: every curve rate shifted by 0.001 when the curve has samples,
///   the fallback rate otherwise.
pub fn bump_and_reprice<P: ConfiguredPricer>(
    pricer: &P,
    option: &OptionContract,
) -> Result<Greeks, PricingError> {
    let base = pricer.price(option)?;

    let spot_bump = SPOT_BUMP_FRACTION * option.spot;
    let spot_up = pricer.price(&option.with_spot(option.spot + spot_bump))?;
    let spot_down = pricer.price(&option.with_spot(option.spot - spot_bump))?;
    let delta = (spot_up - spot_down) / (2.0 * spot_bump);
    let gamma = (spot_up - 2.0 * base + spot_down) / (spot_bump * spot_bump);

    let vol_up = pricer.price(&option.with_volatility(option.volatility + VOL_BUMP))?;
    let vol_down = pricer.price(&option.with_volatility(option.volatility - VOL_BUMP))?;
    let vega = (vol_up - vol_down) / (2.0 * VOL_BUMP);

    let config = pricer.config();
    let shorter = pricer.with_config(config.with_maturity(config.maturity - TIME_BUMP));
    let theta = (shorter.price(option)? - base) / (-TIME_BUMP);

    let (bumped_up, bumped_down) = if config.curve.is_empty() {
        (
            config.with_fallback_rate(config.fallback_rate + RATE_BUMP),
            config.with_fallback_rate(config.fallback_rate - RATE_BUMP),
        )
    } else {
        (
            config.with_curve(config.curve.shifted(RATE_BUMP)),
            config.with_curve(config.curve.shifted(-RATE_BUMP)),
        )
    };
    let rate_up = pricer.with_config(bumped_up).price(option)?;
    let rate_down = pricer.with_config(bumped_down).price(option)?;
    let rho = (rate_up - rate_down) / (2.0 * RATE_BUMP);

    let greeks = Greeks {
        delta,
        gamma,
        vega,
        theta,
        rho,
    };
    if !greeks.is_finite() {
        return Err(PricingError::Numerical(
            "finite-difference Greeks are not finite".to_string(),
        ));
    }
    Ok(greeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::analytic::BlackScholesEngine;
    use crate::engines::tree::BinomialTreeEngine;
    use crate::rates::YieldCurve;
    use approx::assert_abs_diff_eq;

    fn config() -> PricingConfig {
        PricingConfig::builder()
            .maturity(1.0)
            .fallback_rate(0.05)
            .binomial_steps(500)
            .build()
            .unwrap()
    }

    #[test]
    fn harness_matches_analytic_black_scholes_greeks() {
        let option = OptionContract::european_call(100.0, 100.0, 0.20, 0.0);
        let engine = BlackScholesEngine::new(config());

        let bumped = bump_and_reprice(&engine, &option).unwrap();
        let analytic = engine.greeks(&option).unwrap();

        assert_abs_diff_eq!(bumped.delta, analytic.delta, epsilon = 1e-3);
        assert_abs_diff_eq!(bumped.gamma, analytic.gamma, epsilon = 1e-2);
        assert_abs_diff_eq!(bumped.vega, analytic.vega, epsilon = 1e-2);
        assert_abs_diff_eq!(bumped.rho, analytic.rho, epsilon = 1e-2);
        assert_abs_diff_eq!(bumped.theta, analytic.theta, epsilon = 1e-1);
    }

    #[test]
    fn rho_uses_the_curve_when_it_has_samples() {
        let option = OptionContract::european_call(100.0, 100.0, 0.20, 0.0);
        let curve = YieldCurve::from_points(&[(0.0, 0.05), (1.0, 0.05)]);

        let flat = BinomialTreeEngine::new(config());
        let curved = BinomialTreeEngine::new(config().with_curve(curve));

        // A flat curve equal to the fallback must reproduce the same Rho
        // whether the shift hits the curve or the fallback.
        let rho_flat = bump_and_reprice(&flat, &option).unwrap().rho;
        let rho_curved = bump_and_reprice(&curved, &option).unwrap().rho;
        assert_abs_diff_eq!(rho_flat, rho_curved, epsilon = 1e-6);
    }

    #[test]
    fn binomial_greeks_have_the_expected_signs() {
        let engine = BinomialTreeEngine::new(config());

        let call = bump_and_reprice(
            &engine,
            &OptionContract::european_call(100.0, 100.0, 0.20, 0.0),
        )
        .unwrap();
        assert!(call.delta > 0.0 && call.delta < 1.0);
        assert!(call.gamma >= 0.0);
        assert!(call.vega >= 0.0);

        let put = bump_and_reprice(
            &engine,
            &OptionContract::european_put(100.0, 100.0, 0.20, 0.0),
        )
        .unwrap();
        assert!(put.delta < 0.0 && put.delta > -1.0);
    }
}
