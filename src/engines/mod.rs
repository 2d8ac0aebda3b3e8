//! The four valuation engines and the name-keyed factory.

pub mod analytic;
pub mod monte_carlo;
pub mod pde;
pub mod tree;

pub use analytic::BlackScholesEngine;
pub use monte_carlo::MonteCarloEngine;
pub use pde::CrankNicolsonEngine;
pub use tree::BinomialTreeEngine;

use crate::core::{OptionPricer, PricingError};
use crate::market::PricingConfig;

/// Selector for the available pricing engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricerKind {
    /// Closed-form Black-Scholes (European only).
    BlackScholes,
    /// Cox-Ross-Rubinstein binomial tree.
    Binomial,
    /// Crank-Nicolson finite differences.
    CrankNicolson,
    /// GBM simulation / Longstaff-Schwartz.
    MonteCarlo,
}

impl std::str::FromStr for PricerKind {
    type Err = PricingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "blackscholes" | "black-scholes" | "black_scholes" => Ok(Self::BlackScholes),
            "binomial" => Ok(Self::Binomial),
            "cranknicolson" | "crank-nicolson" | "crank_nicolson" => Ok(Self::CrankNicolson),
            "montecarlo" | "monte-carlo" | "monte_carlo" => Ok(Self::MonteCarlo),
            other => Err(PricingError::Config(format!("unknown pricer kind: {other}"))),
        }
    }
}

/// Builds a boxed engine of the requested kind around a configuration.
///
/// # Examples
/// ```
/// use openvanna::core::OptionPricer;
/// use openvanna::engines::{build_pricer, PricerKind};
/// use openvanna::instruments::OptionContract;
/// use openvanna::market::PricingConfig;
///
/// let config = PricingConfig::builder()
///     .maturity(1.0)
///     .fallback_rate(0.05)
///     .build()
///     .unwrap();
/// let pricer = build_pricer(PricerKind::BlackScholes, config);
/// let option = OptionContract::european_call(100.0, 100.0, 0.20, 0.0);
/// assert!(pricer.price(&option).unwrap() > 0.0);
/// ```
pub fn build_pricer(kind: PricerKind, config: PricingConfig) -> Box<dyn OptionPricer> {
    match kind {
        PricerKind::BlackScholes => Box::new(BlackScholesEngine::new(config)),
        PricerKind::Binomial => Box::new(BinomialTreeEngine::new(config)),
        PricerKind::CrankNicolson => Box::new(CrankNicolsonEngine::new(config)),
        PricerKind::MonteCarlo => Box::new(MonteCarloEngine::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_common_spellings() {
        assert_eq!(
            "black-scholes".parse::<PricerKind>().unwrap(),
            PricerKind::BlackScholes
        );
        assert_eq!("Binomial".parse::<PricerKind>().unwrap(), PricerKind::Binomial);
        assert_eq!(
            "crank_nicolson".parse::<PricerKind>().unwrap(),
            PricerKind::CrankNicolson
        );
        assert_eq!(
            "MonteCarlo".parse::<PricerKind>().unwrap(),
            PricerKind::MonteCarlo
        );
        assert!("trinomial".parse::<PricerKind>().is_err());
    }

    #[test]
    fn factory_builds_every_engine_kind() {
        use crate::instruments::OptionContract;

        let config = PricingConfig::builder()
            .maturity(1.0)
            .fallback_rate(0.05)
            .mc_sampling(1_000, 20)
            .build()
            .unwrap();
        let option = OptionContract::european_call(100.0, 100.0, 0.20, 0.0);

        for kind in [
            PricerKind::BlackScholes,
            PricerKind::Binomial,
            PricerKind::CrankNicolson,
            PricerKind::MonteCarlo,
        ] {
            let price = build_pricer(kind, config.clone()).price(&option).unwrap();
            assert!(price > 0.0, "{kind:?} returned {price}");
        }
    }
}
