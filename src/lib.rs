//! OpenVanna values single-name equity options and computes their first-
//! and second-order sensitivities (Delta, Gamma, Vega, Theta, Rho).
//!
//! Four interchangeable engines implement one pricing contract
//! ([`core::OptionPricer`]):
//! - [`engines::BlackScholesEngine`]: closed form, European exercise only.
//! - [`engines::BinomialTreeEngine`]: Cox-Ross-Rubinstein tree, European
//!   and American.
//! - [`engines::CrankNicolsonEngine`]: finite differences on the
//!   Black-Scholes PDE, European and American.
//! - [`engines::MonteCarloEngine`]: GBM simulation for European,
//!   Longstaff-Schwartz regression for American.
//!
//! Engines share a [`market::PricingConfig`] carrying the valuation date,
//! maturity, a fallback risk-free rate, an optional
//! [`rates::YieldCurve`] term structure, and per-engine discretization
//! parameters. Engines without closed-form Greeks use the bump-and-reprice
//! harness in [`greeks`].
//!
//! References used across modules:
//! - Hull, *Options, Futures, and Other Derivatives*, Ch. 13, 15, 19, 21.
//! - Cox, Ross, and Rubinstein (1979) for the lattice.
//! - Longstaff and Schwartz (2001) for regression-based early exercise.
//! - Glasserman (2004) for Monte Carlo estimators.
//!
//! # Conventions worth knowing
//! - **Theta sign**: the returned Theta is the negative of the textbook
//!   time-decay value (positive for a plain call losing value as the clock
//!   runs). The finite-difference harness uses the matching backward
//!   difference, so analytic and bumped Thetas agree in sign.
//! - **Vega units**: per unit of volatility; scale by 0.01 for per-percent.
//! - **Curve lookups**: each engine reads the curve at its own normalized
//!   time (documented per engine); the closed-form engine prices off the
//!   fallback rate and treats the curve as informational.
//! - **Determinism**: Monte Carlo uses a fixed seed (42) by default so
//!   repeated calls and bump-and-reprice Greeks are reproducible;
//!   override it with `MonteCarloEngine::with_seed`.
//!
//! # Quick start
//! Price a European call and its Greeks:
//! ```rust
//! use openvanna::core::OptionPricer;
//! use openvanna::engines::BlackScholesEngine;
//! use openvanna::instruments::OptionContract;
//! use openvanna::market::PricingConfig;
//!
//! let config = PricingConfig::builder()
//!     .maturity(1.0)
//!     .fallback_rate(0.05)
//!     .build()
//!     .unwrap();
//! let engine = BlackScholesEngine::new(config);
//! let option = OptionContract::european_call(100.0, 100.0, 0.20, 0.0);
//!
//! let price = engine.price(&option).unwrap();
//! assert!(price > 10.0 && price < 11.0);
//!
//! let greeks = engine.greeks(&option).unwrap();
//! assert!(greeks.delta > 0.0 && greeks.delta < 1.0);
//! ```
//!
//! Price an American put on a rate curve:
//! ```rust
//! use openvanna::core::OptionPricer;
//! use openvanna::engines::BinomialTreeEngine;
//! use openvanna::instruments::OptionContract;
//! use openvanna::market::PricingConfig;
//! use openvanna::rates::YieldCurve;
//!
//! let curve = YieldCurve::parse("0.0 0.01\n0.5 0.03\n1.0 0.05\n").unwrap();
//! let config = PricingConfig::builder()
//!     .maturity(1.0)
//!     .fallback_rate(0.03)
//!     .curve(curve)
//!     .binomial_steps(500)
//!     .build()
//!     .unwrap();
//! let engine = BinomialTreeEngine::new(config);
//! let put = OptionContract::american_put(100.0, 100.0, 0.20, 0.0);
//! assert!(engine.price(&put).unwrap() > 0.0);
//! ```

pub mod bindings;
pub mod core;
pub mod engines;
pub mod greeks;
pub mod instruments;
pub mod market;
pub mod math;
pub mod rates;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::{ExerciseStyle, Greeks, OptionPricer, OptionType, PricingError};
    pub use crate::engines::{
        build_pricer, BinomialTreeEngine, BlackScholesEngine, CrankNicolsonEngine,
        MonteCarloEngine, PricerKind,
    };
    pub use crate::greeks::{bump_and_reprice, ConfiguredPricer};
    pub use crate::instruments::OptionContract;
    pub use crate::market::PricingConfig;
    pub use crate::rates::{RatePoint, YieldCurve};
}
