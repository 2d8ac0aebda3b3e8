//! Core traits, common domain types, and library-wide error structures.

use serde::{Deserialize, Serialize};

use crate::instruments::OptionContract;

pub mod types;

pub use types::*;

/// Standardized Greeks container returned by every engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// First derivative to spot.
    pub delta: f64,
    /// Second derivative to spot.
    pub gamma: f64,
    /// First derivative to volatility (per unit of vol).
    pub vega: f64,
    /// First derivative to time. The sign convention is the negative of the
    /// textbook time-decay value; see the crate documentation.
    pub theta: f64,
    /// First derivative to rate.
    pub rho: f64,
}

impl Greeks {
    /// Returns true when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.delta.is_finite()
            && self.gamma.is_finite()
            && self.vega.is_finite()
            && self.theta.is_finite()
            && self.rho.is_finite()
    }
}

/// Pricing engine abstraction shared by all four valuation methods.
///
/// Engines are value-like: they own their [`crate::market::PricingConfig`]
/// and hold no state across calls, so a single instance may be shared
/// across threads behind a read-only reference.
pub trait OptionPricer {
    /// Theoretical present value of the contract.
    fn price(&self, option: &OptionContract) -> Result<f64, PricingError>;

    /// The five sensitivities (Delta, Gamma, Vega, Theta, Rho).
    fn greeks(&self, option: &OptionContract) -> Result<Greeks, PricingError>;
}

/// Engine and market-data errors surfaced by the API.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Rate lookup on a curve with no samples.
    EmptyCurve,
    /// Malformed line in a yield-curve text source; carries the line content.
    Format(String),
    /// Yield-curve source could not be opened or read.
    Io(String),
    /// Invalid configuration or contract input (non-positive effective
    /// maturity, discretization counts, spot, strike, or volatility).
    Config(String),
    /// CRR risk-neutral probability outside `[0, 1]`; carries the value.
    UnstableTree(f64),
    /// Engine asked to price an exercise style it does not support.
    UnsupportedStyle(String),
    /// Non-finite intermediate or final result.
    Numerical(String),
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCurve => write!(f, "yield curve is empty"),
            Self::Format(line) => write!(f, "invalid yield-curve line: {line}"),
            Self::Io(msg) => write!(f, "yield-curve source error: {msg}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Self::UnstableTree(p) => {
                write!(f, "risk-neutral probability {p} is outside [0, 1]")
            }
            Self::UnsupportedStyle(msg) => write!(f, "unsupported exercise style: {msg}"),
            Self::Numerical(msg) => write!(f, "numerical error: {msg}"),
        }
    }
}

impl std::error::Error for PricingError {}
