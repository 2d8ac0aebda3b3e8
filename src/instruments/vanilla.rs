//! Canonical single-name option contract used throughout the library.
//!
//! [`OptionContract`] stores the per-contract market scalars (spot,
//! volatility, continuous dividend yield) alongside strike, side, and
//! exercise rights. Maturity and rates live in
//! [`crate::market::PricingConfig`]; the split keeps one contract priceable
//! under several market configurations.

use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, OptionType, PricingError};

/// Vanilla option contract.
///
/// # Examples
/// ```
/// use openvanna::core::{ExerciseStyle, OptionType};
/// use openvanna::instruments::OptionContract;
///
/// let option = OptionContract::new(
///     100.0,
///     100.0,
///     0.20,
///     0.0,
///     OptionType::Call,
///     ExerciseStyle::European,
/// );
/// assert!(option.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Current price of the underlying asset.
    pub spot: f64,
    /// Strike level.
    pub strike: f64,
    /// Annualized volatility of the underlying.
    pub volatility: f64,
    /// Continuous dividend yield of the underlying.
    pub dividend_yield: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// European or American exercise.
    pub style: ExerciseStyle,
}

impl OptionContract {
    /// Builds a contract from its six fields.
    pub fn new(
        spot: f64,
        strike: f64,
        volatility: f64,
        dividend_yield: f64,
        option_type: OptionType,
        style: ExerciseStyle,
    ) -> Self {
        Self {
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            style,
        }
    }

    /// Builds a European call.
    pub fn european_call(spot: f64, strike: f64, volatility: f64, dividend_yield: f64) -> Self {
        Self::new(
            spot,
            strike,
            volatility,
            dividend_yield,
            OptionType::Call,
            ExerciseStyle::European,
        )
    }

    /// Builds a European put.
    pub fn european_put(spot: f64, strike: f64, volatility: f64, dividend_yield: f64) -> Self {
        Self::new(
            spot,
            strike,
            volatility,
            dividend_yield,
            OptionType::Put,
            ExerciseStyle::European,
        )
    }

    /// Builds an American call.
    pub fn american_call(spot: f64, strike: f64, volatility: f64, dividend_yield: f64) -> Self {
        Self::new(
            spot,
            strike,
            volatility,
            dividend_yield,
            OptionType::Call,
            ExerciseStyle::American,
        )
    }

    /// Builds an American put.
    pub fn american_put(spot: f64, strike: f64, volatility: f64, dividend_yield: f64) -> Self {
        Self::new(
            spot,
            strike,
            volatility,
            dividend_yield,
            OptionType::Put,
            ExerciseStyle::American,
        )
    }

    /// Returns a copy with the spot replaced.
    ///
    /// The Greeks harness prices perturbed copies; contracts are never
    /// mutated in place.
    pub fn with_spot(&self, spot: f64) -> Self {
        Self {
            spot,
            ..self.clone()
        }
    }

    /// Returns a copy with the volatility replaced.
    pub fn with_volatility(&self, volatility: f64) -> Self {
        Self {
            volatility,
            ..self.clone()
        }
    }

    /// Exercise value of the contract at the given spot level.
    #[inline]
    pub fn intrinsic(&self, spot: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (spot - self.strike).max(0.0),
            OptionType::Put => (self.strike - spot).max(0.0),
        }
    }

    /// Validates contract fields.
    ///
    /// # Errors
    /// Returns [`PricingError::Config`] when `spot <= 0`, `strike <= 0`,
    /// `volatility <= 0`, or `dividend_yield < 0`.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.spot <= 0.0 || !self.spot.is_finite() {
            return Err(PricingError::Config("spot must be finite and > 0".to_string()));
        }
        if self.strike <= 0.0 || !self.strike.is_finite() {
            return Err(PricingError::Config(
                "strike must be finite and > 0".to_string(),
            ));
        }
        if self.volatility <= 0.0 || !self.volatility.is_finite() {
            return Err(PricingError::Config(
                "volatility must be finite and > 0".to_string(),
            ));
        }
        if self.dividend_yield < 0.0 || !self.dividend_yield.is_finite() {
            return Err(PricingError::Config(
                "dividend yield must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
