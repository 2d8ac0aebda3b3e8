//! Pricing configuration: valuation date, maturity, rates, and the
//! per-engine discretization parameters.

use serde::{Deserialize, Serialize};

use crate::core::PricingError;
use crate::rates::{parse_iso_date, today, years_between, YieldCurve};

/// Market and discretization inputs shared by the engines.
///
/// A configuration is immutable once built; perturbed valuations (the
/// Greeks harness, scenario analysis) go through the `with_*` copies.
///
/// # Examples
/// ```
/// use openvanna::market::PricingConfig;
///
/// let config = PricingConfig::builder()
///     .maturity(1.0)
///     .fallback_rate(0.05)
///     .binomial_steps(500)
///     .build()
///     .unwrap();
/// assert_eq!(config.effective_maturity().unwrap(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Valuation date as an ISO-8601 string; `None` means "value today".
    pub valuation_date: Option<String>,
    /// Contractual maturity in years.
    pub maturity: f64,
    /// Constant risk-free rate used when the curve is empty.
    pub fallback_rate: f64,
    /// Term structure of risk-free rates; empty means "use the fallback".
    pub curve: YieldCurve,
    /// Number of steps in the binomial tree.
    pub binomial_steps: usize,
    /// Number of time slices in the Crank-Nicolson grid.
    pub crank_time_steps: usize,
    /// Number of spot nodes in the Crank-Nicolson grid.
    pub crank_spot_steps: usize,
    /// Upper spot bound of the PDE grid; `0.0` means "derive from the
    /// contract as `max(3K, 3S0)`".
    pub s_max: f64,
    /// Number of Monte Carlo paths.
    pub mc_paths: usize,
    /// Number of time steps per Monte Carlo path.
    pub mc_steps: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            valuation_date: None,
            maturity: 1.0,
            fallback_rate: 0.0,
            curve: YieldCurve::new(),
            binomial_steps: 100,
            crank_time_steps: 100,
            crank_spot_steps: 100,
            s_max: 0.0,
            mc_paths: 10_000,
            mc_steps: 100,
        }
    }
}

impl PricingConfig {
    /// Starts a configuration builder.
    pub fn builder() -> PricingConfigBuilder {
        PricingConfigBuilder::default()
    }

    /// Effective time to maturity in years.
    ///
    /// When a valuation date is set, the contractual maturity is reduced by
    /// the 365.25-day year fraction between that date and today:
    /// `T_eff = T - years(valuation_date -> today)`.
    ///
    /// # Errors
    /// Returns [`PricingError::Config`] when the date does not parse or the
    /// effective maturity is not positive.
    pub fn effective_maturity(&self) -> Result<f64, PricingError> {
        let mut effective = self.maturity;
        if let Some(date) = self.valuation_date.as_deref().filter(|d| !d.is_empty()) {
            let valuation = parse_iso_date(date)?;
            effective -= years_between(valuation, today());
        }
        if effective <= 0.0 || !effective.is_finite() {
            return Err(PricingError::Config(format!(
                "effective maturity {effective} must be > 0"
            )));
        }
        Ok(effective)
    }

    /// Short rate at normalized time `u`.
    ///
    /// Interpolates the curve when it has samples and falls back to the
    /// constant rate otherwise. The meaning of `u` is engine-specific; each
    /// engine documents its own normalization.
    pub fn local_rate(&self, u: f64) -> f64 {
        match self.curve.rate(u) {
            Ok(rate) => rate,
            Err(_) => self.fallback_rate,
        }
    }

    /// Returns a copy with the maturity replaced.
    pub fn with_maturity(&self, maturity: f64) -> Self {
        Self {
            maturity,
            ..self.clone()
        }
    }

    /// Returns a copy with the fallback rate replaced.
    pub fn with_fallback_rate(&self, fallback_rate: f64) -> Self {
        Self {
            fallback_rate,
            ..self.clone()
        }
    }

    /// Returns a copy with the curve replaced.
    pub fn with_curve(&self, curve: YieldCurve) -> Self {
        Self {
            curve,
            ..self.clone()
        }
    }
}

/// Builder for [`PricingConfig`].
#[derive(Debug, Clone, Default)]
pub struct PricingConfigBuilder {
    valuation_date: Option<String>,
    maturity: Option<f64>,
    fallback_rate: Option<f64>,
    curve: Option<YieldCurve>,
    binomial_steps: Option<usize>,
    crank_time_steps: Option<usize>,
    crank_spot_steps: Option<usize>,
    s_max: Option<f64>,
    mc_paths: Option<usize>,
    mc_steps: Option<usize>,
}

impl PricingConfigBuilder {
    /// Sets the valuation date (ISO-8601 "YYYY-MM-DD").
    pub fn valuation_date<S: Into<String>>(mut self, date: S) -> Self {
        self.valuation_date = Some(date.into());
        self
    }

    /// Sets the contractual maturity in years.
    pub fn maturity(mut self, maturity: f64) -> Self {
        self.maturity = Some(maturity);
        self
    }

    /// Sets the constant fallback rate.
    pub fn fallback_rate(mut self, rate: f64) -> Self {
        self.fallback_rate = Some(rate);
        self
    }

    /// Sets the rate curve.
    pub fn curve(mut self, curve: YieldCurve) -> Self {
        self.curve = Some(curve);
        self
    }

    /// Sets the binomial tree depth.
    pub fn binomial_steps(mut self, steps: usize) -> Self {
        self.binomial_steps = Some(steps);
        self
    }

    /// Sets the Crank-Nicolson grid as `(time_steps, spot_steps)`.
    pub fn crank_grid(mut self, time_steps: usize, spot_steps: usize) -> Self {
        self.crank_time_steps = Some(time_steps);
        self.crank_spot_steps = Some(spot_steps);
        self
    }

    /// Sets the PDE upper spot bound (`0.0` derives it from the contract).
    pub fn s_max(mut self, s_max: f64) -> Self {
        self.s_max = Some(s_max);
        self
    }

    /// Sets the Monte Carlo simulation size as `(paths, steps_per_path)`.
    pub fn mc_sampling(mut self, paths: usize, steps: usize) -> Self {
        self.mc_paths = Some(paths);
        self.mc_steps = Some(steps);
        self
    }

    /// Validates and builds a [`PricingConfig`].
    ///
    /// # Errors
    /// Returns [`PricingError::Config`] when the maturity or the upper spot
    /// bound is invalid.
    pub fn build(self) -> Result<PricingConfig, PricingError> {
        let defaults = PricingConfig::default();
        let maturity = self.maturity.unwrap_or(defaults.maturity);
        if maturity <= 0.0 || !maturity.is_finite() {
            return Err(PricingError::Config(
                "maturity must be finite and > 0".to_string(),
            ));
        }
        let s_max = self.s_max.unwrap_or(defaults.s_max);
        if s_max < 0.0 || !s_max.is_finite() {
            return Err(PricingError::Config(
                "s_max must be finite and >= 0".to_string(),
            ));
        }

        Ok(PricingConfig {
            valuation_date: self.valuation_date,
            maturity,
            fallback_rate: self.fallback_rate.unwrap_or(defaults.fallback_rate),
            curve: self.curve.unwrap_or(defaults.curve),
            binomial_steps: self.binomial_steps.unwrap_or(defaults.binomial_steps),
            crank_time_steps: self.crank_time_steps.unwrap_or(defaults.crank_time_steps),
            crank_spot_steps: self.crank_spot_steps.unwrap_or(defaults.crank_spot_steps),
            s_max,
            mc_paths: self.mc_paths.unwrap_or(defaults.mc_paths),
            mc_steps: self.mc_steps.unwrap_or(defaults.mc_steps),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn effective_maturity_defaults_to_contractual_maturity() {
        let config = PricingConfig::builder().maturity(2.0).build().unwrap();
        assert_relative_eq!(config.effective_maturity().unwrap(), 2.0);
    }

    #[test]
    fn effective_maturity_fails_when_valuation_date_is_too_old() {
        let config = PricingConfig::builder()
            .maturity(1.0)
            .valuation_date("2000-01-01")
            .build()
            .unwrap();
        assert!(matches!(
            config.effective_maturity(),
            Err(PricingError::Config(_))
        ));
    }

    #[test]
    fn empty_valuation_date_string_means_value_today() {
        let config = PricingConfig::builder()
            .maturity(1.0)
            .valuation_date("")
            .build()
            .unwrap();
        assert_relative_eq!(config.effective_maturity().unwrap(), 1.0);
    }

    #[test]
    fn unparseable_valuation_date_is_a_config_error() {
        let config = PricingConfig::builder()
            .valuation_date("not-a-date")
            .build()
            .unwrap();
        assert!(matches!(
            config.effective_maturity(),
            Err(PricingError::Config(_))
        ));
    }

    #[test]
    fn local_rate_uses_curve_when_present_and_fallback_otherwise() {
        let flat = PricingConfig::builder().fallback_rate(0.05).build().unwrap();
        assert_relative_eq!(flat.local_rate(0.3), 0.05);

        let curved = flat.with_curve(YieldCurve::from_points(&[(0.0, 0.01), (1.0, 0.03)]));
        assert_relative_eq!(curved.local_rate(0.5), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn builder_rejects_non_positive_maturity() {
        assert!(PricingConfig::builder().maturity(0.0).build().is_err());
        assert!(PricingConfig::builder().maturity(-1.0).build().is_err());
    }

    #[test]
    fn perturbation_copies_do_not_touch_the_original() {
        let config = PricingConfig::builder()
            .maturity(1.0)
            .fallback_rate(0.05)
            .build()
            .unwrap();
        let shorter = config.with_maturity(1.0 - 1.0 / 365.0);
        assert_relative_eq!(config.maturity, 1.0);
        assert!(shorter.maturity < config.maturity);
        assert_relative_eq!(shorter.fallback_rate, config.fallback_rate);
    }
}
