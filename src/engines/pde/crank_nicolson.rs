//! Crank-Nicolson finite-difference engine for the Black-Scholes PDE.
//!
//! Discretizes the `(t, S)` plane, averages the explicit and implicit
//! half-steps, and solves one tridiagonal system per time slice with the
//! Thomas algorithm. American exercise is handled by projecting each slice
//! onto the intrinsic payoff. The curve is read at `(T_eff - t) / T_eff`
//! (time remaining over total), which differs from the binomial engine's
//! step-index convention; both are part of the engine contracts.

use crate::core::{ExerciseStyle, Greeks, OptionPricer, OptionType, PricingError};
use crate::greeks::{bump_and_reprice, ConfiguredPricer};
use crate::instruments::OptionContract;
use crate::market::PricingConfig;

/// Crank-Nicolson PDE engine for European and American options.
#[derive(Debug, Clone)]
pub struct CrankNicolsonEngine {
    /// Market and discretization configuration.
    pub config: PricingConfig,
}

impl CrankNicolsonEngine {
    /// Creates an engine from a pricing configuration.
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }
}

/// Thomas-algorithm solve writing into `x`; `c_star` and `d_star` are
/// scratch space. `lower[0]` and `upper[n-1]` are ignored.
fn solve_tridiagonal_inplace(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[f64],
    c_star: &mut [f64],
    d_star: &mut [f64],
    x: &mut [f64],
) -> Result<(), PricingError> {
    let n = diag.len();

    let pivot = diag[0];
    if pivot.abs() <= 1.0e-14 || !pivot.is_finite() {
        return Err(PricingError::Numerical(
            "tridiagonal solver hit a singular pivot".to_string(),
        ));
    }
    c_star[0] = if n > 1 { upper[0] / pivot } else { 0.0 };
    d_star[0] = rhs[0] / pivot;

    for i in 1..n {
        let pivot = diag[i] - lower[i] * c_star[i - 1];
        if pivot.abs() <= 1.0e-14 || !pivot.is_finite() {
            return Err(PricingError::Numerical(
                "tridiagonal solver hit a singular pivot".to_string(),
            ));
        }
        c_star[i] = if i < n - 1 { upper[i] / pivot } else { 0.0 };
        d_star[i] = (rhs[i] - lower[i] * d_star[i - 1]) / pivot;
    }

    x[n - 1] = d_star[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_star[i] - c_star[i] * x[i + 1];
    }
    Ok(())
}

impl OptionPricer for CrankNicolsonEngine {
    fn price(&self, option: &OptionContract) -> Result<f64, PricingError> {
        option.validate()?;

        let time_steps = self.config.crank_time_steps;
        let spot_steps = self.config.crank_spot_steps;
        if spot_steps < 3 || time_steps < 1 {
            return Err(PricingError::Config(
                "Crank-Nicolson grid needs >= 3 spot steps and >= 1 time step".to_string(),
            ));
        }

        let expiry = self.config.effective_maturity()?;
        let s_max = if self.config.s_max > 0.0 {
            self.config.s_max
        } else {
            (3.0 * option.strike).max(3.0 * option.spot)
        };
        let ds = s_max / spot_steps as f64;
        let dt = expiry / time_steps as f64;
        let sigma = option.volatility;
        let q = option.dividend_yield;
        let is_american = option.style == ExerciseStyle::American;

        // Terminal condition: payoff at maturity.
        let mut values = vec![0.0_f64; spot_steps + 1];
        for (j, value) in values.iter_mut().enumerate() {
            *value = option.intrinsic(j as f64 * ds);
        }

        let interior = spot_steps - 1;
        let mut lower = vec![0.0_f64; interior];
        let mut diag = vec![0.0_f64; interior];
        let mut upper = vec![0.0_f64; interior];
        let mut rhs = vec![0.0_f64; interior];
        let mut c_star = vec![0.0_f64; interior];
        let mut d_star = vec![0.0_f64; interior];
        let mut solution = vec![0.0_f64; interior];

        for n in (0..time_steps).rev() {
            let t = n as f64 * dt;
            let tau = expiry - t;
            let rate = self.config.local_rate(tau / expiry);

            let (lower_bc, upper_bc) = match option.option_type {
                OptionType::Call => (0.0, s_max - option.strike * (-rate * tau).exp()),
                OptionType::Put => (option.strike * (-rate * tau).exp(), 0.0),
            };

            // The bands depend on the local rate, so they are rebuilt per
            // slice into the preallocated buffers.
            for k in 0..interior {
                let s = (k + 1) as f64 * ds;
                let diffusion = 0.5 * sigma * sigma * s * s / (ds * ds);
                let drift = (rate - q) * s / (2.0 * ds);

                let a = 0.5 * dt * (diffusion - drift);
                let c = 0.5 * dt * (diffusion + drift);
                let implicit_diag = 1.0 + 0.5 * dt * (2.0 * diffusion + rate);
                let explicit_diag = 1.0 - 0.5 * dt * (2.0 * diffusion + rate);

                lower[k] = -a;
                diag[k] = implicit_diag;
                upper[k] = -c;
                rhs[k] = a * values[k] + explicit_diag * values[k + 1] + c * values[k + 2];
            }

            rhs[0] -= lower[0] * lower_bc;
            rhs[interior - 1] -= upper[interior - 1] * upper_bc;

            solve_tridiagonal_inplace(
                &lower, &diag, &upper, &rhs, &mut c_star, &mut d_star, &mut solution,
            )?;

            values[0] = lower_bc;
            values[spot_steps] = upper_bc;
            values[1..spot_steps].copy_from_slice(&solution);

            if is_american {
                for (j, value) in values.iter_mut().enumerate() {
                    *value = value.max(option.intrinsic(j as f64 * ds));
                }
            }
        }

        // Linear interpolation of the earliest slice at the contract spot.
        let price = if option.spot <= 0.0 {
            values[0]
        } else if option.spot >= s_max {
            values[spot_steps]
        } else {
            let position = option.spot / ds;
            let j = position.floor() as usize;
            let weight = position - j as f64;
            (1.0 - weight) * values[j] + weight * values[j + 1]
        };

        if !price.is_finite() {
            return Err(PricingError::Numerical(
                "Crank-Nicolson produced a non-finite price".to_string(),
            ));
        }
        Ok(price)
    }

    fn greeks(&self, option: &OptionContract) -> Result<Greeks, PricingError> {
        bump_and_reprice(self, option)
    }
}

impl ConfiguredPricer for CrankNicolsonEngine {
    fn config(&self) -> &PricingConfig {
        &self.config
    }

    fn with_config(&self, config: PricingConfig) -> Self {
        Self::new(config)
    }
}
