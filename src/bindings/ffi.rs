//! C ABI surface for spreadsheet and other foreign hosts.
//!
//! One price and one Greeks entry point per engine, each taking the flat
//! scalar contract/market list plus engine-specific discretization
//! parameters. Errors never cross the boundary as Rust types: price entry
//! points return `-1.0` on any failure and Greeks entry points write NaN
//! through every out-pointer. The term-structure curve is not transported
//! over this surface; C callers price off the constant rate argument.

use std::ffi::{c_char, c_int, CStr};

use crate::core::{ExerciseStyle, Greeks, OptionPricer, OptionType, PricingError};
use crate::engines::{
    BinomialTreeEngine, BlackScholesEngine, CrankNicolsonEngine, MonteCarloEngine,
};
use crate::instruments::OptionContract;
use crate::market::{PricingConfig, PricingConfigBuilder};

/// Sentinel returned by price entry points on any error.
pub const PRICE_ERROR_SENTINEL: f64 = -1.0;

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn calculation_date_arg(ptr: *const c_char) -> Result<Option<String>, PricingError> {
    if ptr.is_null() {
        return Ok(None);
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    let date = raw
        .to_str()
        .map_err(|_| PricingError::Config("calculation date is not valid UTF-8".to_string()))?;
    if date.is_empty() {
        Ok(None)
    } else {
        Ok(Some(date.to_string()))
    }
}

fn contract(
    spot: f64,
    strike: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
) -> Result<OptionContract, PricingError> {
    let option_type = match option_type {
        0 => OptionType::Call,
        1 => OptionType::Put,
        other => {
            return Err(PricingError::Config(format!(
                "option type must be 0 (call) or 1 (put), got {other}"
            )))
        }
    };
    let style = match option_style {
        0 => ExerciseStyle::European,
        1 => ExerciseStyle::American,
        other => {
            return Err(PricingError::Config(format!(
                "option style must be 0 (European) or 1 (American), got {other}"
            )))
        }
    };
    Ok(OptionContract::new(
        spot,
        strike,
        volatility,
        dividend_yield,
        option_type,
        style,
    ))
}

fn config_builder(maturity: f64, rate: f64, date: Option<String>) -> PricingConfigBuilder {
    let mut builder = PricingConfig::builder().maturity(maturity).fallback_rate(rate);
    if let Some(date) = date {
        builder = builder.valuation_date(date);
    }
    builder
}

fn positive_count(value: c_int, name: &str) -> Result<usize, PricingError> {
    usize::try_from(value)
        .ok()
        .filter(|&count| count > 0)
        .ok_or_else(|| PricingError::Config(format!("{name} must be > 0, got {value}")))
}

/// # Safety
/// Each pointer must be null or valid for a single `f64` write.
unsafe fn write_greeks(
    result: Result<Greeks, PricingError>,
    delta: *mut f64,
    gamma: *mut f64,
    vega: *mut f64,
    theta: *mut f64,
    rho: *mut f64,
) {
    let greeks = result.unwrap_or(Greeks {
        delta: f64::NAN,
        gamma: f64::NAN,
        vega: f64::NAN,
        theta: f64::NAN,
        rho: f64::NAN,
    });
    for (ptr, value) in [
        (delta, greeks.delta),
        (gamma, greeks.gamma),
        (vega, greeks.vega),
        (theta, greeks.theta),
        (rho, greeks.rho),
    ] {
        if !ptr.is_null() {
            unsafe { *ptr = value };
        }
    }
}

unsafe fn black_scholes_engine(
    maturity: f64,
    rate: f64,
    date: *const c_char,
) -> Result<BlackScholesEngine, PricingError> {
    let date = unsafe { calculation_date_arg(date)? };
    Ok(BlackScholesEngine::new(
        config_builder(maturity, rate, date).build()?,
    ))
}

/// Black-Scholes price; `-1.0` on error.
///
/// # Safety
/// `calculation_date` must be null or a NUL-terminated string.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_black_scholes_price(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
) -> f64 {
    let price = || -> Result<f64, PricingError> {
        let engine = unsafe { black_scholes_engine(maturity, rate, calculation_date)? };
        engine.price(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    price().unwrap_or(PRICE_ERROR_SENTINEL)
}

/// Black-Scholes Greeks; writes NaN through every out-pointer on error.
///
/// # Safety
/// `calculation_date` must be null or a NUL-terminated string; out-pointers
/// must each be null or valid for a single `f64` write.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_black_scholes_greeks(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
    delta: *mut f64,
    gamma: *mut f64,
    vega: *mut f64,
    theta: *mut f64,
    rho: *mut f64,
) {
    let greeks = || -> Result<Greeks, PricingError> {
        let engine = unsafe { black_scholes_engine(maturity, rate, calculation_date)? };
        engine.greeks(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    unsafe { write_greeks(greeks(), delta, gamma, vega, theta, rho) };
}

/// Binomial-tree price; `-1.0` on error.
///
/// # Safety
/// `calculation_date` must be null or a NUL-terminated string.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_binomial_price(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
    steps: c_int,
) -> f64 {
    let price = || -> Result<f64, PricingError> {
        let date = unsafe { calculation_date_arg(calculation_date)? };
        let config = config_builder(maturity, rate, date)
            .binomial_steps(positive_count(steps, "binomial steps")?)
            .build()?;
        BinomialTreeEngine::new(config).price(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    price().unwrap_or(PRICE_ERROR_SENTINEL)
}

/// Binomial-tree Greeks; writes NaN through every out-pointer on error.
///
/// # Safety
/// As [`openvanna_black_scholes_greeks`].
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_binomial_greeks(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
    steps: c_int,
    delta: *mut f64,
    gamma: *mut f64,
    vega: *mut f64,
    theta: *mut f64,
    rho: *mut f64,
) {
    let greeks = || -> Result<Greeks, PricingError> {
        let date = unsafe { calculation_date_arg(calculation_date)? };
        let config = config_builder(maturity, rate, date)
            .binomial_steps(positive_count(steps, "binomial steps")?)
            .build()?;
        BinomialTreeEngine::new(config).greeks(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    unsafe { write_greeks(greeks(), delta, gamma, vega, theta, rho) };
}

/// Crank-Nicolson price; `-1.0` on error.
///
/// # Safety
/// `calculation_date` must be null or a NUL-terminated string.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_crank_nicolson_price(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
    time_steps: c_int,
    spot_steps: c_int,
    s_max: f64,
) -> f64 {
    let price = || -> Result<f64, PricingError> {
        let date = unsafe { calculation_date_arg(calculation_date)? };
        let config = config_builder(maturity, rate, date)
            .crank_grid(
                positive_count(time_steps, "time steps")?,
                positive_count(spot_steps, "spot steps")?,
            )
            .s_max(s_max)
            .build()?;
        CrankNicolsonEngine::new(config).price(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    price().unwrap_or(PRICE_ERROR_SENTINEL)
}

/// Crank-Nicolson Greeks; writes NaN through every out-pointer on error.
///
/// # Safety
/// As [`openvanna_black_scholes_greeks`].
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_crank_nicolson_greeks(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
    time_steps: c_int,
    spot_steps: c_int,
    s_max: f64,
    delta: *mut f64,
    gamma: *mut f64,
    vega: *mut f64,
    theta: *mut f64,
    rho: *mut f64,
) {
    let greeks = || -> Result<Greeks, PricingError> {
        let date = unsafe { calculation_date_arg(calculation_date)? };
        let config = config_builder(maturity, rate, date)
            .crank_grid(
                positive_count(time_steps, "time steps")?,
                positive_count(spot_steps, "spot steps")?,
            )
            .s_max(s_max)
            .build()?;
        CrankNicolsonEngine::new(config).greeks(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    unsafe { write_greeks(greeks(), delta, gamma, vega, theta, rho) };
}

/// Monte Carlo price; `-1.0` on error.
///
/// # Safety
/// `calculation_date` must be null or a NUL-terminated string.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_monte_carlo_price(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
    num_paths: c_int,
    steps_per_path: c_int,
) -> f64 {
    let price = || -> Result<f64, PricingError> {
        let date = unsafe { calculation_date_arg(calculation_date)? };
        let config = config_builder(maturity, rate, date)
            .mc_sampling(
                positive_count(num_paths, "path count")?,
                positive_count(steps_per_path, "steps per path")?,
            )
            .build()?;
        MonteCarloEngine::new(config).price(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    price().unwrap_or(PRICE_ERROR_SENTINEL)
}

/// Monte Carlo Greeks; writes NaN through every out-pointer on error.
///
/// # Safety
/// As [`openvanna_black_scholes_greeks`].
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn openvanna_monte_carlo_greeks(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    volatility: f64,
    dividend_yield: f64,
    option_type: c_int,
    option_style: c_int,
    calculation_date: *const c_char,
    num_paths: c_int,
    steps_per_path: c_int,
    delta: *mut f64,
    gamma: *mut f64,
    vega: *mut f64,
    theta: *mut f64,
    rho: *mut f64,
) {
    let greeks = || -> Result<Greeks, PricingError> {
        let date = unsafe { calculation_date_arg(calculation_date)? };
        let config = config_builder(maturity, rate, date)
            .mc_sampling(
                positive_count(num_paths, "path count")?,
                positive_count(steps_per_path, "steps per path")?,
            )
            .build()?;
        MonteCarloEngine::new(config).greeks(&contract(
            spot,
            strike,
            volatility,
            dividend_yield,
            option_type,
            option_style,
        )?)
    };
    unsafe { write_greeks(greeks(), delta, gamma, vega, theta, rho) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_entry_points_return_the_sentinel_on_bad_input() {
        // Negative volatility fails contract validation.
        let price = unsafe {
            openvanna_black_scholes_price(
                100.0,
                100.0,
                1.0,
                0.05,
                -0.20,
                0.0,
                0,
                0,
                std::ptr::null(),
            )
        };
        assert_eq!(price, PRICE_ERROR_SENTINEL);

        // Unknown option type code.
        let price = unsafe {
            openvanna_binomial_price(
                100.0,
                100.0,
                1.0,
                0.05,
                0.20,
                0.0,
                7,
                0,
                std::ptr::null(),
                100,
            )
        };
        assert_eq!(price, PRICE_ERROR_SENTINEL);
    }

    #[test]
    fn price_entry_points_agree_with_the_engines() {
        use crate::market::PricingConfig;

        let from_ffi = unsafe {
            openvanna_black_scholes_price(
                100.0,
                100.0,
                1.0,
                0.05,
                0.20,
                0.0,
                0,
                0,
                std::ptr::null(),
            )
        };
        let config = PricingConfig::builder()
            .maturity(1.0)
            .fallback_rate(0.05)
            .build()
            .unwrap();
        let direct = BlackScholesEngine::new(config)
            .price(&OptionContract::european_call(100.0, 100.0, 0.20, 0.0))
            .unwrap();
        assert_eq!(from_ffi, direct);
    }

    #[test]
    fn greeks_entry_points_write_nan_on_error() {
        let (mut delta, mut gamma, mut vega, mut theta, mut rho) = (0.0, 0.0, 0.0, 0.0, 0.0);
        unsafe {
            // American style is unsupported by the closed form.
            openvanna_black_scholes_greeks(
                100.0,
                100.0,
                1.0,
                0.05,
                0.20,
                0.0,
                0,
                1,
                std::ptr::null(),
                &mut delta,
                &mut gamma,
                &mut vega,
                &mut theta,
                &mut rho,
            );
        }
        for value in [delta, gamma, vega, theta, rho] {
            assert!(value.is_nan(), "expected NaN, got {value}");
        }
    }

    #[test]
    fn greeks_entry_points_fill_all_five_outputs() {
        let (mut delta, mut gamma, mut vega, mut theta, mut rho) =
            (f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        unsafe {
            openvanna_black_scholes_greeks(
                100.0,
                100.0,
                1.0,
                0.05,
                0.20,
                0.0,
                0,
                0,
                std::ptr::null(),
                &mut delta,
                &mut gamma,
                &mut vega,
                &mut theta,
                &mut rho,
            );
        }
        for value in [delta, gamma, vega, theta, rho] {
            assert!(value.is_finite(), "expected finite Greek, got {value}");
        }
        assert!(delta > 0.0 && delta < 1.0, "delta out of range: {delta}");
    }
}
