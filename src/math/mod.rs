//! Standard-normal distribution helpers shared by the analytic engine.

/// Standard normal density at `x`.
pub fn normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal cumulative distribution at `x`.
pub fn normal_cdf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.231_641_9 * z);
    let poly = t
        * (0.319_381_530
            + t * (-0.356_563_782
                + t * (1.781_477_937 + t * (-1.821_255_978 + t * 1.330_274_429))));
    let approx = 1.0 - normal_pdf(z) * poly;
    if x >= 0.0 { approx } else { 1.0 - approx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cdf_matches_known_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(normal_cdf(1.96), 0.975, epsilon = 1e-4);
        assert_abs_diff_eq!(normal_cdf(-1.96), 0.025, epsilon = 1e-4);
    }

    #[test]
    fn cdf_is_symmetric() {
        for &x in &[0.1, 0.7, 1.3, 2.4] {
            assert_abs_diff_eq!(normal_cdf(x) + normal_cdf(-x), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn pdf_is_maximal_at_zero() {
        assert!(normal_pdf(0.0) > normal_pdf(0.1));
        assert_abs_diff_eq!(normal_pdf(0.0), 0.3989422804014327, epsilon = 1e-15);
    }
}
