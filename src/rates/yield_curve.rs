//! Zero-rate term structure keyed by normalized maturity.
//!
//! The curve stores `(maturity, rate)` samples with maturities expressed as
//! fractions of the pricing horizon, typically in `[0, 1]`. Lookups use
//! linear interpolation between enclosing samples and flat extrapolation
//! outside the sampled range.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::PricingError;

/// A single curve sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    /// Normalized maturity fraction, typically in `[0, 1]`.
    pub maturity: f64,
    /// Continuously compounded rate at that maturity.
    pub rate: f64,
}

/// Interest-rate curve over [`RatePoint`] samples.
///
/// Samples must be appended in non-decreasing maturity order; `rate`
/// assumes that ordering and does not re-sort. An empty curve is a valid
/// state meaning "use the configured fallback rate".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YieldCurve {
    points: Vec<RatePoint>,
}

impl YieldCurve {
    /// Creates an empty curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a curve from `(maturity, rate)` pairs.
    ///
    /// Pairs must already be in non-decreasing maturity order.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|&(maturity, rate)| RatePoint { maturity, rate })
                .collect(),
        }
    }

    /// Appends a sample. Maturities must arrive in non-decreasing order.
    pub fn add_point(&mut self, maturity: f64, rate: f64) {
        self.points.push(RatePoint { maturity, rate });
    }

    /// Read-only view of the samples.
    pub fn data(&self) -> &[RatePoint] {
        &self.points
    }

    /// Returns true when the curve holds no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Interpolated rate at normalized time `u`.
    ///
    /// Flat outside `[first.maturity, last.maturity]`, linear in between.
    ///
    /// # Errors
    /// Returns [`PricingError::EmptyCurve`] when no samples exist.
    pub fn rate(&self, u: f64) -> Result<f64, PricingError> {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(PricingError::EmptyCurve),
        };

        if u <= first.maturity {
            return Ok(first.rate);
        }
        if u >= last.maturity {
            return Ok(last.rate);
        }

        for window in self.points.windows(2) {
            let (left, right) = (window[0], window[1]);
            if u < right.maturity {
                let factor = (u - left.maturity) / (right.maturity - left.maturity);
                return Ok(left.rate + factor * (right.rate - left.rate));
            }
        }

        Ok(last.rate)
    }

    /// Returns a copy with every rate moved by `bump`.
    ///
    /// Used for uniform curve shifts when estimating Rho.
    pub fn shifted(&self, bump: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|point| RatePoint {
                    maturity: point.maturity,
                    rate: point.rate + bump,
                })
                .collect(),
        }
    }

    /// Parses a whitespace-delimited two-column text source.
    ///
    /// Each non-empty line must hold exactly two reals, `<maturity> <rate>`;
    /// blank lines are skipped and samples are appended in file order.
    ///
    /// # Errors
    /// Returns [`PricingError::Format`] carrying the offending line when a
    /// line does not hold exactly two parseable reals.
    pub fn parse(source: &str) -> Result<Self, PricingError> {
        let mut curve = Self::new();
        for line in source.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (maturity, rate) = match (fields.next(), fields.next(), fields.next()) {
                (Some(maturity), Some(rate), None) => (maturity, rate),
                _ => return Err(PricingError::Format(line.to_string())),
            };
            let maturity: f64 = maturity
                .parse()
                .map_err(|_| PricingError::Format(line.to_string()))?;
            let rate: f64 = rate
                .parse()
                .map_err(|_| PricingError::Format(line.to_string()))?;
            curve.add_point(maturity, rate);
        }
        Ok(curve)
    }

    /// Loads a curve from a text file in the [`Self::parse`] format.
    ///
    /// # Errors
    /// Returns [`PricingError::Io`] when the file cannot be read and
    /// [`PricingError::Format`] on a malformed line.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PricingError> {
        let source = fs::read_to_string(path.as_ref()).map_err(|err| {
            PricingError::Io(format!("{}: {err}", path.as_ref().display()))
        })?;
        Self::parse(&source)
    }

    /// Serializes the samples back to the two-column text format.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for point in &self.points {
            out.push_str(&format!("{} {}\n", point.maturity, point.rate));
        }
        out
    }
}
