//! Power-law background component with the two-area parameter estimation
//! used for tail extrapolation.

use super::Component1D;
use crate::domain::Spectrum1D;

/// `f(x) = A * (x - origin)^-r` for `x > left_cutoff`, zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLaw {
    pub a: f64,
    pub r: f64,
    pub origin: f64,
    pub left_cutoff: f64,
}

impl Default for PowerLaw {
    fn default() -> Self {
        Self {
            a: 1.0e10,
            r: 3.0,
            origin: 0.0,
            left_cutoff: 0.0,
        }
    }
}

impl PowerLaw {
    pub fn function(&self, x: f64) -> f64 {
        if x <= self.left_cutoff {
            return 0.0;
        }
        self.a * (x - self.origin).powf(-self.r)
    }

    /// Two-area estimation of `A` and `r` over the energy window
    /// `[x1, x2]` (Egerton's background-fitting method): the window is
    /// split in half and the ratio of the two integrals fixes the
    /// exponent.
    ///
    /// Returns `None` when the window is degenerate or either half
    /// integrates to a non-positive value.
    pub fn estimate_two_area(spectrum: &Spectrum1D, x1: f64, x2: f64) -> Option<PowerLaw> {
        if !(x1 > 0.0) || x2 <= x1 {
            return None;
        }
        let scale = spectrum.axis().uniform_scale("power-law estimation").ok()?;
        let x3 = (x1 + x2) / 2.0;
        let i1 = spectrum.integrate_window(x1, x3).ok()? * scale;
        let i2 = spectrum.integrate_window(x3, x2).ok()? * scale;
        if i1 <= 0.0 || i2 <= 0.0 {
            return None;
        }
        let r = 2.0 * (i1 / i2).ln() / (x2 / x1).ln();
        let k = 1.0 - r;
        let a = k * i2 / (x2.powf(k) - x3.powf(k));
        if !a.is_finite() || !r.is_finite() {
            return None;
        }
        Some(PowerLaw {
            a,
            r,
            origin: 0.0,
            left_cutoff: 0.0,
        })
    }
}

impl Component1D for PowerLaw {
    fn function(&self, x: f64) -> f64 {
        PowerLaw::function(self, x)
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["A", "r", "origin"]
    }

    fn gradient(&self, parameter: &str, x: f64) -> Option<f64> {
        if x <= self.left_cutoff {
            return match parameter {
                "A" | "r" | "origin" => Some(0.0),
                _ => None,
            };
        }
        let value = self.function(x);
        match parameter {
            "A" => Some(value / self.a),
            "r" => Some(-value * (x - self.origin).ln()),
            "origin" => Some(value * self.r / (x - self.origin)),
            _ => None,
        }
    }
}
