//! Normalized Gaussian peak component.

use super::Component1D;
use crate::common::constants::SIGMA_TO_FWHM;

/// `f(x) = A / (sigma sqrt(2 pi)) * exp(-(x - centre)^2 / (2 sigma^2))`
///
/// `area` is the integral under the peak, so a unit-area Gaussian keeps the
/// total intensity of a spectrum it is convolved with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    pub area: f64,
    pub centre: f64,
    pub sigma: f64,
}

impl Default for Gaussian {
    fn default() -> Self {
        Self {
            area: 1.0,
            centre: 0.0,
            sigma: 1.0,
        }
    }
}

impl Gaussian {
    pub fn function(&self, x: f64) -> f64 {
        let normalization = self.sigma * (2.0 * std::f64::consts::PI).sqrt();
        let argument = (x - self.centre) / self.sigma;
        self.area / normalization * (-0.5 * argument * argument).exp()
    }

    pub fn height(&self) -> f64 {
        self.function(self.centre)
    }

    pub fn fwhm(&self) -> f64 {
        self.sigma * SIGMA_TO_FWHM
    }

    pub fn set_fwhm(&mut self, fwhm: f64) {
        self.sigma = fwhm / SIGMA_TO_FWHM;
    }

    /// Sample the peak on `count` uniform channels starting at `offset`.
    pub fn sample(&self, offset: f64, scale: f64, count: usize) -> Vec<f64> {
        (0..count)
            .map(|index| self.function(offset + scale * index as f64))
            .collect()
    }
}

impl Component1D for Gaussian {
    fn function(&self, x: f64) -> f64 {
        Gaussian::function(self, x)
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["A", "centre", "sigma"]
    }

    fn gradient(&self, parameter: &str, x: f64) -> Option<f64> {
        let value = self.function(x);
        match parameter {
            "A" => Some(value / self.area),
            "centre" => Some(value * (x - self.centre) / (self.sigma * self.sigma)),
            "sigma" => {
                let argument = (x - self.centre) / self.sigma;
                Some(value * (argument * argument - 1.0) / self.sigma)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Component1D;
    use super::Gaussian;

    #[test]
    fn unit_area_integrates_to_one() {
        let gaussian = Gaussian {
            area: 1.0,
            centre: 0.0,
            sigma: 0.5,
        };
        let step = 0.001;
        let total: f64 = gaussian
            .sample(-5.0, step, 10_000)
            .iter()
            .map(|value| value * step)
            .sum();
        assert!((total - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn fwhm_round_trips_through_sigma() {
        let mut gaussian = Gaussian::default();
        gaussian.set_fwhm(2.3548);
        assert!((gaussian.sigma - 1.0).abs() < 1.0e-4);
        assert!((gaussian.fwhm() - 2.3548).abs() < 1.0e-4);
        // The function drops to half height one half-FWHM from the centre.
        let half = gaussian.function(gaussian.centre + gaussian.fwhm() / 2.0);
        assert!((half / gaussian.height() - 0.5).abs() < 1.0e-9);
    }

    #[test]
    fn gradients_match_finite_differences() {
        let gaussian = Gaussian {
            area: 2.0,
            centre: 1.0,
            sigma: 0.7,
        };
        let x = 1.5;
        let step = 1.0e-6;

        let d_area = (Gaussian { area: gaussian.area + step, ..gaussian }.function(x)
            - gaussian.function(x))
            / step;
        assert!((gaussian.gradient("A", x).expect("A") - d_area).abs() < 1.0e-6);

        let d_centre = (Gaussian { centre: gaussian.centre + step, ..gaussian }.function(x)
            - gaussian.function(x))
            / step;
        assert!((gaussian.gradient("centre", x).expect("centre") - d_centre).abs() < 1.0e-5);

        let d_sigma = (Gaussian { sigma: gaussian.sigma + step, ..gaussian }.function(x)
            - gaussian.function(x))
            / step;
        assert!((gaussian.gradient("sigma", x).expect("sigma") - d_sigma).abs() < 1.0e-5);

        assert_eq!(gaussian.gradient("shift", x), None);
    }
}
