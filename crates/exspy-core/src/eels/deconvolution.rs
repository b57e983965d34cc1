//! Fourier-log, Fourier-ratio and Richardson-Lucy deconvolution.
//!
//! The Fourier methods pad both signals to a common 5-smooth FFT size to
//! avoid the circular wrap-around, Hann-taper the inputs and apply a fixed
//! non-iterative formula. Richardson-Lucy runs a caller-specified number of
//! multiplicative updates and stops strictly by iteration count.

use crate::common::constants::SIGMA_TO_FWHM;
use crate::components::Gaussian;
use crate::domain::AxisError;
use crate::eels::spectrum::{EelsError, EelsSpectrum};
use crate::numerics::{convolve_full, fft::FftComputeError, irfft, next_fast_len, rfft};

use num_complex::Complex64;

pub type DeconvolutionResult<T> = Result<T, DeconvolutionError>;

#[derive(Debug, thiserror::Error)]
pub enum DeconvolutionError {
    #[error(transparent)]
    Axis(#[from] AxisError),
    #[error(transparent)]
    Fft(#[from] FftComputeError),
    #[error(transparent)]
    Preprocessing(#[from] EelsError),
    #[error("the point-spread function has {actual} channels, expected {expected}")]
    PsfSizeMismatch { expected: usize, actual: usize },
}

fn zero_non_finite(value: Complex64) -> Complex64 {
    Complex64::new(
        if value.re.is_finite() { value.re } else { 0.0 },
        if value.im.is_finite() { value.im } else { 0.0 },
    )
}

impl EelsSpectrum {
    /// Fourier-log deconvolution of the complete (low-loss) spectrum by its
    /// zero-loss peak: `J1 = Z ln(J/Z)` in the frequency domain.
    ///
    /// `add_zlp` adds the zero-loss peak back onto the single-scattering
    /// distribution; `crop` drops the channels modified by the taper at the
    /// high-energy side.
    pub fn fourier_log_deconvolution(
        &self,
        zlp: &EelsSpectrum,
        add_zlp: bool,
        crop: bool,
    ) -> DeconvolutionResult<EelsSpectrum> {
        self.spectrum
            .axis()
            .uniform_scale("Fourier-log deconvolution")?;
        zlp.spectrum
            .axis()
            .uniform_scale("Fourier-log deconvolution")?;

        let mut tapered = self.clone();
        let tapered_channels = tapered.spectrum.hanning_taper(None);
        let self_size = self.spectrum.len();
        let zlp_size = zlp.spectrum.len();
        let size = next_fast_len(zlp_size + self_size - 1);

        let z = rfft(zlp.spectrum.intensities(), size)?;
        let j = rfft(tapered.spectrum.intensities(), size)?;
        let j1: Vec<Complex64> = z
            .iter()
            .zip(&j)
            .map(|(z, j)| z * zero_non_finite((j / z).ln()))
            .collect();
        let mut data = irfft(j1, size)?;
        data.truncate(self_size);

        if add_zlp {
            let shared = zlp_size.min(self_size);
            for (channel, value) in zlp.spectrum.intensities()[..shared].iter().enumerate() {
                data[channel] += value;
            }
        }

        let mut result = self.clone();
        result.spectrum.set_intensities(data)?;
        if crop {
            let kept = self_size - tapered_channels.min(self_size - 1);
            result = EelsSpectrum::from_parts(result, 0..kept)?;
        }
        Ok(result)
    }

    /// Fourier-ratio deconvolution of a background-removed core-loss
    /// spectrum by the corresponding low-loss spectrum.
    ///
    /// The result is reconvolved with a unit-area Gaussian of width `fwhm`
    /// (the zero-loss FWHM when `None`) to limit noise amplification, and
    /// scaled by the elastic intensity below `threshold` (estimated from
    /// the low-loss derivative when `None`).
    pub fn fourier_ratio_deconvolution(
        &self,
        low_loss: &EelsSpectrum,
        fwhm: Option<f64>,
        threshold: Option<f64>,
        extrapolate_lowloss: bool,
        extrapolate_coreloss: bool,
    ) -> DeconvolutionResult<EelsSpectrum> {
        self.spectrum
            .axis()
            .uniform_scale("Fourier-ratio deconvolution")?;
        let ll_scale = low_loss
            .spectrum
            .axis()
            .uniform_scale("Fourier-ratio deconvolution")?;
        let original_size = self.spectrum.len();

        let threshold = match threshold {
            Some(threshold) => threshold,
            None => low_loss.estimate_elastic_scattering_threshold(10.0, None, 5)?,
        };
        let mut core_loss = if extrapolate_coreloss {
            self.power_law_extrapolation(20, 100, false)?
        } else {
            self.clone()
        };
        let mut low_loss = if extrapolate_lowloss {
            low_loss.power_law_extrapolation(100, 100, false)?
        } else {
            low_loss.clone()
        };
        low_loss.spectrum.hanning_taper(None);
        core_loss.spectrum.hanning_taper(None);

        let size = next_fast_len(low_loss.spectrum.len() + core_loss.spectrum.len() - 1);

        let fwhm = match fwhm {
            Some(fwhm) => fwhm,
            None => low_loss.estimate_peak_fwhm()?,
        };
        let elastic_intensity = low_loss.estimate_elastic_scattering_intensity(threshold)?;

        let kernel = Gaussian {
            area: 1.0,
            centre: 0.0,
            sigma: fwhm / SIGMA_TO_FWHM,
        };
        let ll_offset = low_loss.spectrum.axis().low_value();
        let sampled_kernel = kernel.sample(ll_offset, ll_scale, size);

        let z = rfft(&sampled_kernel, size)?;
        let jk = rfft(core_loss.spectrum.intensities(), size)?;
        let jl = rfft(low_loss.spectrum.intensities(), size)?;
        let restored: Vec<Complex64> = z
            .iter()
            .zip(jk.iter().zip(&jl))
            .map(|(z, (jk, jl))| z * jk / jl)
            .collect();
        let mut data = irfft(restored, size)?;
        data.truncate(original_size);
        for value in &mut data {
            *value *= elastic_intensity;
        }

        let mut result = self.clone();
        result.spectrum.set_intensities(data)?;
        Ok(result)
    }

    /// Richardson-Lucy deconvolution by the given point-spread function.
    ///
    /// Runs exactly `iterations` multiplicative updates with no convergence
    /// check; more iterations sharpen further but amplify noise.
    pub fn richardson_lucy_deconvolution(
        &self,
        psf: &EelsSpectrum,
        iterations: usize,
    ) -> DeconvolutionResult<EelsSpectrum> {
        self.spectrum
            .axis()
            .uniform_scale("Richardson-Lucy deconvolution")?;
        let size = self.spectrum.len();
        if psf.spectrum.len() != size {
            return Err(DeconvolutionError::PsfSizeMismatch {
                expected: size,
                actual: psf.spectrum.len(),
            });
        }

        let signal = self.spectrum.intensities();
        let kernel = psf.spectrum.intensities();
        let kernel_reversed: Vec<f64> = kernel.iter().rev().copied().collect();
        let peak = psf.spectrum.argmax();
        let mirrored_peak = size - 1 - peak;

        let mut estimate = signal.to_vec();
        for _ in 0..iterations {
            let reblurred = convolve_full(kernel, &estimate);
            let ratio: Vec<f64> = signal
                .iter()
                .zip(&reblurred[peak..peak + size])
                .map(|(observed, blurred)| observed / blurred)
                .collect();
            let correction = convolve_full(&kernel_reversed, &ratio);
            for (value, factor) in estimate
                .iter_mut()
                .zip(&correction[mirrored_peak..mirrored_peak + size])
            {
                *value *= factor;
            }
        }

        let mut result = self.clone();
        result.spectrum.set_intensities(estimate)?;
        Ok(result)
    }

    fn from_parts(
        source: EelsSpectrum,
        range: std::ops::Range<usize>,
    ) -> DeconvolutionResult<EelsSpectrum> {
        let elements: Vec<String> = source.elements().map(str::to_string).collect();
        let mut cropped = EelsSpectrum::new(source.spectrum.cropped(range)?);
        let element_refs: Vec<&str> = elements.iter().map(String::as_str).collect();
        cropped.add_elements(&element_refs)?;
        Ok(cropped)
    }
}

#[cfg(test)]
mod tests {
    use crate::components::Gaussian;
    use crate::domain::{EnergyAxis, EnergyUnits, Spectrum1D};
    use crate::eels::spectrum::EelsSpectrum;
    use crate::numerics::{irfft, next_fast_len, rfft};

    const CHANNELS: usize = 200;

    fn counts(axis: &EnergyAxis, peak: &Gaussian) -> Vec<f64> {
        let scale = axis.uniform_scale("test").expect("uniform");
        axis.values()
            .iter()
            .map(|energy| scale * peak.function(*energy))
            .collect()
    }

    fn spectrum(axis: &EnergyAxis, data: Vec<f64>) -> EelsSpectrum {
        EelsSpectrum::new(Spectrum1D::new(axis.clone(), data).expect("spectrum"))
    }

    /// Build a measured low-loss spectrum `J` with `fft(J) = fft(Z) *
    /// exp(fft(S) / I0)`, the model the Fourier-log method inverts.
    fn plural_scattering(zlp: &[f64], single: &[f64], zlp_total: f64) -> Vec<f64> {
        let size = next_fast_len(2 * CHANNELS - 1);
        let z = rfft(zlp, size).expect("zlp fft");
        let s = rfft(single, size).expect("ssd fft");
        let measured: Vec<_> = z
            .iter()
            .zip(&s)
            .map(|(z, s)| z * (s / zlp_total).exp())
            .collect();
        let mut data = irfft(measured, size).expect("inverse");
        data.truncate(CHANNELS);
        data
    }

    #[test]
    fn fourier_log_recovers_the_single_scattering_distribution() {
        let axis =
            EnergyAxis::uniform(-20.0, 0.5, CHANNELS, EnergyUnits::ElectronVolt).expect("axis");
        let zlp_counts = counts(
            &axis,
            &Gaussian {
                area: 10_000.0,
                centre: 0.0,
                sigma: 1.0,
            },
        );
        // The loss distribution is expressed relative to the zero-loss
        // position: a 20 eV plasmon.
        let single_counts = counts(
            &axis,
            &Gaussian {
                area: 1_000.0,
                centre: 0.0,
                sigma: 3.0,
            },
        );
        let measured = spectrum(
            &axis,
            plural_scattering(&zlp_counts, &single_counts, 10_000.0),
        );
        let zlp = spectrum(&axis, zlp_counts.clone());

        let deconvolved = measured
            .fourier_log_deconvolution(&zlp, false, false)
            .expect("deconvolution");
        assert_eq!(deconvolved.spectrum.len(), CHANNELS);

        // Total single-scattering intensity and plasmon position survive.
        let total = deconvolved.spectrum.total_intensity();
        assert!((total - 1_000.0).abs() < 30.0, "total={total}");
        let peak_energy = deconvolved
            .spectrum
            .axis()
            .value_at(deconvolved.spectrum.argmax());
        assert!((peak_energy - 20.0).abs() <= 1.0, "peak={peak_energy}");

        let with_zlp = measured
            .fourier_log_deconvolution(&zlp, true, false)
            .expect("deconvolution");
        let with_zlp_total = with_zlp.spectrum.total_intensity();
        assert!(
            (with_zlp_total - 11_000.0).abs() < 40.0,
            "total={with_zlp_total}"
        );

        let cropped = measured
            .fourier_log_deconvolution(&zlp, false, true)
            .expect("deconvolution");
        assert!(cropped.spectrum.len() < CHANNELS);
    }

    #[test]
    fn fourier_log_requires_uniform_axes() {
        let values: Vec<f64> = (0..CHANNELS).map(|i| (i as f64).powf(1.01)).collect();
        let axis = EnergyAxis::non_uniform(values, EnergyUnits::ElectronVolt).expect("axis");
        let bumpy = spectrum(&axis, vec![1.0; CHANNELS]);
        let uniform_axis =
            EnergyAxis::uniform(0.0, 0.5, CHANNELS, EnergyUnits::ElectronVolt).expect("axis");
        let zlp = spectrum(&uniform_axis, vec![1.0; CHANNELS]);
        assert!(bumpy.fourier_log_deconvolution(&zlp, false, false).is_err());
    }

    #[test]
    fn fourier_ratio_sharpens_a_convolved_core_loss_edge() {
        // Low-loss: a bare zero-loss peak on a 1 eV axis.
        let ll_axis =
            EnergyAxis::uniform(-50.0, 1.0, CHANNELS, EnergyUnits::ElectronVolt).expect("axis");
        let zlp_counts = counts(
            &ll_axis,
            &Gaussian {
                area: 10_000.0,
                centre: 0.0,
                sigma: 3.0,
            },
        );
        let low_loss = spectrum(&ll_axis, zlp_counts.clone());

        // Core loss: a Gaussian "edge" blurred by the low loss, built in
        // the frequency domain the same way the ratio method inverts.
        let cl_axis =
            EnergyAxis::uniform(400.0, 1.0, CHANNELS, EnergyUnits::ElectronVolt).expect("axis");
        let edge_counts = counts(
            &cl_axis,
            &Gaussian {
                area: 2_000.0,
                centre: 500.0,
                sigma: 4.0,
            },
        );
        let size = next_fast_len(2 * CHANNELS - 1);
        let s = rfft(&edge_counts, size).expect("edge fft");
        let z = rfft(&zlp_counts, size).expect("zlp fft");
        let blurred_fft: Vec<_> = s
            .iter()
            .zip(&z)
            .map(|(s, z)| s * z / 10_000.0)
            .collect();
        let mut blurred = irfft(blurred_fft, size).expect("inverse");
        blurred.truncate(CHANNELS);
        let core_loss = spectrum(&cl_axis, blurred);

        let restored = core_loss
            .fourier_ratio_deconvolution(&low_loss, Some(4.0), Some(20.0), false, false)
            .expect("deconvolution");

        assert_eq!(restored.spectrum.len(), CHANNELS);
        // The restored edge is narrower than the blurred one but keeps its
        // integrated intensity and position.
        let restored_total = restored.spectrum.total_intensity();
        assert!(
            (restored_total - 2_000.0).abs() < 100.0,
            "total={restored_total}"
        );
        let blurred_peak = core_loss.spectrum.argmax();
        let restored_peak = restored.spectrum.argmax();
        assert!(
            (restored.spectrum.axis().value_at(restored_peak)
                - core_loss.spectrum.axis().value_at(blurred_peak))
            .abs()
                <= 2.0
        );
        let blurred_height = core_loss.spectrum.intensities()[blurred_peak];
        let restored_height = restored.spectrum.intensities()[restored_peak];
        assert!(restored_height > blurred_height * 1.1);
    }

    #[test]
    fn richardson_lucy_sharpens_without_losing_intensity() {
        let axis =
            EnergyAxis::uniform(0.0, 1.0, CHANNELS, EnergyUnits::ElectronVolt).expect("axis");
        // A small flat background keeps every channel strictly positive so
        // the multiplicative updates never divide by zero.
        let sharp: Vec<f64> = counts(
            &axis,
            &Gaussian {
                area: 5_000.0,
                centre: 100.0,
                sigma: 2.0,
            },
        )
        .iter()
        .map(|value| value + 0.01)
        .collect();
        let psf_counts = counts(
            &axis,
            &Gaussian {
                area: 1.0,
                centre: 100.0,
                sigma: 4.0,
            },
        );
        // Blur the sharp peak with the centred psf; `convolve_full` of the
        // two centred arrays re-centres at twice the offset, so slice back.
        let full = crate::numerics::convolve_full(&sharp, &psf_counts);
        let blurred: Vec<f64> = full[100..100 + CHANNELS].to_vec();

        let observed = spectrum(&axis, blurred);
        let psf = spectrum(&axis, psf_counts);
        let restored = observed
            .richardson_lucy_deconvolution(&psf, 40)
            .expect("deconvolution");

        let observed_peak = observed.spectrum.argmax();
        let restored_peak = restored.spectrum.argmax();
        assert_eq!(restored_peak, observed_peak);
        let total_before = observed.spectrum.total_intensity();
        let total_after = restored.spectrum.total_intensity();
        assert!((total_after - total_before).abs() / total_before < 0.02);
        assert!(
            restored.spectrum.intensities()[restored_peak]
                > observed.spectrum.intensities()[observed_peak] * 1.2
        );

        let short_axis =
            EnergyAxis::uniform(0.0, 1.0, 50, EnergyUnits::ElectronVolt).expect("axis");
        let short_psf = spectrum(&short_axis, vec![1.0; 50]);
        assert!(observed.richardson_lucy_deconvolution(&short_psf, 5).is_err());
    }
}
