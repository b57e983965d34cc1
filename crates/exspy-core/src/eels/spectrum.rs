//! EELS spectrum wrapper: zero-loss peak helpers, elastic intensity,
//! log-ratio thickness estimation and power-law tail extrapolation.

use crate::components::PowerLaw;
use crate::database::{BindingEnergy, DatabaseError, EdgeId, ElementDatabase};
use crate::domain::{AxisError, EnergyAxis, EnergyUnits, MetadataError, Spectrum1D};
use crate::eels::angles::{imfp_angular_correction, imfp_iakoubovskii};
use crate::numerics::{derivative, moving_average};

use std::collections::BTreeSet;
use tracing::{info, warn};

pub type EelsResult<T> = Result<T, EelsError>;

#[derive(Debug, thiserror::Error)]
pub enum EelsError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Axis(#[from] AxisError),
    #[error("provide either a truncation threshold or a zero-loss spectrum")]
    MissingElasticReference,
    #[error("no inflexion point found in the elastic threshold search window")]
    ThresholdNotFound,
    #[error("the search window must span at least {minimum} channels, got {actual}")]
    WindowTooNarrow { minimum: usize, actual: usize },
    #[error("power-law tail estimation failed over the last {window_size} channels")]
    TailEstimationFailed { window_size: usize },
    #[error("the spectrum has no usable peak maximum")]
    NoPeak,
}

/// Zero-loss reference for the log-ratio thickness estimation.
#[derive(Debug, Clone, Copy)]
pub enum ElasticReference<'a> {
    /// Truncation energy: all intensity below it counts as elastic.
    Threshold(f64),
    /// A separately recorded zero-loss spectrum; its integral is used.
    Zlp(&'a Spectrum1D),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThicknessEstimate {
    /// Thickness relative to the inelastic mean free path.
    Relative { t_over_lambda: f64 },
    Absolute {
        thickness_nm: f64,
        mean_free_path_nm: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EelsSpectrum {
    pub spectrum: Spectrum1D,
    elements: BTreeSet<String>,
}

impl EelsSpectrum {
    pub fn new(spectrum: Spectrum1D) -> Self {
        Self {
            spectrum,
            elements: BTreeSet::new(),
        }
    }

    /// Declare the elements present in the sample; each symbol must exist in
    /// the bundled database.
    pub fn add_elements(&mut self, symbols: &[&str]) -> EelsResult<()> {
        let database = ElementDatabase::bundled();
        for symbol in symbols {
            let record = database.get(symbol)?;
            self.elements.insert(record.symbol.to_string());
        }
        Ok(())
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    fn onset_in_axis_units(&self, onset_ev: f64) -> f64 {
        match self.spectrum.axis().units() {
            EnergyUnits::ElectronVolt => onset_ev,
            EnergyUnits::KiloElectronVolt => onset_ev / 1.0e3,
        }
    }

    /// Ionization edges of the declared elements whose onset falls inside
    /// the signal range.
    pub fn edges_in_signal_range(&self) -> Vec<(EdgeId, BindingEnergy)> {
        let database = ElementDatabase::bundled();
        let low = self.spectrum.axis().low_value();
        let high = self.spectrum.axis().high_value();
        let mut edges = Vec::new();
        for symbol in &self.elements {
            let Ok(record) = database.get(symbol) else {
                continue;
            };
            for edge in &record.binding_energies {
                let onset = self.onset_in_axis_units(edge.onset_energy_ev);
                if onset >= low && onset <= high {
                    edges.push((
                        EdgeId {
                            element: symbol.clone(),
                            subshell: edge.subshell.to_string(),
                        },
                        *edge,
                    ));
                }
            }
        }
        edges
    }

    /// Coarse zero-loss peak position: the calibrated value of the most
    /// intense channel.
    pub fn estimate_zero_loss_peak_centre(&self) -> f64 {
        self.spectrum.axis().value_at(self.spectrum.argmax())
    }

    /// Shift the energy calibration so the zero-loss peak sits at zero.
    /// Returns the applied shift. Uniform axes only.
    pub fn align_zero_loss_peak(&mut self) -> EelsResult<f64> {
        let centre = self.estimate_zero_loss_peak_centre();
        let axis = self.spectrum.axis().clone();
        match axis {
            EnergyAxis::Uniform {
                offset,
                scale,
                size,
                units,
            } => {
                let realigned = EnergyAxis::uniform(offset - centre, scale, size, units)?;
                let intensities = self.spectrum.intensities().to_vec();
                let mut spectrum = Spectrum1D::new(realigned, intensities)?;
                spectrum.metadata = self.spectrum.metadata.clone();
                self.spectrum = spectrum;
                Ok(centre)
            }
            EnergyAxis::NonUniform { .. } => Err(EelsError::Axis(AxisError::NonUniform {
                operation: "zero-loss peak alignment",
            })),
        }
    }

    /// Rough elastic intensity: everything below the truncation threshold.
    pub fn estimate_elastic_scattering_intensity(&self, threshold: f64) -> EelsResult<f64> {
        let axis = self.spectrum.axis();
        Ok(self.spectrum.integrate_window(axis.low_value(), threshold)?)
    }

    /// First inflexion point of the (smoothed) derivative within
    /// `(start, start + window]` above the zero-loss peak; used as the
    /// elastic truncation threshold.
    ///
    /// Without an explicit `tolerance`, the smallest absolute derivative in
    /// the window is used, which always yields an inflexion candidate.
    pub fn estimate_elastic_scattering_threshold(
        &self,
        window: f64,
        tolerance: Option<f64>,
        smoothing_channels: usize,
    ) -> EelsResult<f64> {
        let axis = self.spectrum.axis();
        let scale = axis.uniform_scale("elastic threshold estimation")?;
        let start = 1.0;
        let range = axis.window_indices(start, start + window)?;
        if range.len() < 10 {
            return Err(EelsError::WindowTooNarrow {
                minimum: 10,
                actual: range.len(),
            });
        }
        let data = &self.spectrum.intensities()[range.clone()];
        let smoothed = if smoothing_channels > 1 {
            moving_average(data, smoothing_channels)
        } else {
            data.to_vec()
        };
        let slope = derivative(&smoothed, scale);
        let tolerance = tolerance.unwrap_or_else(|| {
            slope
                .iter()
                .map(|value| value.abs())
                .fold(f64::INFINITY, f64::min)
        });
        let inflexion = slope
            .iter()
            .position(|value| value.abs() <= tolerance)
            .unwrap_or(0);
        if inflexion == 0 {
            return Err(EelsError::ThresholdNotFound);
        }
        Ok(axis.value_at(range.start + inflexion))
    }

    /// FWHM of the dominant peak by linear interpolation of the half-height
    /// crossings, in axis units.
    pub fn estimate_peak_fwhm(&self) -> EelsResult<f64> {
        let data = self.spectrum.intensities();
        let axis = self.spectrum.axis();
        let peak = self.spectrum.argmax();
        let half = data[peak] / 2.0;
        if !(data[peak] > 0.0) {
            return Err(EelsError::NoPeak);
        }

        let crossing = |inner: usize, outer: usize| -> f64 {
            let x0 = axis.value_at(outer);
            let x1 = axis.value_at(inner);
            let y0 = data[outer];
            let y1 = data[inner];
            if y1 == y0 {
                x1
            } else {
                x0 + (half - y0) * (x1 - x0) / (y1 - y0)
            }
        };

        let mut left = None;
        for index in (0..peak).rev() {
            if data[index] < half {
                left = Some(crossing(index + 1, index));
                break;
            }
        }
        let mut right = None;
        for index in (peak + 1)..data.len() {
            if data[index] < half {
                right = Some(crossing(index - 1, index));
                break;
            }
        }
        match (left, right) {
            (Some(left), Some(right)) => Ok(right - left),
            _ => Err(EelsError::NoPeak),
        }
    }

    /// Log-ratio thickness estimation.
    ///
    /// With a density, the angular correction for the limited collection
    /// angle is applied (beam energy and both semi-angles must be in the
    /// metadata) and a missing mean free path is filled in from the
    /// Iakoubovskii parameterization. Without density or mean free path the
    /// result stays relative to the mean free path.
    pub fn estimate_thickness(
        &self,
        elastic: ElasticReference<'_>,
        density_g_cm3: Option<f64>,
        mean_free_path_nm: Option<f64>,
    ) -> EelsResult<ThicknessEstimate> {
        let total = self.spectrum.total_intensity();
        let elastic_intensity = match elastic {
            ElasticReference::Threshold(threshold) => {
                self.estimate_elastic_scattering_intensity(threshold)?
            }
            ElasticReference::Zlp(zlp) => zlp.total_intensity(),
        };
        let mut t_over_lambda = (total / elastic_intensity).ln();

        let mut mean_free_path = mean_free_path_nm;
        if let Some(density) = density_g_cm3 {
            let metadata = &self.spectrum.metadata;
            let beam_energy = metadata.require_beam_energy_kev()?;
            let alpha = metadata.require_convergence_angle_mrad()?;
            let beta = metadata.require_collection_angle_mrad()?;
            t_over_lambda *= imfp_angular_correction(density, beam_energy, alpha, beta);
            if mean_free_path.is_none() {
                let estimated = imfp_iakoubovskii(beam_energy, density);
                info!(mean_free_path_nm = estimated, "estimated inelastic mean free path");
                mean_free_path = Some(estimated);
            }
        } else {
            warn!(
                "computing the thickness without the angular correction for the \
                 limited collection angle; provide the density to enable it"
            );
        }

        match mean_free_path {
            Some(mean_free_path_nm) => Ok(ThicknessEstimate::Absolute {
                thickness_nm: t_over_lambda * mean_free_path_nm,
                mean_free_path_nm,
            }),
            None => {
                warn!(
                    "computing the relative thickness; provide the mean free path \
                     and/or the density for an absolute value"
                );
                Ok(ThicknessEstimate::Relative { t_over_lambda })
            }
        }
    }

    /// Extrapolate the high-energy tail with a power law fitted to the last
    /// `window_size` channels.
    pub fn power_law_extrapolation(
        &self,
        window_size: usize,
        extrapolation_size: usize,
        fix_negative_r: bool,
    ) -> EelsResult<EelsSpectrum> {
        let axis = self.spectrum.axis();
        let scale = axis.uniform_scale("power-law extrapolation")?;
        let size = axis.len();
        let window_size = window_size.max(2).min(size);
        let x1 = axis.value_at(size - window_size);
        let x2 = axis.value_at(size - 1);
        let mut tail = PowerLaw::estimate_two_area(&self.spectrum, x1, x2).ok_or(
            EelsError::TailEstimationFailed { window_size },
        )?;
        if fix_negative_r && tail.r <= 0.0 {
            tail.a = 0.0;
        }

        let extended_axis = EnergyAxis::uniform(
            axis.low_value(),
            scale,
            size + extrapolation_size,
            axis.units(),
        )?;
        let mut intensities = Vec::with_capacity(size + extrapolation_size);
        intensities.extend_from_slice(self.spectrum.intensities());
        for index in size..(size + extrapolation_size) {
            let x = extended_axis.value_at(index);
            // Binned counts: the continuous power law times the channel
            // width.
            intensities.push(scale * tail.function(x));
        }
        let mut spectrum = Spectrum1D::new(extended_axis, intensities)?;
        spectrum.metadata = self.spectrum.metadata.clone();
        Ok(EelsSpectrum {
            spectrum,
            elements: self.elements.clone(),
        })
    }
}
