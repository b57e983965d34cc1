//! Core data model: calibrated energy axes, spectra and acquisition
//! metadata.
//!
//! A spectrum is an ordered array of channel intensities over a
//! monotonically increasing energy axis, plus the acquisition parameters
//! several formulas read as required inputs. Spectra are treated as binned
//! count data: integrating over an energy window sums the channels inside
//! it.

pub mod errors;

pub use errors::{AxisError, AxisResult, MetadataError, MetadataResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyUnits {
    #[serde(rename = "eV")]
    ElectronVolt,
    #[serde(rename = "keV")]
    KiloElectronVolt,
}

impl Display for EnergyUnits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ElectronVolt => "eV",
            Self::KiloElectronVolt => "keV",
        })
    }
}

/// Calibrated signal axis: uniform (offset + scale) or explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnergyAxis {
    Uniform {
        offset: f64,
        scale: f64,
        size: usize,
        units: EnergyUnits,
    },
    NonUniform {
        values: Vec<f64>,
        units: EnergyUnits,
    },
}

impl EnergyAxis {
    pub fn uniform(offset: f64, scale: f64, size: usize, units: EnergyUnits) -> AxisResult<Self> {
        if size == 0 {
            return Err(AxisError::Empty);
        }
        if !offset.is_finite() {
            return Err(AxisError::InvalidOffset { offset });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AxisError::InvalidScale { scale });
        }
        Ok(Self::Uniform {
            offset,
            scale,
            size,
            units,
        })
    }

    pub fn non_uniform(values: Vec<f64>, units: EnergyUnits) -> AxisResult<Self> {
        if values.is_empty() {
            return Err(AxisError::Empty);
        }
        for (index, value) in values.iter().copied().enumerate() {
            if !value.is_finite() {
                return Err(AxisError::NonFiniteValue { index, value });
            }
            if index > 0 {
                let previous = values[index - 1];
                if value <= previous {
                    return Err(AxisError::NonMonotonic {
                        index,
                        previous,
                        current: value,
                    });
                }
            }
        }
        Ok(Self::NonUniform { values, units })
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Uniform { size, .. } => *size,
            Self::NonUniform { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn units(&self) -> EnergyUnits {
        match self {
            Self::Uniform { units, .. } | Self::NonUniform { units, .. } => *units,
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform { .. })
    }

    /// Channel width of a uniform axis; an error naming `operation`
    /// otherwise.
    pub fn uniform_scale(&self, operation: &'static str) -> AxisResult<f64> {
        match self {
            Self::Uniform { scale, .. } => Ok(*scale),
            Self::NonUniform { .. } => Err(AxisError::NonUniform { operation }),
        }
    }

    pub fn value_at(&self, index: usize) -> f64 {
        match self {
            Self::Uniform { offset, scale, .. } => offset + scale * index as f64,
            Self::NonUniform { values, .. } => values[index],
        }
    }

    pub fn low_value(&self) -> f64 {
        self.value_at(0)
    }

    pub fn high_value(&self) -> f64 {
        self.value_at(self.len() - 1)
    }

    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::Uniform {
                offset,
                scale,
                size,
                ..
            } => (0..*size).map(|index| offset + scale * index as f64).collect(),
            Self::NonUniform { values, .. } => values.clone(),
        }
    }

    /// Index of the channel whose calibrated value is closest to `energy`,
    /// clamped to the axis.
    pub fn index_nearest(&self, energy: f64) -> usize {
        match self {
            Self::Uniform {
                offset,
                scale,
                size,
                ..
            } => {
                let raw = ((energy - offset) / scale).round();
                raw.clamp(0.0, (*size - 1) as f64) as usize
            }
            Self::NonUniform { values, .. } => {
                match values.binary_search_by(|probe| probe.total_cmp(&energy)) {
                    Ok(index) => index,
                    Err(0) => 0,
                    Err(upper) if upper >= values.len() => values.len() - 1,
                    Err(upper) => {
                        let lower = upper - 1;
                        if (energy - values[lower]).abs() <= (values[upper] - energy).abs() {
                            lower
                        } else {
                            upper
                        }
                    }
                }
            }
        }
    }

    /// Half-open channel range covering the calibrated window `[low, high]`.
    pub fn window_indices(&self, low: f64, high: f64) -> AxisResult<Range<usize>> {
        if high < self.low_value() || low > self.high_value() {
            return Err(AxisError::WindowOutOfRange {
                low,
                high,
                axis_low: self.low_value(),
                axis_high: self.high_value(),
            });
        }
        let start = self.index_nearest(low);
        let stop = self.index_nearest(high);
        Ok(start..stop.max(start))
    }

    /// Axis restricted to the given channel range.
    pub fn cropped(&self, range: Range<usize>) -> AxisResult<Self> {
        if range.is_empty() || range.end > self.len() {
            return Err(AxisError::Empty);
        }
        Ok(match self {
            Self::Uniform {
                offset,
                scale,
                units,
                ..
            } => Self::Uniform {
                offset: offset + scale * range.start as f64,
                scale: *scale,
                size: range.len(),
                units: *units,
            },
            Self::NonUniform { values, units } => Self::NonUniform {
                values: values[range].to_vec(),
                units: *units,
            },
        })
    }
}

/// Acquisition parameters read by the physics formulas. All fields are
/// optional; formulas requiring one fail with a precondition error naming
/// the missing parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionParameters {
    pub beam_energy_kev: Option<f64>,
    pub convergence_angle_mrad: Option<f64>,
    pub collection_angle_mrad: Option<f64>,
    pub live_time_s: Option<f64>,
    pub probe_current_na: Option<f64>,
    pub tilt_alpha_deg: Option<f64>,
    pub tilt_beta_deg: Option<f64>,
    pub azimuth_angle_deg: Option<f64>,
    pub elevation_angle_deg: Option<f64>,
    pub energy_resolution_mnka_ev: Option<f64>,
}

impl AcquisitionParameters {
    pub fn require_beam_energy_kev(&self) -> MetadataResult<f64> {
        require(self.beam_energy_kev, "beam_energy_kev")
    }

    pub fn require_convergence_angle_mrad(&self) -> MetadataResult<f64> {
        require(self.convergence_angle_mrad, "convergence_angle_mrad")
    }

    pub fn require_collection_angle_mrad(&self) -> MetadataResult<f64> {
        require(self.collection_angle_mrad, "collection_angle_mrad")
    }

    pub fn require_tilt_alpha_deg(&self) -> MetadataResult<f64> {
        require(self.tilt_alpha_deg, "tilt_alpha_deg")
    }

    pub fn require_azimuth_angle_deg(&self) -> MetadataResult<f64> {
        require(self.azimuth_angle_deg, "azimuth_angle_deg")
    }

    pub fn require_elevation_angle_deg(&self) -> MetadataResult<f64> {
        require(self.elevation_angle_deg, "elevation_angle_deg")
    }

    pub fn require_energy_resolution_mnka_ev(&self) -> MetadataResult<f64> {
        require(self.energy_resolution_mnka_ev, "energy_resolution_mnka_ev")
    }
}

fn require(value: Option<f64>, parameter: &'static str) -> MetadataResult<f64> {
    value.ok_or(MetadataError::Missing { parameter })
}

/// One spectrum: channel intensities over a calibrated axis plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum1D {
    axis: EnergyAxis,
    intensities: Vec<f64>,
    #[serde(default)]
    pub metadata: AcquisitionParameters,
}

impl Spectrum1D {
    pub fn new(axis: EnergyAxis, intensities: Vec<f64>) -> AxisResult<Self> {
        if axis.len() != intensities.len() {
            return Err(AxisError::LengthMismatch {
                axis: axis.len(),
                data: intensities.len(),
            });
        }
        Ok(Self {
            axis,
            intensities,
            metadata: AcquisitionParameters::default(),
        })
    }

    pub fn with_metadata(mut self, metadata: AcquisitionParameters) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn axis(&self) -> &EnergyAxis {
        &self.axis
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn intensities_mut(&mut self) -> &mut [f64] {
        &mut self.intensities
    }

    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Replace the intensity array with one of identical length.
    pub fn set_intensities(&mut self, intensities: Vec<f64>) -> AxisResult<()> {
        if intensities.len() != self.axis.len() {
            return Err(AxisError::LengthMismatch {
                axis: self.axis.len(),
                data: intensities.len(),
            });
        }
        self.intensities = intensities;
        Ok(())
    }

    /// Channel sum over the calibrated window `[low, high]`.
    pub fn integrate_window(&self, low: f64, high: f64) -> AxisResult<f64> {
        let range = self.axis.window_indices(low, high)?;
        Ok(self.intensities[range].iter().sum())
    }

    pub fn total_intensity(&self) -> f64 {
        self.intensities.iter().sum()
    }

    /// Index of the most intense channel (first on ties).
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (index, value) in self.intensities.iter().enumerate() {
            if *value > self.intensities[best] {
                best = index;
            }
        }
        best
    }

    pub fn cropped(&self, range: Range<usize>) -> AxisResult<Self> {
        let axis = self.axis.cropped(range.clone())?;
        Ok(Self {
            axis,
            intensities: self.intensities[range].to_vec(),
            metadata: self.metadata.clone(),
        })
    }

    /// Taper both ends of the spectrum with half Hann windows so the signal
    /// decays smoothly to zero before Fourier processing. Returns the number
    /// of tapered channels per side.
    pub fn hanning_taper(&mut self, channels: Option<usize>) -> usize {
        let size = self.intensities.len();
        let channels = channels
            .unwrap_or_else(|| (((size as f64) * 0.02).round() as usize).max(20))
            .min(size / 2);
        if channels == 0 {
            return 0;
        }
        for offset in 0..channels {
            let window =
                0.5 - 0.5 * (std::f64::consts::PI * offset as f64 / channels as f64).cos();
            self.intensities[offset] *= window;
            self.intensities[size - 1 - offset] *= window;
        }
        channels
    }
}
