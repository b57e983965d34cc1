//! Kramers-Kronig analysis: complex dielectric function from a
//! single-scattering distribution.
//!
//! FFT-based transform after Johnson (1975) as popularized by Egerton's
//! Matlab routine, with the wrap-around handled by padding rather than a
//! reflected-tail correction. The optional outer loop subtracts an
//! estimated surface-plasmon contribution a fixed number of times; there is
//! no dynamic stopping criterion and the quality of the converged result is
//! left to the caller's judgement.

use crate::common::constants::{ELECTRON_REST_ENERGY_KEV, ELF_NORMALIZATION};
use crate::domain::{AxisError, EnergyUnits, MetadataError};
use crate::eels::spectrum::EelsSpectrum;
use crate::numerics::{fft_in_place, next_fast_len};

use num_complex::Complex64;
use tracing::debug;

pub type KramersKronigResult<T> = Result<T, KramersKronigError>;

#[derive(Debug, thiserror::Error)]
pub enum KramersKronigError {
    #[error(transparent)]
    Axis(#[from] AxisError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("provide the refractive index or the thickness, not both")]
    NormalizationConflict,
    #[error("provide one of the refractive index or the thickness")]
    NormalizationMissing,
    #[error("the zero-loss intensity is required when normalizing with the thickness")]
    ZlpRequired,
    #[error("the spectrum has no channels above zero energy loss")]
    EmptyPositiveRange,
    #[error("at least one iteration is required")]
    InvalidIterations,
}

/// Complex dielectric function over the positive energy-loss channels.
#[derive(Debug, Clone, PartialEq)]
pub struct DielectricFunction {
    pub energies_ev: Vec<f64>,
    pub values: Vec<Complex64>,
}

impl DielectricFunction {
    pub fn epsilon1(&self) -> Vec<f64> {
        self.values.iter().map(|value| value.re).collect()
    }

    pub fn epsilon2(&self) -> Vec<f64> {
        self.values.iter().map(|value| value.im).collect()
    }

    /// `Im(-1 / epsilon)`.
    pub fn energy_loss_function(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|value| (-value.inv()).im)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KramersKronigOptions {
    /// Outer surface-plasmon removal iterations; 1 skips the correction.
    pub iterations: usize,
    /// Medium refractive index for the sum-rule normalization.
    pub refractive_index: Option<f64>,
    /// Sample thickness in nm for the alternative normalization.
    pub thickness_nm: Option<f64>,
    /// Stabilization offset in eV for the surface-loss term.
    pub delta_ev: f64,
}

impl Default for KramersKronigOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            refractive_index: None,
            thickness_nm: None,
            delta_ev: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KramersKronigOutput {
    pub dielectric_function: DielectricFunction,
    /// Estimated thickness in nm; present when normalizing with the
    /// refractive index and a zero-loss intensity.
    pub thickness_nm: Option<f64>,
    /// Estimated surface-plasmon contribution; present when the outer loop
    /// ran at least twice with a zero-loss intensity.
    pub surface_plasmon: Option<Vec<f64>>,
}

impl EelsSpectrum {
    /// Calculate the complex dielectric function from this single-scattering
    /// distribution (a low-loss spectrum with the zero-loss peak removed).
    ///
    /// Exactly one of the refractive index or the thickness must be given;
    /// the thickness normalization additionally needs `zlp_intensity`, the
    /// integral of the zero-loss peak. Requires the beam energy and the
    /// collection semi-angle in the metadata, and an eV energy axis.
    pub fn kramers_kronig_analysis(
        &self,
        zlp_intensity: Option<f64>,
        options: &KramersKronigOptions,
    ) -> KramersKronigResult<KramersKronigOutput> {
        match (options.refractive_index, options.thickness_nm) {
            (None, None) => return Err(KramersKronigError::NormalizationMissing),
            (Some(_), Some(_)) => return Err(KramersKronigError::NormalizationConflict),
            _ => {}
        }
        if options.iterations == 0 {
            return Err(KramersKronigError::InvalidIterations);
        }
        let axis = self.spectrum.axis();
        let scale = axis.uniform_scale("Kramers-Kronig analysis")?;
        if axis.units() != EnergyUnits::ElectronVolt {
            return Err(KramersKronigError::Axis(AxisError::UnitMismatch {
                expected: EnergyUnits::ElectronVolt,
                actual: axis.units(),
            }));
        }
        if options.thickness_nm.is_some() && zlp_intensity.is_none() {
            return Err(KramersKronigError::ZlpRequired);
        }

        // Work on the strictly positive energy losses only.
        let first_positive = (0..axis.len())
            .find(|index| axis.value_at(*index) > 0.0)
            .ok_or(KramersKronigError::EmptyPositiveRange)?;
        let energies: Vec<f64> = (first_positive..axis.len())
            .map(|index| axis.value_at(index))
            .collect();
        let original: Vec<f64> = self.spectrum.intensities()[first_positive..].to_vec();
        let mut current = original.clone();
        let size = energies.len();

        let metadata = &self.spectrum.metadata;
        let e0 = metadata.require_beam_energy_kev()?;
        let beta = metadata.require_collection_angle_mrad()?;

        // Kinetic definitions (energies in keV, angles in mrad).
        let me = ELECTRON_REST_ENERGY_KEV;
        let ke = e0 * (1.0 + e0 / 2.0 / me) / (1.0 + e0 / me).powi(2);
        let tgt = e0 * (2.0 * me + e0) / (me + e0);
        let rk0 = 2590.0 * (1.0 + e0 / me) * (2.0 * ke / me).sqrt();

        let mut epsilon = vec![Complex64::new(0.0, 0.0); size];
        let mut thickness_estimate = options.thickness_nm;
        let mut surface_plasmon = None;

        for iteration in 0..options.iterations {
            // Angular corrections turn the spectrum into the (unnormalized)
            // energy-loss function.
            let mut elf: Vec<f64> = current
                .iter()
                .zip(&energies)
                .map(|(value, energy)| {
                    value / (1.0 + (beta * tgt / energy).powi(2)).ln() / scale
                })
                .collect();

            // Sum-rule (refractive index) or thickness normalization.
            let normalization = match (options.refractive_index, options.thickness_nm) {
                (Some(n), None) => {
                    let sum: f64 = elf
                        .iter()
                        .zip(&energies)
                        .map(|(value, energy)| value / energy)
                        .sum();
                    let k = sum * scale / (std::f64::consts::PI / 2.0) / (1.0 - 1.0 / (n * n));
                    if let Some(i0) = zlp_intensity {
                        thickness_estimate = Some(ELF_NORMALIZATION * k * ke / i0);
                    }
                    k
                }
                (None, Some(t)) => {
                    let i0 = zlp_intensity.ok_or(KramersKronigError::ZlpRequired)?;
                    t * i0 / (ELF_NORMALIZATION * ke)
                }
                _ => unreachable!("validated above"),
            };
            for value in &mut elf {
                *value /= normalization;
            }

            // Kramers-Kronig transform via FFT (Johnson 1975): doubling the
            // padded size works around the wrap-around.
            let padded = next_fast_len(2 * size);
            let mut buffer = vec![Complex64::new(0.0, 0.0); padded];
            for (slot, value) in buffer.iter_mut().zip(&elf) {
                slot.re = *value;
            }
            fft_in_place(&mut buffer);
            let mut odd_projection: Vec<Complex64> = buffer
                .iter()
                .map(|value| Complex64::new(-2.0 * value.im / padded as f64, 0.0))
                .collect();
            for value in odd_projection.iter_mut().take(size) {
                value.re = -value.re;
            }
            fft_in_place(&mut odd_projection);

            for (index, value) in epsilon.iter_mut().enumerate() {
                let re = odd_projection[index].re + 1.0;
                let im = elf[index];
                let denominator = re * re + im * im;
                *value = Complex64::new(re / denominator, im / denominator);
            }

            // Surface-loss correction: subtract a simulated surface plasmon
            // from the input and run again.
            if options.iterations > 1
                && let Some(thickness) = thickness_estimate
            {
                let surface: Vec<f64> = epsilon
                    .iter()
                    .zip(&elf)
                    .zip(&energies)
                    .map(|((eps, im), energy)| {
                        let e1 = eps.re;
                        let e2 = eps.im;
                        let surface_elf =
                            4.0 * e2 / ((e1 + 1.0).powi(2) + e2 * e2) - im;
                        let angular = tgt / (energy + options.delta_ev)
                            * (beta * tgt / energy).atan()
                            - beta / 1000.0 / (beta * beta + energy * energy / (tgt * tgt));
                        2000.0 * normalization * angular * surface_elf / rk0 / thickness * scale
                    })
                    .collect();
                current = original
                    .iter()
                    .zip(&surface)
                    .map(|(value, correction)| value - correction)
                    .collect();
                debug!(
                    iteration = iteration + 1,
                    total = options.iterations,
                    "surface plasmon removal"
                );
                if iteration + 1 == options.iterations {
                    surface_plasmon = Some(surface);
                }
            }
        }

        Ok(KramersKronigOutput {
            dielectric_function: DielectricFunction {
                energies_ev: energies,
                values: epsilon,
            },
            thickness_nm: if options.refractive_index.is_some() && zlp_intensity.is_some() {
                thickness_estimate
            } else {
                options.thickness_nm
            },
            surface_plasmon,
        })
    }
}

/// Proportionality constant between the EELS single-scattering intensity
/// and the energy-loss function for the given acquisition: `S(E) = k *
/// Im(-1/eps)` (Egerton 2011).
pub fn eels_proportionality_constant(
    beam_energy_kev: f64,
    collection_angle_mrad: f64,
    thickness_nm: f64,
    zlp_intensity: f64,
    energies_ev: &[f64],
) -> Vec<f64> {
    let me = ELECTRON_REST_ENERGY_KEV;
    let ke = beam_energy_kev * (1.0 + beam_energy_kev / 2.0 / me)
        / (1.0 + beam_energy_kev / me).powi(2);
    let tgt = beam_energy_kev * (2.0 * me + beam_energy_kev) / (me + beam_energy_kev);
    energies_ev
        .iter()
        .map(|energy| {
            let energy = if *energy == 0.0 { 1.0e-10 } else { *energy };
            thickness_nm * zlp_intensity / (ELF_NORMALIZATION * ke)
                * (1.0 + (collection_angle_mrad * tgt / energy).powi(2)).ln()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        eels_proportionality_constant, KramersKronigError, KramersKronigOptions,
    };
    use crate::domain::{AcquisitionParameters, EnergyAxis, EnergyUnits, Spectrum1D};
    use crate::eels::spectrum::EelsSpectrum;
    use num_complex::Complex64;

    const BEAM_ENERGY_KEV: f64 = 200.0;
    const COLLECTION_MRAD: f64 = 5.0;
    const THICKNESS_NM: f64 = 50.0;
    const ZLP_INTENSITY: f64 = 5.0e5;
    const PLASMON_ENERGY_EV: f64 = 16.0;
    const PLASMON_WIDTH_EV: f64 = 4.0;

    fn drude_epsilon(energy: f64) -> Complex64 {
        let e2 = energy * energy;
        Complex64::new(1.0, 0.0)
            - PLASMON_ENERGY_EV * PLASMON_ENERGY_EV
                / Complex64::new(e2, PLASMON_WIDTH_EV * energy)
    }

    fn drude_ssd() -> EelsSpectrum {
        let axis =
            EnergyAxis::uniform(0.1, 0.1, 2048, EnergyUnits::ElectronVolt).expect("axis");
        let energies = axis.values();
        let k = eels_proportionality_constant(
            BEAM_ENERGY_KEV,
            COLLECTION_MRAD,
            THICKNESS_NM,
            ZLP_INTENSITY,
            &energies,
        );
        let scale = 0.1;
        let intensities: Vec<f64> = energies
            .iter()
            .zip(&k)
            .map(|(energy, k)| {
                let eps = drude_epsilon(*energy);
                let elf = (-eps.inv()).im;
                k * elf * scale
            })
            .collect();
        let spectrum = Spectrum1D::new(axis, intensities)
            .expect("spectrum")
            .with_metadata(AcquisitionParameters {
                beam_energy_kev: Some(BEAM_ENERGY_KEV),
                collection_angle_mrad: Some(COLLECTION_MRAD),
                ..Default::default()
            });
        EelsSpectrum::new(spectrum)
    }

    #[test]
    fn recovers_the_drude_dielectric_function_with_thickness_normalization() {
        let ssd = drude_ssd();
        let output = ssd
            .kramers_kronig_analysis(
                Some(ZLP_INTENSITY),
                &KramersKronigOptions {
                    thickness_nm: Some(THICKNESS_NM),
                    ..Default::default()
                },
            )
            .expect("analysis");

        let eps = &output.dielectric_function;
        for probe_ev in [5.0, 10.0, 16.0, 25.0, 50.0] {
            let index = eps
                .energies_ev
                .iter()
                .position(|energy| (*energy - probe_ev).abs() < 0.05)
                .expect("probe channel");
            let expected = drude_epsilon(eps.energies_ev[index]);
            let actual = eps.values[index];
            let error = (actual - expected).norm() / expected.norm().max(1.0);
            assert!(
                error < 0.1,
                "E={probe_ev} expected={expected} actual={actual}"
            );
        }
        assert_eq!(output.thickness_nm, Some(THICKNESS_NM));
        assert!(output.surface_plasmon.is_none());

        // The recovered loss function is non-negative across the plasmon.
        for value in eps.energy_loss_function() {
            assert!(value > -1.0e-3);
        }
        assert_eq!(eps.epsilon1().len(), eps.epsilon2().len());
    }

    #[test]
    fn sum_rule_normalization_recovers_the_thickness() {
        let ssd = drude_ssd();
        let output = ssd
            .kramers_kronig_analysis(
                Some(ZLP_INTENSITY),
                &KramersKronigOptions {
                    refractive_index: Some(1000.0),
                    ..Default::default()
                },
            )
            .expect("analysis");
        let thickness = output.thickness_nm.expect("thickness estimate");
        assert!(
            (thickness - THICKNESS_NM).abs() / THICKNESS_NM < 0.05,
            "thickness={thickness}"
        );
    }

    #[test]
    fn surface_iterations_produce_a_surface_estimate() {
        let ssd = drude_ssd();
        let output = ssd
            .kramers_kronig_analysis(
                Some(ZLP_INTENSITY),
                &KramersKronigOptions {
                    thickness_nm: Some(THICKNESS_NM),
                    iterations: 3,
                    ..Default::default()
                },
            )
            .expect("analysis");
        let surface = output.surface_plasmon.expect("surface estimate");
        assert_eq!(surface.len(), output.dielectric_function.values.len());
        assert!(surface.iter().any(|value| *value != 0.0));
    }

    #[test]
    fn input_validation_catches_conflicting_normalizations() {
        let ssd = drude_ssd();
        assert!(matches!(
            ssd.kramers_kronig_analysis(None, &KramersKronigOptions::default()),
            Err(KramersKronigError::NormalizationMissing)
        ));
        assert!(matches!(
            ssd.kramers_kronig_analysis(
                Some(ZLP_INTENSITY),
                &KramersKronigOptions {
                    refractive_index: Some(3.0),
                    thickness_nm: Some(40.0),
                    ..Default::default()
                }
            ),
            Err(KramersKronigError::NormalizationConflict)
        ));
        assert!(matches!(
            ssd.kramers_kronig_analysis(
                None,
                &KramersKronigOptions {
                    thickness_nm: Some(40.0),
                    ..Default::default()
                }
            ),
            Err(KramersKronigError::ZlpRequired)
        ));
        assert!(matches!(
            ssd.kramers_kronig_analysis(
                Some(ZLP_INTENSITY),
                &KramersKronigOptions {
                    refractive_index: Some(3.0),
                    iterations: 0,
                    ..Default::default()
                }
            ),
            Err(KramersKronigError::InvalidIterations)
        ));
    }

    #[test]
    fn missing_collection_angle_is_a_precondition_error() {
        let mut ssd = drude_ssd();
        ssd.spectrum.metadata.collection_angle_mrad = None;
        assert!(matches!(
            ssd.kramers_kronig_analysis(
                Some(ZLP_INTENSITY),
                &KramersKronigOptions {
                    thickness_nm: Some(THICKNESS_NM),
                    ..Default::default()
                }
            ),
            Err(KramersKronigError::Metadata(_))
        ));
    }
}
