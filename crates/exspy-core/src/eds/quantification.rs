//! Composition estimators: Cliff-Lorimer, zeta-factor and partial
//! cross-section quantification, plus the absorption-correction terms and
//! the zeta/cross-section unit conversions.
//!
//! Intensity stacks are element-major: `intensities[element][pixel]`, with
//! the navigation dimensions flattened. All estimators are pure functions;
//! results are recomputed from the inputs on every call.

use crate::common::constants::AVOGADRO;
use crate::database::{DatabaseError, ElementDatabase};
use crate::numerics::stable_sum;

/// Intensities at or below this many counts are treated as zero so they
/// never end up in a ratio denominator.
const MIN_INTENSITY: f64 = 0.1;

pub type QuantificationResult<T> = Result<T, QuantificationError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantificationError {
    #[error("at least one intensity map is required")]
    Empty,
    #[error("the number of factors ({factors}) must match the number of intensity maps ({intensities})")]
    FactorCountMismatch { factors: usize, intensities: usize },
    #[error("intensity map {index} has {actual} pixels, expected {expected}")]
    NavigationSizeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("absorption correction map {index} has {actual} pixels, expected {expected}")]
    AbsorptionShapeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("mask has {actual} pixels, expected {expected}")]
    MaskLengthMismatch { expected: usize, actual: usize },
    #[error("electron dose must be finite and > 0, got {dose}")]
    InvalidDose { dose: f64 },
    #[error("the number of elements ({elements}) must match the number of factors ({factors})")]
    ElementCountMismatch { elements: usize, factors: usize },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

fn validate_stack(
    intensities: &[Vec<f64>],
    factors: usize,
) -> QuantificationResult<usize> {
    if intensities.is_empty() {
        return Err(QuantificationError::Empty);
    }
    if factors != intensities.len() {
        return Err(QuantificationError::FactorCountMismatch {
            factors,
            intensities: intensities.len(),
        });
    }
    let pixels = intensities[0].len();
    for (index, map) in intensities.iter().enumerate() {
        if map.len() != pixels {
            return Err(QuantificationError::NavigationSizeMismatch {
                index,
                expected: pixels,
                actual: map.len(),
            });
        }
    }
    Ok(pixels)
}

fn validate_absorption(
    absorption_correction: Option<&[Vec<f64>]>,
    elements: usize,
    pixels: usize,
) -> QuantificationResult<()> {
    let Some(correction) = absorption_correction else {
        return Ok(());
    };
    if correction.len() != elements {
        return Err(QuantificationError::FactorCountMismatch {
            factors: correction.len(),
            intensities: elements,
        });
    }
    for (index, map) in correction.iter().enumerate() {
        if map.len() != pixels {
            return Err(QuantificationError::AbsorptionShapeMismatch {
                index,
                expected: pixels,
                actual: map.len(),
            });
        }
    }
    Ok(())
}

fn corrected(
    intensities: &[Vec<f64>],
    absorption_correction: Option<&[Vec<f64>]>,
    element: usize,
    pixel: usize,
) -> f64 {
    let factor = absorption_correction
        .map(|correction| correction[element][pixel])
        .unwrap_or(1.0);
    intensities[element][pixel] * factor
}

/// Cliff-Lorimer ratio quantification.
///
/// Returns weight fractions with the shape of `intensities`. Per pixel, the
/// first two intensities above the 0.1-count threshold serve as the
/// reference ratio pair; pixels with no usable intensity quantify to zero
/// (a single usable element quantifies to one). Masked pixels are zeroed.
pub fn quantification_cliff_lorimer(
    intensities: &[Vec<f64>],
    kfactors: &[f64],
    absorption_correction: Option<&[Vec<f64>]>,
    mask: Option<&[bool]>,
) -> QuantificationResult<Vec<Vec<f64>>> {
    let pixels = validate_stack(intensities, kfactors.len())?;
    validate_absorption(absorption_correction, intensities.len(), pixels)?;
    if let Some(mask) = mask
        && mask.len() != pixels
    {
        return Err(QuantificationError::MaskLengthMismatch {
            expected: pixels,
            actual: mask.len(),
        });
    }

    let elements = intensities.len();
    let mut composition = vec![vec![0.0; pixels]; elements];
    for pixel in 0..pixels {
        if mask.map(|mask| mask[pixel]).unwrap_or(false) {
            continue;
        }
        let usable: Vec<usize> = (0..elements)
            .filter(|element| intensities[*element][pixel] > MIN_INTENSITY)
            .collect();
        match usable.len() {
            0 => {}
            1 => composition[usable[0]][pixel] = 1.0,
            _ => {
                let fractions = cliff_lorimer_pixel(
                    intensities,
                    kfactors,
                    absorption_correction,
                    pixel,
                    usable[0],
                    usable[1],
                );
                for (element, fraction) in fractions.into_iter().enumerate() {
                    composition[element][pixel] = fraction;
                }
            }
        }
    }
    Ok(composition)
}

/// One pixel of the Cliff-Lorimer solve with an explicit reference pair.
fn cliff_lorimer_pixel(
    intensities: &[Vec<f64>],
    kfactors: &[f64],
    absorption_correction: Option<&[Vec<f64>]>,
    pixel: usize,
    ref_index: usize,
    ref_index2: usize,
) -> Vec<f64> {
    let elements = kfactors.len();
    let reference = corrected(intensities, absorption_correction, ref_index, pixel);

    // ab[i] = (I_ref / I_i) * (k_ref / k_i)
    let mut ab = vec![0.0; elements];
    for element in 0..elements {
        if element == ref_index {
            continue;
        }
        let intensity = corrected(intensities, absorption_correction, element, pixel);
        ab[element] = reference / intensity * (kfactors[ref_index] / kfactors[element]);
    }

    // C_ref = ab2 / (1 + ab2 + ab2/ab3 + ...)
    let mut denominator = 1.0;
    for element in 0..elements {
        if element == ref_index {
            continue;
        }
        if element == ref_index2 {
            denominator += ab[ref_index2];
        } else {
            denominator += ab[ref_index2] / ab[element];
        }
    }

    let mut composition = vec![0.0; elements];
    composition[ref_index] = ab[ref_index2] / denominator;
    for element in 0..elements {
        if element != ref_index {
            composition[element] = composition[ref_index] / ab[element];
        }
    }
    composition
}

/// Zeta-factor quantification: weight fractions plus the mass-thickness map
/// in kg/m^2.
///
/// `dose` is the total electron dose `i * t / e`.
pub fn quantification_zeta_factor(
    intensities: &[Vec<f64>],
    zfactors: &[f64],
    dose: f64,
    absorption_correction: Option<&[Vec<f64>]>,
) -> QuantificationResult<(Vec<Vec<f64>>, Vec<f64>)> {
    let pixels = validate_stack(intensities, zfactors.len())?;
    validate_absorption(absorption_correction, intensities.len(), pixels)?;
    if !dose.is_finite() || dose <= 0.0 {
        return Err(QuantificationError::InvalidDose { dose });
    }

    let elements = intensities.len();
    let mut composition = vec![vec![0.0; pixels]; elements];
    let mut mass_thickness = vec![0.0; pixels];
    for pixel in 0..pixels {
        let weighted_sum = stable_sum((0..elements).map(|element| {
            corrected(intensities, absorption_correction, element, pixel) * zfactors[element]
        }));
        if weighted_sum > 0.0 {
            for (element, map) in composition.iter_mut().enumerate() {
                map[pixel] = corrected(intensities, absorption_correction, element, pixel)
                    * zfactors[element]
                    / weighted_sum;
            }
        }
        mass_thickness[pixel] = weighted_sum / dose;
    }
    Ok((composition, mass_thickness))
}

/// Partial cross-section quantification: atomic fractions plus the number
/// of atoms contributing to each intensity.
///
/// `dose` is the electron dose per unit area `i * t / (e * A)`; the cross
/// sections are in barns.
pub fn quantification_cross_section(
    intensities: &[Vec<f64>],
    cross_sections: &[f64],
    dose: f64,
    absorption_correction: Option<&[Vec<f64>]>,
) -> QuantificationResult<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    let pixels = validate_stack(intensities, cross_sections.len())?;
    validate_absorption(absorption_correction, intensities.len(), pixels)?;
    if !dose.is_finite() || dose <= 0.0 {
        return Err(QuantificationError::InvalidDose { dose });
    }

    let elements = intensities.len();
    let mut number_of_atoms = vec![vec![0.0; pixels]; elements];
    for element in 0..elements {
        // Barns to cm^2 brings the 1e-10 scaling used with doses per nm^2.
        let scale = cross_sections[element] * dose * 1.0e-10;
        for pixel in 0..pixels {
            number_of_atoms[element][pixel] =
                intensities[element][pixel] / scale
                    * absorption_correction
                        .map(|correction| correction[element][pixel])
                        .unwrap_or(1.0);
        }
    }

    let mut composition = vec![vec![0.0; pixels]; elements];
    for pixel in 0..pixels {
        let total = stable_sum((0..elements).map(|element| number_of_atoms[element][pixel]));
        if total > 0.0 {
            for (element, map) in composition.iter_mut().enumerate() {
                map[pixel] = number_of_atoms[element][pixel] / total;
            }
        }
    }
    Ok((composition, number_of_atoms))
}

/// Absorption-correction factors `x / (1 - exp(-x))` with
/// `x = mac * mass_thickness / sin(take-off angle)`.
///
/// `mass_absorption_coefficients` are per-element maps in m^2/kg and the
/// mass thickness is in kg/m^2, both with the same flattened navigation
/// shape as the intensity stacks.
pub fn absorption_correction_factors(
    mass_absorption_coefficients: &[Vec<f64>],
    mass_thickness: &[f64],
    take_off_angle_deg: f64,
) -> QuantificationResult<Vec<Vec<f64>>> {
    if mass_absorption_coefficients.is_empty() {
        return Err(QuantificationError::Empty);
    }
    let pixels = mass_thickness.len();
    for (index, map) in mass_absorption_coefficients.iter().enumerate() {
        if map.len() != pixels {
            return Err(QuantificationError::AbsorptionShapeMismatch {
                index,
                expected: pixels,
                actual: map.len(),
            });
        }
    }

    let cosecant = 1.0 / take_off_angle_deg.to_radians().sin();
    let factors = mass_absorption_coefficients
        .iter()
        .map(|map| {
            map.iter()
                .zip(mass_thickness)
                .map(|(mac, thickness)| {
                    let exponent = mac * thickness * cosecant;
                    if exponent == 0.0 {
                        1.0
                    } else {
                        exponent / (1.0 - (-exponent).exp())
                    }
                })
                .collect()
        })
        .collect();
    Ok(factors)
}

/// Convert partial cross sections in barns to zeta factors in kg/m^2.
pub fn cross_section_to_zeta(
    cross_sections: &[f64],
    elements: &[&str],
) -> QuantificationResult<Vec<f64>> {
    convert_with_atomic_weight(cross_sections, elements)
}

/// Convert zeta factors in kg/m^2 to partial cross sections in barns.
pub fn zeta_to_cross_section(
    zfactors: &[f64],
    elements: &[&str],
) -> QuantificationResult<Vec<f64>> {
    convert_with_atomic_weight(zfactors, elements)
}

/// Both conversions are the involution `A / (x * N_A * 1e-25)`.
fn convert_with_atomic_weight(
    factors: &[f64],
    elements: &[&str],
) -> QuantificationResult<Vec<f64>> {
    if factors.len() != elements.len() {
        return Err(QuantificationError::ElementCountMismatch {
            elements: elements.len(),
            factors: factors.len(),
        });
    }
    let database = ElementDatabase::bundled();
    elements
        .iter()
        .zip(factors)
        .map(|(element, factor)| {
            let weight = database.get(element)?.atomic_weight;
            Ok(weight / (factor * AVOGADRO * 1.0e-25))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        absorption_correction_factors, cross_section_to_zeta, quantification_cliff_lorimer,
        quantification_cross_section, quantification_zeta_factor, zeta_to_cross_section,
        QuantificationError,
    };

    fn assert_close(expected: f64, actual: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected={expected} actual={actual}"
        );
    }

    #[test]
    fn equal_intensities_with_unit_kfactors_split_evenly() {
        let intensities = vec![vec![10.0], vec![10.0]];
        let composition =
            quantification_cliff_lorimer(&intensities, &[1.0, 1.0], None, None).expect("cl");
        assert_close(0.5, composition[0][0], 1.0e-12);
        assert_close(0.5, composition[1][0], 1.0e-12);
    }

    #[test]
    fn cliff_lorimer_three_elements_sum_to_one() {
        let intensities = vec![vec![1200.0, 300.0], vec![800.0, 950.0], vec![400.0, 550.0]];
        let kfactors = [1.0, 1.47, 1.72];
        let composition =
            quantification_cliff_lorimer(&intensities, &kfactors, None, None).expect("cl");
        for pixel in 0..2 {
            let total: f64 = (0..3).map(|element| composition[element][pixel]).sum();
            assert_close(1.0, total, 1.0e-12);
        }
        // Ratios follow I_a k_b / (I_b k_a) relative to the first element.
        let expected_ratio = (intensities[1][0] * kfactors[1]) / (intensities[0][0] * kfactors[0]);
        assert_close(
            expected_ratio,
            composition[1][0] / composition[0][0],
            1.0e-12,
        );
    }

    #[test]
    fn near_zero_pixels_quantify_to_zero_or_single_survivor() {
        let intensities = vec![vec![0.0, 0.05, 12.0], vec![0.0, 9.0, 0.01]];
        let composition =
            quantification_cliff_lorimer(&intensities, &[1.0, 1.3], None, None).expect("cl");
        // All below threshold.
        assert_eq!(composition[0][0], 0.0);
        assert_eq!(composition[1][0], 0.0);
        // One survivor takes the full fraction.
        assert_eq!(composition[0][1], 0.0);
        assert_eq!(composition[1][1], 1.0);
        assert_eq!(composition[0][2], 1.0);
        assert_eq!(composition[1][2], 0.0);
    }

    #[test]
    fn mask_zeroes_selected_pixels() {
        let intensities = vec![vec![5.0, 5.0], vec![5.0, 5.0]];
        let mask = [false, true];
        let composition =
            quantification_cliff_lorimer(&intensities, &[1.0, 1.0], None, Some(&mask))
                .expect("cl");
        assert_close(0.5, composition[0][0], 1.0e-12);
        assert_eq!(composition[0][1], 0.0);
        assert_eq!(composition[1][1], 0.0);
    }

    #[test]
    fn absorption_correction_shifts_the_ratio() {
        let intensities = vec![vec![10.0], vec![10.0]];
        let correction = vec![vec![1.0], vec![2.0]];
        let composition =
            quantification_cliff_lorimer(&intensities, &[1.0, 1.0], Some(&correction), None)
                .expect("cl");
        // Corrected intensities 10 and 20 split 1:2.
        assert_close(1.0 / 3.0, composition[0][0], 1.0e-12);
        assert_close(2.0 / 3.0, composition[1][0], 1.0e-12);
    }

    #[test]
    fn factor_count_mismatch_is_rejected() {
        let intensities = vec![vec![1.0], vec![1.0]];
        assert_eq!(
            quantification_cliff_lorimer(&intensities, &[1.0], None, None)
                .expect_err("mismatch"),
            QuantificationError::FactorCountMismatch {
                factors: 1,
                intensities: 2
            }
        );
    }

    #[test]
    fn zeta_factor_returns_fractions_and_mass_thickness() {
        let intensities = vec![vec![2000.0], vec![1000.0]];
        let zfactors = [600.0, 500.0];
        let dose = 1.0e6;
        let (composition, mass_thickness) =
            quantification_zeta_factor(&intensities, &zfactors, dose, None).expect("zeta");
        let weighted = 2000.0 * 600.0 + 1000.0 * 500.0;
        assert_close(2000.0 * 600.0 / weighted, composition[0][0], 1.0e-12);
        assert_close(1000.0 * 500.0 / weighted, composition[1][0], 1.0e-12);
        assert_close(weighted / dose, mass_thickness[0], 1.0e-12);
        assert_close(1.0, composition[0][0] + composition[1][0], 1.0e-12);
    }

    #[test]
    fn zeta_factor_rejects_non_positive_dose() {
        let intensities = vec![vec![1.0]];
        assert_eq!(
            quantification_zeta_factor(&intensities, &[1.0], 0.0, None).expect_err("dose"),
            QuantificationError::InvalidDose { dose: 0.0 }
        );
    }

    #[test]
    fn cross_section_returns_fractions_and_atom_counts() {
        let intensities = vec![vec![500.0], vec![1500.0]];
        let cross_sections = [2.0, 4.0];
        let dose = 1.0e5;
        let (composition, atoms) =
            quantification_cross_section(&intensities, &cross_sections, dose, None)
                .expect("cross section");
        let atoms_a = 500.0 / (2.0 * dose * 1.0e-10);
        let atoms_b = 1500.0 / (4.0 * dose * 1.0e-10);
        assert_close(atoms_a, atoms[0][0], atoms_a * 1.0e-12);
        assert_close(atoms_b, atoms[1][0], atoms_b * 1.0e-12);
        assert_close(atoms_a / (atoms_a + atoms_b), composition[0][0], 1.0e-12);
        assert_close(1.0, composition[0][0] + composition[1][0], 1.0e-12);
    }

    #[test]
    fn absorption_factors_approach_one_for_thin_samples() {
        let macs = vec![vec![5.0, 5.0]];
        let factors =
            absorption_correction_factors(&macs, &[0.0, 1.0e-4], 35.0).expect("factors");
        assert_eq!(factors[0][0], 1.0);
        assert!(factors[0][1] > 1.0);
        assert!(factors[0][1] < 1.01);
    }

    #[test]
    fn zeta_and_cross_section_conversions_are_mutual_inverses() {
        let elements = ["As", "Ga"];
        let cross_sections = [25.0, 30.0];
        let zetas = cross_section_to_zeta(&cross_sections, &elements).expect("zeta");
        let recovered = zeta_to_cross_section(&zetas, &elements).expect("cross sections");
        for (expected, actual) in cross_sections.iter().zip(&recovered) {
            assert_close(*expected, *actual, 1.0e-12);
        }

        assert_eq!(
            cross_section_to_zeta(&cross_sections, &["As"]).expect_err("mismatch"),
            QuantificationError::ElementCountMismatch {
                elements: 1,
                factors: 2
            }
        );
        assert!(matches!(
            cross_section_to_zeta(&[1.0], &["Xx"]).expect_err("unknown element"),
            QuantificationError::Database(_)
        ));
    }
}
