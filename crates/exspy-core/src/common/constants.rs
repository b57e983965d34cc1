//! Physical constants shared across the EELS/EDS formula kernels.
//!
//! Values that appear in more than one formula live here so the modules do
//! not accumulate ad hoc per-file literals.

/// keV to eV.
pub const EV_PER_KEV: f64 = 1000.0;

/// Gaussian sigma to full width at half maximum: `2 sqrt(2 ln 2)`.
pub const SIGMA_TO_FWHM: f64 = 2.354_820_045_030_949_4_f64;

/// Electron rest mass energy equivalent in keV (CODATA).
pub const ELECTRON_REST_ENERGY_KEV: f64 = 510.998_95_f64;

/// Avogadro constant in 1/mol (exact SI).
pub const AVOGADRO: f64 = 6.022_140_76e23_f64;

/// Characteristic inelastic cut-off angle in mrad used by the
/// Iakoubovskii mean-free-path parameterization.
pub const MFP_CUTOFF_ANGLE_MRAD: f64 = 20.0;

/// Proportionality constant between the single-scattering distribution and
/// the energy-loss function in the Kramers-Kronig normalization
/// (Egerton 2011, with energies in eV and thickness in nm).
pub const ELF_NORMALIZATION: f64 = 332.5;

/// Detector broadening factor of the Fiori-Newbury FWHM parameterization.
pub const FIORI_NEWBURY_FACTOR: f64 = 2.5;

#[cfg(test)]
mod tests {
    use super::{
        AVOGADRO, ELECTRON_REST_ENERGY_KEV, ELF_NORMALIZATION, EV_PER_KEV, FIORI_NEWBURY_FACTOR,
        MFP_CUTOFF_ANGLE_MRAD, SIGMA_TO_FWHM,
    };

    #[test]
    fn sigma_to_fwhm_matches_closed_form() {
        let expected = 2.0 * (2.0 * 2.0_f64.ln()).sqrt();
        assert!((SIGMA_TO_FWHM - expected).abs() <= 1.0e-15);
    }

    #[test]
    fn constants_remain_finite_and_positive() {
        for value in [
            EV_PER_KEV,
            ELECTRON_REST_ENERGY_KEV,
            AVOGADRO,
            MFP_CUTOFF_ANGLE_MRAD,
            ELF_NORMALIZATION,
            FIORI_NEWBURY_FACTOR,
        ] {
            assert!(value.is_finite());
            assert!(value > 0.0);
        }
    }
}
