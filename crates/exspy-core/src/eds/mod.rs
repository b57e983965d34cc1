//! Energy-dispersive X-ray spectroscopy: line lookup, geometry and range
//! formulas, quantification, and the EDS spectrum methods.

pub mod geometry;
pub mod interaction;
pub mod line_source;
pub mod lines;
pub mod quantification;
pub mod spectrum;

pub use geometry::take_off_angle;
pub use interaction::{electron_range, xray_range, RangeError, RangeResult};
pub use line_source::{
    resolve_line_energy, ExternalLineTable, LineEnergySource, LineSourceError, LineSourceResult,
};
pub use lines::{
    energy_of_line, expand_only_lines, fwhm_at_energy, get_xray_lines,
    get_xray_lines_near_energy, line_family, ElementLines, LineSearchError, LineSearchResult,
    LineSelection, NearbyLine,
};
pub use quantification::{
    absorption_correction_factors, cross_section_to_zeta, quantification_cliff_lorimer,
    quantification_cross_section, quantification_zeta_factor, zeta_to_cross_section,
    QuantificationError, QuantificationResult,
};
pub use spectrum::{EdsError, EdsResult, EdsSpectrum, LineIntensity};
