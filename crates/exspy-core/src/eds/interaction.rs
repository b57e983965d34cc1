//! Electron and X-ray interaction ranges in bulk material.

use crate::database::{DatabaseError, ElementDatabase, XrayLineId};

pub type RangeResult<T> = Result<T, RangeError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RangeError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("no tabulated density for '{element}'; pass the material density explicitly")]
    MissingDensity { element: String },
}

fn density_or_tabulated(element: &str, density_g_cm3: Option<f64>) -> RangeResult<f64> {
    match density_g_cm3 {
        Some(density) => Ok(density),
        None => ElementDatabase::bundled()
            .get(element)?
            .density_g_cm3
            .ok_or_else(|| RangeError::MissingDensity {
                element: element.to_string(),
            }),
    }
}

/// Maximum electron range in micrometers for a pure bulk material,
/// Kanaya-Okayama parameterization (Kanaya and Okayama 1972).
///
/// `density_g_cm3 = None` uses the pure-element density; `tilt_deg` is the
/// sample tilt.
pub fn electron_range(
    element: &str,
    beam_energy_kev: f64,
    density_g_cm3: Option<f64>,
    tilt_deg: f64,
) -> RangeResult<f64> {
    let record = ElementDatabase::bundled().get(element)?;
    let density = density_or_tabulated(element, density_g_cm3)?;
    let z = f64::from(record.atomic_number);
    Ok(0.0276 * record.atomic_weight / z.powf(0.89) / density
        * beam_energy_kev.powf(1.67)
        * tilt_deg.to_radians().cos())
}

/// Maximum depth of X-ray generation in micrometers, Anderson-Hasler
/// parameterization (Anderson and Hasler 1966).
pub fn xray_range(
    line_identifier: &str,
    beam_energy_kev: f64,
    density_g_cm3: Option<f64>,
) -> RangeResult<f64> {
    let line = XrayLineId::parse(line_identifier)?;
    let density = density_or_tabulated(&line.element, density_g_cm3)?;
    let line_energy = ElementDatabase::bundled().line_energy_kev(&line)?;
    Ok(0.064 / density * (beam_energy_kev.powf(1.68) - line_energy.powf(1.68)))
}
