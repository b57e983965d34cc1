//! X-ray line identification and energy-window searches over the bundled
//! database.

use crate::common::constants::{EV_PER_KEV, FIORI_NEWBURY_FACTOR};
use crate::database::{DatabaseResult, ElementDatabase, XrayLine, XrayLineId};

pub type LineSearchResult<T> = Result<T, LineSearchError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LineSearchError {
    #[error("search width must be >= 0, got {width}")]
    NegativeWidth { width: f64 },
}

/// Energy in keV tabulated for an `"X_Y"` line identifier, e.g.
/// `energy_of_line("Mn_Ka")` -> 5.8987.
pub fn energy_of_line(identifier: &str) -> DatabaseResult<f64> {
    let line = XrayLineId::parse(identifier)?;
    ElementDatabase::bundled().line_energy_kev(&line)
}

/// Family prefix of a line identifier, e.g. `"Mn_Ka"` -> `"Mn_K"`.
pub fn line_family(identifier: &str) -> DatabaseResult<String> {
    Ok(XrayLineId::parse(identifier)?.family())
}

/// Expand the `"a"`/`"b"` shorthands to the main alpha/beta lines of each
/// family; explicit line labels pass through unchanged.
pub fn expand_only_lines(only_lines: &[&str]) -> Vec<String> {
    let mut expanded: Vec<String> = only_lines.iter().map(|line| line.to_string()).collect();
    for line in only_lines {
        match *line {
            "a" => expanded.extend(["Ka", "La", "Ma"].map(String::from)),
            "b" => expanded.extend(["Kb", "Lb1", "Mb"].map(String::from)),
            _ => {}
        }
    }
    expanded
}

/// One line returned by an energy-window search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyLine {
    pub identifier: String,
    pub element: &'static str,
    pub line: &'static str,
    pub energy_kev: f64,
    pub weight: f64,
    pub distance_kev: f64,
}

/// All tabulated lines inside `[energy - width/2, energy + width/2]`,
/// sorted by absolute distance to `energy`. Ties keep the atomic-number
/// table order.
pub fn get_xray_lines_near_energy(
    energy_kev: f64,
    width_kev: f64,
    only_lines: Option<&[&str]>,
) -> LineSearchResult<Vec<NearbyLine>> {
    if width_kev < 0.0 {
        return Err(LineSearchError::NegativeWidth { width: width_kev });
    }
    let only_lines = only_lines.map(|lines| expand_only_lines(lines));
    let energy_min = energy_kev - width_kev / 2.0;
    let energy_max = energy_kev + width_kev / 2.0;

    let mut matches = Vec::new();
    for record in ElementDatabase::bundled().iter() {
        for line in &record.xray_lines {
            if let Some(only) = &only_lines
                && !only.iter().any(|label| label == line.label)
            {
                continue;
            }
            if line.energy_kev >= energy_min && line.energy_kev <= energy_max {
                matches.push(NearbyLine {
                    identifier: format!("{}_{}", record.symbol, line.label),
                    element: record.symbol,
                    line: line.label,
                    energy_kev: line.energy_kev,
                    weight: line.weight,
                    distance_kev: (line.energy_kev - energy_kev).abs(),
                });
            }
        }
    }
    matches.sort_by(|a, b| a.distance_kev.total_cmp(&b.distance_kev));
    Ok(matches)
}

/// Line selection filters for [`get_xray_lines`].
#[derive(Debug, Clone, PartialEq)]
pub struct LineSelection {
    pub weight_threshold: f64,
    pub energy_range_kev: Option<[f64; 2]>,
    pub only_lines: Option<Vec<String>>,
}

impl Default for LineSelection {
    fn default() -> Self {
        Self {
            weight_threshold: 0.1,
            energy_range_kev: None,
            only_lines: None,
        }
    }
}

impl LineSelection {
    fn accepts(&self, line: &XrayLine) -> bool {
        if line.weight < self.weight_threshold {
            return false;
        }
        if let Some([low, high]) = self.energy_range_kev
            && (line.energy_kev < low || line.energy_kev > high)
        {
            return false;
        }
        if let Some(only) = &self.only_lines
            && !only.iter().any(|label| label == line.label)
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementLines {
    pub element: &'static str,
    pub lines: Vec<XrayLine>,
}

/// Tabulated lines of the given elements that pass the selection filters.
/// Elements whose lines are all filtered out are omitted.
pub fn get_xray_lines(
    elements: &[&str],
    selection: &LineSelection,
) -> DatabaseResult<Vec<ElementLines>> {
    let selection = LineSelection {
        only_lines: selection
            .only_lines
            .as_ref()
            .map(|only| {
                let borrowed: Vec<&str> = only.iter().map(String::as_str).collect();
                expand_only_lines(&borrowed)
            }),
        ..selection.clone()
    };
    let database = ElementDatabase::bundled();
    let mut result = Vec::new();
    for element in elements {
        let record = database.get(element)?;
        let lines: Vec<XrayLine> = record
            .xray_lines
            .iter()
            .filter(|line| selection.accepts(line))
            .copied()
            .collect();
        if !lines.is_empty() {
            result.push(ElementLines {
                element: record.symbol,
                lines,
            });
        }
    }
    result.sort_by_key(|entry| {
        database
            .get(entry.element)
            .map(|record| record.atomic_number)
            .unwrap_or(u32::MAX)
    });
    Ok(result)
}

/// Detector-broadened FWHM in keV of a peak at `energy_kev`, from the known
/// resolution at Mn Ka (Fiori and Newbury parameterization).
pub fn fwhm_at_energy(energy_resolution_mnka_ev: f64, energy_kev: f64) -> DatabaseResult<f64> {
    let reference_energy = energy_of_line("Mn_Ka")?;
    let fwhm_ev_squared = FIORI_NEWBURY_FACTOR * (energy_kev - reference_energy) * EV_PER_KEV
        + energy_resolution_mnka_ev * energy_resolution_mnka_ev;
    Ok(fwhm_ev_squared.sqrt() / EV_PER_KEV)
}
