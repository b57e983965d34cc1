//! EDS spectrum wrapper: declared X-ray lines, integration and background
//! windows, background-subtracted line intensities.

use crate::database::{DatabaseError, ElementDatabase, XrayLineId};
use crate::domain::{AxisError, EnergyUnits, MetadataError, Spectrum1D};
use crate::eds::geometry;
use crate::eds::lines::fwhm_at_energy;

pub type EdsResult<T> = Result<T, EdsError>;

#[derive(Debug, thiserror::Error)]
pub enum EdsError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Axis(#[from] AxisError),
    #[error("no X-ray lines declared on this spectrum and none were passed")]
    NoLines,
    #[error("{windows} windows were provided for {lines} X-ray lines")]
    WindowCountMismatch { windows: usize, lines: usize },
}

/// Integrated (optionally background-subtracted) intensity of one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineIntensity {
    pub line: XrayLineId,
    /// Line energy in the axis units of the spectrum.
    pub energy: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdsSpectrum {
    pub spectrum: Spectrum1D,
    xray_lines: Vec<XrayLineId>,
}

impl EdsSpectrum {
    pub fn new(spectrum: Spectrum1D) -> Self {
        Self {
            spectrum,
            xray_lines: Vec::new(),
        }
    }

    /// Declare X-ray lines for later intensity extraction. Every identifier
    /// must resolve against the bundled database.
    pub fn add_lines(&mut self, identifiers: &[&str]) -> EdsResult<()> {
        let database = ElementDatabase::bundled();
        for identifier in identifiers {
            let line = XrayLineId::parse(identifier)?;
            database.line_energy_kev(&line)?;
            if !self.xray_lines.contains(&line) {
                self.xray_lines.push(line);
            }
        }
        Ok(())
    }

    pub fn xray_lines(&self) -> &[XrayLineId] {
        &self.xray_lines
    }

    fn selected_lines<'a>(&'a self, lines: Option<&'a [XrayLineId]>) -> EdsResult<&'a [XrayLineId]> {
        let selected = lines.unwrap_or(&self.xray_lines);
        if selected.is_empty() {
            return Err(EdsError::NoLines);
        }
        Ok(selected)
    }

    /// Tabulated line energy converted to the axis units.
    pub fn line_energy(&self, line: &XrayLineId) -> EdsResult<f64> {
        let energy_kev = ElementDatabase::bundled().line_energy_kev(line)?;
        Ok(match self.spectrum.axis().units() {
            EnergyUnits::KiloElectronVolt => energy_kev,
            EnergyUnits::ElectronVolt => energy_kev * 1.0e3,
        })
    }

    /// Line energy and detector-broadened FWHM, both in axis units. The
    /// Mn Ka energy resolution must be present in the metadata.
    pub fn line_energy_and_fwhm(&self, line: &XrayLineId) -> EdsResult<(f64, f64)> {
        let resolution = self
            .spectrum
            .metadata
            .require_energy_resolution_mnka_ev()?;
        let energy_kev = ElementDatabase::bundled().line_energy_kev(line)?;
        let fwhm_kev = fwhm_at_energy(resolution, energy_kev)?;
        Ok(match self.spectrum.axis().units() {
            EnergyUnits::KiloElectronVolt => (energy_kev, fwhm_kev),
            EnergyUnits::ElectronVolt => (energy_kev * 1.0e3, fwhm_kev * 1.0e3),
        })
    }

    /// One `[left, right]` integration window per line, `windows_width`
    /// times the detector FWHM wide.
    pub fn estimate_integration_windows(
        &self,
        windows_width: f64,
        lines: Option<&[XrayLineId]>,
    ) -> EdsResult<Vec<[f64; 2]>> {
        let lines = self.selected_lines(lines)?;
        let mut windows = Vec::with_capacity(lines.len());
        for line in lines {
            let (energy, fwhm) = self.line_energy_and_fwhm(line)?;
            let half_width = windows_width * fwhm / 2.0;
            windows.push([energy - half_width, energy + half_width]);
        }
        Ok(windows)
    }

    /// Two flanking background windows per line,
    /// `[left_start, left_end, right_start, right_end]`. The windows sit
    /// `line_width` FWHMs away from the line and are `windows_width` FWHMs
    /// wide; overlapping windows of neighbouring lines are merged.
    pub fn estimate_background_windows(
        &self,
        line_width: [f64; 2],
        windows_width: f64,
        lines: Option<&[XrayLineId]>,
    ) -> EdsResult<Vec<[f64; 4]>> {
        let lines = self.selected_lines(lines)?;
        let mut windows = Vec::with_capacity(lines.len());
        for line in lines {
            let (energy, fwhm) = self.line_energy_and_fwhm(line)?;
            windows.push([
                energy - fwhm * line_width[0] - fwhm * windows_width,
                energy - fwhm * line_width[0],
                energy + fwhm * line_width[1],
                energy + fwhm * line_width[1] + fwhm * windows_width,
            ]);
        }

        // Merge overlapping windows of neighbouring lines.
        let mut order: Vec<usize> = (0..windows.len()).collect();
        order.sort_by(|a, b| windows[*a][0].total_cmp(&windows[*b][0]));
        for pair in 0..order.len().saturating_sub(1) {
            let (ia, ib) = (order[pair], order[pair + 1]);
            if windows[ia][2] > windows[ib][0] {
                let merged = [windows[ia][0], windows[ia][1], windows[ib][2], windows[ib][3]];
                windows[ia] = merged;
                windows[ib] = merged;
            }
        }
        Ok(windows)
    }

    /// Integrated intensity per line. Without explicit windows the
    /// integration windows default to twice the detector FWHM. With
    /// background windows, the average background under the line is
    /// subtracted using the channel-width correction factor.
    pub fn get_lines_intensity(
        &self,
        lines: Option<&[XrayLineId]>,
        integration_windows: Option<&[[f64; 2]]>,
        background_windows: Option<&[[f64; 4]]>,
    ) -> EdsResult<Vec<LineIntensity>> {
        let lines = self.selected_lines(lines)?;
        let estimated;
        let integration_windows = match integration_windows {
            Some(windows) => windows,
            None => {
                estimated = self.estimate_integration_windows(2.0, Some(lines))?;
                &estimated
            }
        };
        if integration_windows.len() != lines.len() {
            return Err(EdsError::WindowCountMismatch {
                windows: integration_windows.len(),
                lines: lines.len(),
            });
        }
        if let Some(background) = background_windows
            && background.len() != lines.len()
        {
            return Err(EdsError::WindowCountMismatch {
                windows: background.len(),
                lines: lines.len(),
            });
        }

        let axis = self.spectrum.axis();
        let mut intensities = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let window = integration_windows[index];
            let mut intensity = self.spectrum.integrate_window(window[0], window[1])?;
            if let Some(background) = background_windows {
                let bw = background[index];
                let edges = [bw[0], bw[1], bw[2], bw[3], window[0], window[1]]
                    .map(|energy| axis.index_nearest(energy) as f64);
                let left = if edges[0] == edges[1] {
                    self.spectrum.intensities()[axis.index_nearest(bw[0])]
                } else {
                    self.spectrum.integrate_window(bw[0], bw[1])?
                };
                let right = if edges[2] == edges[3] {
                    self.spectrum.intensities()[axis.index_nearest(bw[2])]
                } else {
                    self.spectrum.integrate_window(bw[2], bw[3])?
                };
                let correction =
                    (edges[5] - edges[4]) / ((edges[1] - edges[0]) + (edges[3] - edges[2]));
                intensity -= (left + right) * correction;
            }
            intensities.push(LineIntensity {
                line: line.clone(),
                energy: self.line_energy(line)?,
                intensity,
            });
        }
        Ok(intensities)
    }

    /// Take-off angle in degrees from the stage/detector metadata.
    pub fn take_off_angle(&self) -> EdsResult<f64> {
        let metadata = &self.spectrum.metadata;
        Ok(geometry::take_off_angle(
            metadata.require_tilt_alpha_deg()?,
            metadata.require_azimuth_angle_deg()?,
            metadata.require_elevation_angle_deg()?,
            metadata.tilt_beta_deg.unwrap_or(0.0),
        ))
    }
}
