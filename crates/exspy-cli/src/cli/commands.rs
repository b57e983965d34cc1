use super::table::{element_lines_table, nearby_edges_table, nearby_lines_table};
use super::{invalid, CliError};

use exspy_core::eds::{
    electron_range, get_xray_lines, get_xray_lines_near_energy, quantification_cliff_lorimer,
    quantification_cross_section, quantification_zeta_factor, resolve_line_energy, take_off_angle,
    xray_range, ExternalLineTable, LineEnergySource, LineSelection,
};
use exspy_core::eels::{get_edges_near_energy, EdgeOrder};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(clap::Subcommand)]
pub(super) enum CliCommand {
    /// List the tabulated X-ray lines of the given elements
    Lines(LinesArgs),
    /// Find X-ray lines near an energy
    LinesNearEnergy(LinesNearEnergyArgs),
    /// Find ionization edges near an energy
    EdgesNearEnergy(EdgesNearEnergyArgs),
    /// Energy of one X-ray line, optionally cross-referenced externally
    LineEnergy(LineEnergyArgs),
    /// Kanaya-Okayama electron range in a pure bulk material
    ElectronRange(ElectronRangeArgs),
    /// Anderson-Hasler X-ray generation range
    XrayRange(XrayRangeArgs),
    /// Take-off angle from the stage and detector geometry
    TakeOffAngle(TakeOffAngleArgs),
    /// Run a quantification request from a JSON file
    Quantify(QuantifyArgs),
}

#[derive(clap::Args)]
pub(super) struct LinesArgs {
    /// Element symbols, e.g. Fe Pt
    #[arg(required = true)]
    elements: Vec<String>,

    /// Minimum relative line weight
    #[arg(long, default_value_t = 0.1)]
    weight_threshold: f64,

    /// Lower bound of the energy range in keV
    #[arg(long)]
    energy_min: Option<f64>,

    /// Upper bound of the energy range in keV
    #[arg(long)]
    energy_max: Option<f64>,

    /// Comma-separated line labels or the 'a'/'b' shorthands
    #[arg(long, value_delimiter = ',')]
    only_lines: Option<Vec<String>>,
}

#[derive(clap::Args)]
pub(super) struct LinesNearEnergyArgs {
    /// Energy to search near, in keV
    energy: f64,

    /// Window width in keV (the search covers +/- width/2)
    #[arg(long, default_value_t = 0.2)]
    width: f64,

    /// Comma-separated line labels or the 'a'/'b' shorthands
    #[arg(long, value_delimiter = ',')]
    only_lines: Option<Vec<String>>,
}

#[derive(clap::Args)]
pub(super) struct EdgesNearEnergyArgs {
    /// Energy to search near, in eV
    energy: f64,

    /// Window width in eV (the search covers +/- width/2)
    #[arg(long, default_value_t = 10.0)]
    width: f64,

    /// Sort order: closest, ascending or descending
    #[arg(long, default_value = "closest")]
    order: String,

    /// Show only the major edges
    #[arg(long)]
    major: bool,
}

#[derive(clap::Args)]
pub(super) struct LineEnergyArgs {
    /// X-ray line identifier, e.g. Fe_Ka
    line: String,

    /// JSON table preferred over the bundled database
    #[arg(long)]
    external_table: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ElectronRangeArgs {
    /// Element symbol, e.g. Cu
    element: String,

    /// Beam energy in keV
    beam_energy: f64,

    /// Material density in g/cm^3 (pure-element density when omitted)
    #[arg(long)]
    density: Option<f64>,

    /// Sample tilt in degrees
    #[arg(long, default_value_t = 0.0)]
    tilt: f64,
}

#[derive(clap::Args)]
pub(super) struct XrayRangeArgs {
    /// X-ray line identifier, e.g. Cu_Ka
    line: String,

    /// Beam energy in keV
    beam_energy: f64,

    /// Material density in g/cm^3 (pure-element density when omitted)
    #[arg(long)]
    density: Option<f64>,
}

#[derive(clap::Args)]
pub(super) struct TakeOffAngleArgs {
    /// Stage alpha tilt in degrees
    #[arg(long)]
    tilt_alpha: f64,

    /// Detector azimuth in degrees
    #[arg(long)]
    azimuth: f64,

    /// Detector elevation in degrees
    #[arg(long)]
    elevation: f64,

    /// Stage beta tilt in degrees
    #[arg(long, default_value_t = 0.0)]
    tilt_beta: f64,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub(super) enum QuantifyMethod {
    CliffLorimer,
    ZetaFactor,
    CrossSection,
}

#[derive(clap::Args)]
pub(super) struct QuantifyArgs {
    /// Quantification model to apply
    #[arg(long, value_enum)]
    method: QuantifyMethod,

    /// JSON request file
    request: PathBuf,
}

#[derive(Deserialize)]
struct QuantifyRequest {
    /// Element-major intensity stack: one flattened map per element.
    intensities: Vec<Vec<f64>>,
    /// k-factors, zeta-factors or cross sections depending on the method.
    factors: Vec<f64>,
    #[serde(default)]
    dose: Option<f64>,
    #[serde(default)]
    absorption_correction: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    mask: Option<Vec<bool>>,
}

#[derive(Serialize)]
struct QuantifyResponse {
    method: &'static str,
    composition: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mass_thickness: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_of_atoms: Option<Vec<Vec<f64>>>,
}

pub(super) fn dispatch(command: CliCommand) -> Result<String, CliError> {
    match command {
        CliCommand::Lines(args) => run_lines(args),
        CliCommand::LinesNearEnergy(args) => run_lines_near_energy(args),
        CliCommand::EdgesNearEnergy(args) => run_edges_near_energy(args),
        CliCommand::LineEnergy(args) => run_line_energy(args),
        CliCommand::ElectronRange(args) => run_electron_range(args),
        CliCommand::XrayRange(args) => run_xray_range(args),
        CliCommand::TakeOffAngle(args) => run_take_off_angle(args),
        CliCommand::Quantify(args) => run_quantify(args),
    }
}

fn run_lines(args: LinesArgs) -> Result<String, CliError> {
    let energy_range_kev = match (args.energy_min, args.energy_max) {
        (None, None) => None,
        (low, high) => Some([low.unwrap_or(0.0), high.unwrap_or(f64::MAX)]),
    };
    let selection = LineSelection {
        weight_threshold: args.weight_threshold,
        energy_range_kev,
        only_lines: args.only_lines,
    };
    let elements: Vec<&str> = args.elements.iter().map(String::as_str).collect();
    let lines = get_xray_lines(&elements, &selection).map_err(invalid)?;
    Ok(element_lines_table(&lines))
}

fn run_lines_near_energy(args: LinesNearEnergyArgs) -> Result<String, CliError> {
    let only_lines: Option<Vec<&str>> = args
        .only_lines
        .as_ref()
        .map(|lines| lines.iter().map(String::as_str).collect());
    let lines = get_xray_lines_near_energy(args.energy, args.width, only_lines.as_deref())
        .map_err(invalid)?;
    Ok(nearby_lines_table(&lines))
}

fn run_edges_near_energy(args: EdgesNearEnergyArgs) -> Result<String, CliError> {
    let order = EdgeOrder::from_str(&args.order).map_err(invalid)?;
    let edges =
        get_edges_near_energy(args.energy, args.width, args.major, order).map_err(invalid)?;
    Ok(nearby_edges_table(&edges))
}

fn run_line_energy(args: LineEnergyArgs) -> Result<String, CliError> {
    let (source, external) = match args.external_table {
        Some(path) => (
            LineEnergySource::External,
            Some(ExternalLineTable::from_json_path(path).map_err(invalid)?),
        ),
        None => (LineEnergySource::Bundled, None),
    };
    let energy =
        resolve_line_energy(&args.line, source, external.as_ref()).map_err(invalid)?;
    Ok(format!("{} at {} keV\n", args.line, energy))
}

fn run_electron_range(args: ElectronRangeArgs) -> Result<String, CliError> {
    let range = electron_range(&args.element, args.beam_energy, args.density, args.tilt)
        .map_err(invalid)?;
    Ok(format!(
        "electron range of {} at {} keV: {:.4} um\n",
        args.element, args.beam_energy, range
    ))
}

fn run_xray_range(args: XrayRangeArgs) -> Result<String, CliError> {
    let range = xray_range(&args.line, args.beam_energy, args.density).map_err(invalid)?;
    Ok(format!(
        "X-ray range of {} at {} keV: {:.4} um\n",
        args.line, args.beam_energy, range
    ))
}

fn run_take_off_angle(args: TakeOffAngleArgs) -> Result<String, CliError> {
    let angle = take_off_angle(args.tilt_alpha, args.azimuth, args.elevation, args.tilt_beta);
    Ok(format!("take-off angle: {angle:.4} degrees\n"))
}

fn run_quantify(args: QuantifyArgs) -> Result<String, CliError> {
    let source = std::fs::read_to_string(&args.request)
        .with_context(|| format!("failed to read request '{}'", args.request.display()))?;
    let request: QuantifyRequest = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse request '{}'", args.request.display()))?;

    let absorption = request.absorption_correction.as_deref();
    let response = match args.method {
        QuantifyMethod::CliffLorimer => {
            let composition = quantification_cliff_lorimer(
                &request.intensities,
                &request.factors,
                absorption,
                request.mask.as_deref(),
            )
            .map_err(invalid)?;
            QuantifyResponse {
                method: "cliff-lorimer",
                composition,
                mass_thickness: None,
                number_of_atoms: None,
            }
        }
        QuantifyMethod::ZetaFactor => {
            let dose = request
                .dose
                .ok_or_else(|| CliError::Invalid("the zeta-factor method requires 'dose'".into()))?;
            let (composition, mass_thickness) =
                quantification_zeta_factor(&request.intensities, &request.factors, dose, absorption)
                    .map_err(invalid)?;
            QuantifyResponse {
                method: "zeta-factor",
                composition,
                mass_thickness: Some(mass_thickness),
                number_of_atoms: None,
            }
        }
        QuantifyMethod::CrossSection => {
            let dose = request.dose.ok_or_else(|| {
                CliError::Invalid("the cross-section method requires 'dose'".into())
            })?;
            let (composition, number_of_atoms) = quantification_cross_section(
                &request.intensities,
                &request.factors,
                dose,
                absorption,
            )
            .map_err(invalid)?;
            QuantifyResponse {
                method: "cross-section",
                composition,
                mass_thickness: None,
                number_of_atoms: Some(number_of_atoms),
            }
        }
    };

    let mut rendered = serde_json::to_string_pretty(&response).context("failed to render")?;
    rendered.push('\n');
    Ok(rendered)
}
