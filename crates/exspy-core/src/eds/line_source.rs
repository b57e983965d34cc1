//! Optional external cross-reference source for X-ray line energies.
//!
//! An external table (JSON on disk, `{"Fe": {"Ka": 6.4039, ...}, ...}` in
//! keV) can be preferred over the bundled database. When the table lacks
//! the requested line, or no table is configured where one was requested,
//! the bundled value is used and a warning is logged. This is the only
//! fallback path in the crate; it is advisory, not an error.

use crate::database::{DatabaseResult, ElementDatabase, XrayLineId};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub type LineSourceResult<T> = Result<T, LineSourceError>;

#[derive(Debug, thiserror::Error)]
pub enum LineSourceError {
    #[error("failed to read external line table '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse external line table '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Where to resolve a line energy from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnergySource {
    /// The bundled reference database only.
    #[default]
    Bundled,
    /// Prefer the configured external table, falling back to the bundled
    /// database per line.
    External,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
struct ExternalTableData {
    elements: BTreeMap<String, BTreeMap<String, f64>>,
}

/// External line-energy table loaded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct ExternalLineTable {
    data: ExternalTableData,
}

impl ExternalLineTable {
    pub fn from_json_path(path: impl AsRef<Path>) -> LineSourceResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LineSourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let data = serde_json::from_str(&source).map_err(|source| LineSourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { data })
    }

    pub fn line_energy_kev(&self, line: &XrayLineId) -> Option<f64> {
        self.data
            .elements
            .get(&line.element)
            .and_then(|lines| lines.get(&line.line))
            .copied()
    }
}

/// Resolve a line energy in keV honouring the source preference.
///
/// With [`LineEnergySource::External`], a missing table or a line absent
/// from it falls back to the bundled database with a visible warning; an
/// element/line unknown to both is still an error.
pub fn resolve_line_energy(
    identifier: &str,
    source: LineEnergySource,
    external: Option<&ExternalLineTable>,
) -> DatabaseResult<f64> {
    let line = XrayLineId::parse(identifier)?;
    if source == LineEnergySource::External {
        match external.and_then(|table| table.line_energy_kev(&line)) {
            Some(energy) => return Ok(energy),
            None => {
                if external.is_some() {
                    warn!(
                        line = identifier,
                        "X-ray line not found in the external table, \
                         falling back to the bundled database"
                    );
                } else {
                    warn!(
                        line = identifier,
                        "no external line table configured, \
                         falling back to the bundled database"
                    );
                }
            }
        }
    }
    ElementDatabase::bundled().line_energy_kev(&line)
}

#[cfg(test)]
mod tests {
    use super::{resolve_line_energy, ExternalLineTable, LineEnergySource};
    use std::fs;
    use tempfile::TempDir;

    fn stage_table(contents: &str) -> (TempDir, ExternalLineTable) {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("lines.json");
        fs::write(&path, contents).expect("table written");
        let table = ExternalLineTable::from_json_path(&path).expect("table parsed");
        (temp, table)
    }

    #[test]
    fn external_table_takes_precedence_when_it_has_the_line() {
        let (_temp, table) = stage_table(r#"{"Fe": {"Ka": 6.404}}"#);
        let energy = resolve_line_energy("Fe_Ka", LineEnergySource::External, Some(&table))
            .expect("energy");
        assert_eq!(energy, 6.404);
    }

    #[test]
    fn missing_line_falls_back_to_the_bundled_value() {
        let (_temp, table) = stage_table(r#"{"Fe": {"Kb": 7.058}}"#);
        let energy = resolve_line_energy("Fe_Ka", LineEnergySource::External, Some(&table))
            .expect("energy");
        assert_eq!(energy, 6.4039);
    }

    #[test]
    fn missing_table_falls_back_to_the_bundled_value() {
        let energy =
            resolve_line_energy("Fe_Ka", LineEnergySource::External, None).expect("energy");
        assert_eq!(energy, 6.4039);
    }

    #[test]
    fn bundled_source_ignores_the_external_table() {
        let (_temp, table) = stage_table(r#"{"Fe": {"Ka": 6.404}}"#);
        let energy = resolve_line_energy("Fe_Ka", LineEnergySource::Bundled, Some(&table))
            .expect("energy");
        assert_eq!(energy, 6.4039);
    }

    #[test]
    fn unknown_line_is_still_an_error_after_fallback() {
        assert!(resolve_line_energy("Xx_Ka", LineEnergySource::External, None).is_err());
    }

    #[test]
    fn unreadable_and_malformed_tables_are_reported() {
        let temp = TempDir::new().expect("tempdir");
        assert!(ExternalLineTable::from_json_path(temp.path().join("absent.json")).is_err());

        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").expect("written");
        assert!(ExternalLineTable::from_json_path(&path).is_err());
    }
}
