//! Bundled element reference database.
//!
//! Static tables (general properties, X-ray lines, binding energies) are
//! compiled into the crate and indexed once on first access. Records are
//! immutable; iteration is in atomic-number order so downstream energy
//! searches break ties deterministically.

mod binding_energies;
mod general_properties;
mod xray_lines;

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use binding_energies::BINDING_ENERGY_TABLES;
use general_properties::GENERAL_PROPERTIES;
use xray_lines::XRAY_LINE_TABLES;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    #[error("unknown element symbol '{symbol}'")]
    UnknownElement { symbol: String },
    #[error("element '{element}' has no tabulated X-ray line '{line}'")]
    UnknownLine { element: String, line: String },
    #[error("element '{element}' has no tabulated binding energy for subshell '{subshell}'")]
    UnknownEdge { element: String, subshell: String },
    #[error("invalid X-ray line identifier '{identifier}'; expected '<element>_<line>' such as 'Fe_Ka'")]
    MalformedLineIdentifier { identifier: String },
    #[error("invalid edge identifier '{identifier}'; expected '<element>_<subshell>' such as 'O_K'")]
    MalformedEdgeIdentifier { identifier: String },
}

/// Practical importance of an ionization edge in core-loss work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeRelevance {
    Major,
    Minor,
}

impl Display for EdgeRelevance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XrayLine {
    pub label: &'static str,
    pub energy_kev: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingEnergy {
    pub subshell: &'static str,
    pub onset_energy_ev: f64,
    pub relevance: EdgeRelevance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecord {
    pub symbol: &'static str,
    pub name: &'static str,
    pub atomic_number: u32,
    pub atomic_weight: f64,
    pub density_g_cm3: Option<f64>,
    pub xray_lines: Vec<XrayLine>,
    pub binding_energies: Vec<BindingEnergy>,
}

impl ElementRecord {
    pub fn xray_line(&self, label: &str) -> Option<&XrayLine> {
        self.xray_lines.iter().find(|line| line.label == label)
    }

    pub fn binding_energy(&self, subshell: &str) -> Option<&BindingEnergy> {
        self.binding_energies
            .iter()
            .find(|edge| edge.subshell == subshell)
    }
}

/// Parsed `"Fe_Ka"`-style X-ray line identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XrayLineId {
    pub element: String,
    pub line: String,
}

impl XrayLineId {
    /// Split at the first underscore; the line label may itself contain
    /// underscores-free composite names such as `M2N4`.
    pub fn parse(identifier: &str) -> DatabaseResult<Self> {
        let (element, line) = identifier.split_once('_').ok_or_else(|| {
            DatabaseError::MalformedLineIdentifier {
                identifier: identifier.to_string(),
            }
        })?;
        if element.is_empty() || line.is_empty() {
            return Err(DatabaseError::MalformedLineIdentifier {
                identifier: identifier.to_string(),
            });
        }
        Ok(Self {
            element: element.to_string(),
            line: line.to_string(),
        })
    }

    /// Family prefix, e.g. `"Fe_Ka"` -> `"Fe_K"`.
    pub fn family(&self) -> String {
        let shell = self.line.chars().next().map(String::from).unwrap_or_default();
        format!("{}_{}", self.element, shell)
    }
}

impl Display for XrayLineId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.element, self.line)
    }
}

/// Parsed `"O_K"`-style ionization edge identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeId {
    pub element: String,
    pub subshell: String,
}

impl EdgeId {
    pub fn parse(identifier: &str) -> DatabaseResult<Self> {
        let (element, subshell) = identifier.split_once('_').ok_or_else(|| {
            DatabaseError::MalformedEdgeIdentifier {
                identifier: identifier.to_string(),
            }
        })?;
        if element.is_empty() || subshell.is_empty() {
            return Err(DatabaseError::MalformedEdgeIdentifier {
                identifier: identifier.to_string(),
            });
        }
        Ok(Self {
            element: element.to_string(),
            subshell: subshell.to_string(),
        })
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.element, self.subshell)
    }
}

pub struct ElementDatabase {
    records: Vec<ElementRecord>,
    index: HashMap<&'static str, usize>,
}

impl ElementDatabase {
    /// The bundled database, assembled once from the static tables.
    pub fn bundled() -> &'static ElementDatabase {
        static DATABASE: OnceLock<ElementDatabase> = OnceLock::new();
        DATABASE.get_or_init(ElementDatabase::assemble)
    }

    fn assemble() -> Self {
        let line_tables: HashMap<&str, &[(&'static str, f64, f64)]> =
            XRAY_LINE_TABLES.iter().copied().collect();
        let edge_tables: HashMap<&str, &[(&'static str, f64, EdgeRelevance)]> =
            BINDING_ENERGY_TABLES.iter().copied().collect();

        let mut records = Vec::with_capacity(GENERAL_PROPERTIES.len());
        let mut index = HashMap::with_capacity(GENERAL_PROPERTIES.len());
        for (symbol, name, atomic_number, atomic_weight, density) in GENERAL_PROPERTIES {
            let xray_lines = line_tables
                .get(symbol)
                .map(|lines| {
                    lines
                        .iter()
                        .map(|(label, energy_kev, weight)| XrayLine {
                            label: *label,
                            energy_kev: *energy_kev,
                            weight: *weight,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let binding_energies = edge_tables
                .get(symbol)
                .map(|edges| {
                    edges
                        .iter()
                        .map(|(subshell, onset_energy_ev, relevance)| BindingEnergy {
                            subshell: *subshell,
                            onset_energy_ev: *onset_energy_ev,
                            relevance: *relevance,
                        })
                        .collect()
                })
                .unwrap_or_default();

            index.insert(*symbol, records.len());
            records.push(ElementRecord {
                symbol: *symbol,
                name: *name,
                atomic_number: *atomic_number,
                atomic_weight: *atomic_weight,
                density_g_cm3: *density,
                xray_lines,
                binding_energies,
            });
        }

        Self { records, index }
    }

    pub fn get(&self, symbol: &str) -> DatabaseResult<&ElementRecord> {
        self.index
            .get(symbol)
            .map(|position| &self.records[*position])
            .ok_or_else(|| DatabaseError::UnknownElement {
                symbol: symbol.to_string(),
            })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Records in atomic-number order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementRecord> {
        self.records.iter()
    }

    pub fn symbol_for_atomic_number(&self, atomic_number: u32) -> Option<&'static str> {
        self.records
            .iter()
            .find(|record| record.atomic_number == atomic_number)
            .map(|record| record.symbol)
    }

    /// Tabulated energy in keV for an `"X_Y"` line identifier.
    pub fn line_energy_kev(&self, line: &XrayLineId) -> DatabaseResult<f64> {
        let record = self.get(&line.element)?;
        record
            .xray_line(&line.line)
            .map(|entry| entry.energy_kev)
            .ok_or_else(|| DatabaseError::UnknownLine {
                element: line.element.clone(),
                line: line.line.clone(),
            })
    }

    /// Tabulated edge record for an `"X_Subshell"` identifier.
    pub fn binding_energy(&self, edge: &EdgeId) -> DatabaseResult<&BindingEnergy> {
        let record = self.get(&edge.element)?;
        record
            .binding_energy(&edge.subshell)
            .ok_or_else(|| DatabaseError::UnknownEdge {
                element: edge.element.clone(),
                subshell: edge.subshell.clone(),
            })
    }
}
