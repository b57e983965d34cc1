//! Ionization-edge searches over the bundled binding-energy tables.

use crate::database::{
    BindingEnergy, DatabaseResult, EdgeId, EdgeRelevance, ElementDatabase,
};

use std::str::FromStr;

pub type EdgeSearchResult<T> = Result<T, EdgeSearchError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EdgeSearchError {
    #[error("search width must be >= 0, got {width}")]
    NegativeWidth { width: f64 },
    #[error("order must be 'closest', 'ascending' or 'descending', got '{keyword}'")]
    UnknownOrder { keyword: String },
}

/// Sort order for [`get_edges_near_energy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeOrder {
    /// Smallest energy difference first.
    #[default]
    Closest,
    Ascending,
    Descending,
}

impl FromStr for EdgeOrder {
    type Err = EdgeSearchError;

    fn from_str(keyword: &str) -> EdgeSearchResult<Self> {
        match keyword {
            "closest" => Ok(Self::Closest),
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            _ => Err(EdgeSearchError::UnknownOrder {
                keyword: keyword.to_string(),
            }),
        }
    }
}

/// One edge returned by an energy-window search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyEdge {
    pub identifier: String,
    pub element: &'static str,
    pub subshell: &'static str,
    pub onset_energy_ev: f64,
    pub relevance: EdgeRelevance,
    pub distance_ev: f64,
}

/// All tabulated edges inside `[energy - width/2, energy + width/2]`,
/// sorted per `order`. Ties keep the atomic-number table order.
pub fn get_edges_near_energy(
    energy_ev: f64,
    width_ev: f64,
    only_major: bool,
    order: EdgeOrder,
) -> EdgeSearchResult<Vec<NearbyEdge>> {
    if width_ev < 0.0 {
        return Err(EdgeSearchError::NegativeWidth { width: width_ev });
    }
    let energy_min = energy_ev - width_ev / 2.0;
    let energy_max = energy_ev + width_ev / 2.0;

    let mut matches = Vec::new();
    for record in ElementDatabase::bundled().iter() {
        for edge in &record.binding_energies {
            if only_major && edge.relevance != EdgeRelevance::Major {
                continue;
            }
            if edge.onset_energy_ev >= energy_min && edge.onset_energy_ev <= energy_max {
                matches.push(NearbyEdge {
                    identifier: format!("{}_{}", record.symbol, edge.subshell),
                    element: record.symbol,
                    subshell: edge.subshell,
                    onset_energy_ev: edge.onset_energy_ev,
                    relevance: edge.relevance,
                    distance_ev: (edge.onset_energy_ev - energy_ev).abs(),
                });
            }
        }
    }
    match order {
        EdgeOrder::Closest => matches.sort_by(|a, b| a.distance_ev.total_cmp(&b.distance_ev)),
        EdgeOrder::Ascending => {
            matches.sort_by(|a, b| a.onset_energy_ev.total_cmp(&b.onset_energy_ev))
        }
        EdgeOrder::Descending => {
            matches.sort_by(|a, b| b.onset_energy_ev.total_cmp(&a.onset_energy_ev))
        }
    }
    Ok(matches)
}

/// Resolve `"X_Subshell"` identifiers to their tabulated edge records.
pub fn get_info_from_edges(identifiers: &[&str]) -> DatabaseResult<Vec<BindingEnergy>> {
    let database = ElementDatabase::bundled();
    identifiers
        .iter()
        .map(|identifier| {
            let edge = EdgeId::parse(identifier)?;
            database.binding_energy(&edge).copied()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        get_edges_near_energy, get_info_from_edges, EdgeOrder, EdgeSearchError,
    };
    use std::str::FromStr;

    fn identifiers(energy: f64, width: f64, only_major: bool, order: EdgeOrder) -> Vec<String> {
        get_edges_near_energy(energy, width, only_major, order)
            .expect("search")
            .into_iter()
            .map(|edge| edge.identifier)
            .collect()
    }

    #[test]
    fn zero_width_pins_a_single_edge() {
        let edges = identifiers(532.0, 0.0, false, EdgeOrder::Closest);
        assert_eq!(edges, vec!["O_K".to_string()]);
    }

    #[test]
    fn window_around_640_ev_sorted_by_distance() {
        let edges = identifiers(640.0, 100.0, false, EdgeOrder::Closest);
        assert_eq!(
            edges,
            vec![
                "Mn_L3", "I_M4", "Mn_L2", "Cd_M2", "V_L1", "I_M5", "Cd_M3", "In_M3", "Xe_M5",
                "Ag_M2", "F_K", "Xe_M4",
            ]
        );
    }

    #[test]
    fn window_around_640_ev_ascending_and_descending() {
        let ascending = identifiers(640.0, 100.0, false, EdgeOrder::Ascending);
        assert_eq!(
            ascending,
            vec![
                "Ag_M2", "Cd_M3", "I_M5", "V_L1", "I_M4", "Mn_L3", "Mn_L2", "Cd_M2", "In_M3",
                "Xe_M5", "F_K", "Xe_M4",
            ]
        );

        let descending = identifiers(640.0, 100.0, false, EdgeOrder::Descending);
        assert_eq!(
            descending,
            vec![
                "Xe_M4", "F_K", "Xe_M5", "In_M3", "Mn_L2", "Cd_M2", "Mn_L3", "I_M4", "V_L1",
                "I_M5", "Cd_M3", "Ag_M2",
            ]
        );
    }

    #[test]
    fn major_filter_drops_the_weak_edges() {
        let edges = identifiers(640.0, 100.0, true, EdgeOrder::Ascending);
        assert_eq!(
            edges,
            vec!["I_M5", "I_M4", "Mn_L3", "Mn_L2", "Xe_M5", "F_K", "Xe_M4"]
        );
    }

    #[test]
    fn invalid_inputs_are_validation_errors() {
        assert_eq!(
            get_edges_near_energy(849.0, -5.0, false, EdgeOrder::Closest)
                .expect_err("negative width"),
            EdgeSearchError::NegativeWidth { width: -5.0 }
        );
        assert_eq!(
            EdgeOrder::from_str("random").expect_err("unknown order"),
            EdgeSearchError::UnknownOrder {
                keyword: "random".to_string()
            }
        );
        assert_eq!(EdgeOrder::from_str("closest").expect("order"), EdgeOrder::Closest);
    }

    #[test]
    fn edge_info_resolves_each_identifier() {
        let info = get_info_from_edges(&["O_K", "N_K", "Cr_L3"]).expect("info");
        assert_eq!(info.len(), 3);
        assert_eq!(info[0].onset_energy_ev, 532.0);
        assert_eq!(info[2].onset_energy_ev, 575.0);

        assert!(get_info_from_edges(&["O_K", "NK"]).is_err());
        assert!(get_info_from_edges(&["O_L3"]).is_err());
    }
}
