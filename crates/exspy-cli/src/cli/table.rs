//! ASCII table rendering for the lookup commands.

use exspy_core::database::EdgeRelevance;
use exspy_core::eds::{ElementLines, NearbyLine};
use exspy_core::eels::NearbyEdge;

use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Energy (keV)")]
    energy: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Intensity")]
    intensity: String,
}

#[derive(Tabled)]
struct EdgeRow {
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Edge")]
    edge: String,
    #[tabled(rename = "Onset (eV)")]
    onset: String,
    #[tabled(rename = "Relevance")]
    relevance: String,
}

fn weight_bar(weight: f64) -> String {
    "#".repeat((weight * 10.0) as usize)
}

fn render<R: Tabled>(rows: Vec<R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::ascii());
    format!("{table}\n")
}

/// Per-element line listing; the element symbol is shown on its first row
/// only.
pub(crate) fn element_lines_table(elements: &[ElementLines]) -> String {
    let mut rows = Vec::new();
    for entry in elements {
        for (index, line) in entry.lines.iter().enumerate() {
            rows.push(LineRow {
                element: if index == 0 {
                    entry.element.to_string()
                } else {
                    String::new()
                },
                line: line.label.to_string(),
                energy: format!("{:.2}", line.energy_kev),
                weight: format!("{:.2}", line.weight),
                intensity: weight_bar(line.weight),
            });
        }
    }
    render(rows)
}

/// Window-search listing sorted by energy.
pub(crate) fn nearby_lines_table(lines: &[NearbyLine]) -> String {
    let mut sorted: Vec<&NearbyLine> = lines.iter().collect();
    sorted.sort_by(|a, b| a.energy_kev.total_cmp(&b.energy_kev));
    let rows: Vec<LineRow> = sorted
        .iter()
        .map(|line| LineRow {
            element: line.element.to_string(),
            line: line.line.to_string(),
            energy: format!("{:.2}", line.energy_kev),
            weight: format!("{:.2}", line.weight),
            intensity: weight_bar(line.weight),
        })
        .collect();
    render(rows)
}

pub(crate) fn nearby_edges_table(edges: &[NearbyEdge]) -> String {
    let rows: Vec<EdgeRow> = edges
        .iter()
        .map(|edge| EdgeRow {
            element: edge.element.to_string(),
            edge: edge.subshell.to_string(),
            onset: format!("{:.1}", edge.onset_energy_ev),
            relevance: match edge.relevance {
                EdgeRelevance::Major => "Major".to_string(),
                EdgeRelevance::Minor => "Minor".to_string(),
            },
        })
        .collect();
    render(rows)
}
