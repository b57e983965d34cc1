//! Electron binding energies (EELS ionization edge onsets).
//!
//! Onset energies are in eV. The relevance flag separates the edges that
//! dominate practical core-loss work from the weak or rarely used ones.

use super::EdgeRelevance;

use EdgeRelevance::{Major, Minor};

/// `(symbol, [(subshell, onset energy eV, relevance)])`
pub(crate) const BINDING_ENERGY_TABLES: &[(&str, &[(&str, f64, EdgeRelevance)])] = &[
    ("B", &[("K", 188.0, Major)]),
    ("C", &[("K", 284.0, Major)]),
    ("N", &[("K", 401.0, Major)]),
    ("O", &[("K", 532.0, Major)]),
    ("F", &[("K", 685.0, Major)]),
    ("Ne", &[("K", 867.0, Major)]),
    ("Na", &[("K", 1072.0, Major), ("L3", 31.0, Minor)]),
    ("Mg", &[("K", 1305.0, Major), ("L3", 51.0, Minor)]),
    ("Al", &[("K", 1560.0, Major), ("L3", 73.0, Minor)]),
    (
        "Si",
        &[("K", 1839.0, Major), ("L3", 99.8, Major), ("L1", 149.7, Minor)],
    ),
    ("P", &[("K", 2146.0, Major), ("L3", 132.2, Major)]),
    ("S", &[("K", 2472.0, Major), ("L3", 164.8, Major)]),
    ("Cl", &[("K", 2822.0, Major), ("L3", 200.0, Major)]),
    ("Ar", &[("L3", 245.0, Major), ("K", 3206.0, Minor)]),
    (
        "K",
        &[
            ("L3", 294.0, Major),
            ("L2", 296.0, Major),
            ("L1", 377.0, Minor),
            ("K", 3607.0, Minor),
        ],
    ),
    (
        "Ca",
        &[
            ("L3", 346.0, Major),
            ("L2", 350.0, Major),
            ("L1", 438.0, Minor),
            ("K", 4038.0, Minor),
        ],
    ),
    (
        "Ti",
        &[
            ("L3", 456.0, Major),
            ("L2", 462.0, Major),
            ("L1", 564.0, Minor),
            ("K", 4966.0, Minor),
        ],
    ),
    (
        "V",
        &[
            ("L3", 513.0, Major),
            ("L2", 521.0, Major),
            ("L1", 628.0, Minor),
            ("K", 5465.0, Minor),
        ],
    ),
    (
        "Cr",
        &[
            ("L3", 575.0, Major),
            ("L2", 584.0, Major),
            ("L1", 695.0, Minor),
            ("K", 5989.0, Minor),
        ],
    ),
    (
        "Mn",
        &[
            ("L3", 640.0, Major),
            ("L2", 651.0, Major),
            ("L1", 769.0, Minor),
            ("K", 6539.0, Minor),
        ],
    ),
    (
        "Fe",
        &[
            ("L3", 708.0, Major),
            ("L2", 721.0, Major),
            ("L1", 846.0, Minor),
            ("K", 7112.0, Minor),
        ],
    ),
    (
        "Co",
        &[
            ("L3", 779.0, Major),
            ("L2", 794.0, Major),
            ("L1", 926.0, Minor),
            ("K", 7709.0, Minor),
        ],
    ),
    (
        "Ni",
        &[
            ("L3", 855.0, Major),
            ("L2", 872.0, Major),
            ("L1", 1008.0, Minor),
            ("K", 8333.0, Minor),
        ],
    ),
    (
        "Cu",
        &[
            ("L3", 931.0, Major),
            ("L2", 951.0, Major),
            ("L1", 1096.0, Minor),
            ("K", 8979.0, Minor),
        ],
    ),
    ("Zn", &[("L3", 1020.0, Major), ("L2", 1043.0, Major), ("K", 9659.0, Minor)]),
    ("Ga", &[("L3", 1115.0, Major), ("L2", 1142.0, Major), ("K", 10367.0, Minor)]),
    ("Ge", &[("L3", 1217.0, Major), ("L2", 1248.0, Major), ("K", 11103.0, Minor)]),
    (
        "Ag",
        &[
            ("M5", 367.0, Major),
            ("M4", 373.0, Major),
            ("M3", 571.0, Minor),
            ("M2", 602.0, Minor),
            ("L3", 3351.0, Major),
        ],
    ),
    (
        "Cd",
        &[
            ("M5", 404.0, Major),
            ("M4", 411.0, Major),
            ("M3", 616.0, Minor),
            ("M2", 651.0, Minor),
            ("L3", 3538.0, Major),
        ],
    ),
    (
        "In",
        &[
            ("M5", 443.0, Major),
            ("M4", 451.0, Major),
            ("M3", 664.0, Minor),
            ("L3", 3730.0, Major),
        ],
    ),
    (
        "Sn",
        &[
            ("M5", 485.0, Major),
            ("M4", 494.0, Major),
            ("M3", 714.0, Minor),
            ("L3", 3929.0, Major),
        ],
    ),
    (
        "I",
        &[
            ("M5", 619.0, Major),
            ("M4", 631.0, Major),
            ("M3", 875.0, Minor),
            ("L3", 4557.0, Major),
        ],
    ),
    ("Xe", &[("M5", 672.0, Major), ("M4", 686.0, Major), ("L3", 4786.0, Minor)]),
    ("Cs", &[("M5", 726.0, Major), ("M4", 740.0, Major), ("L3", 5012.0, Major)]),
    ("Ba", &[("M5", 781.0, Major), ("M4", 796.0, Major), ("L3", 5247.0, Major)]),
    ("La", &[("M5", 832.0, Major), ("M4", 849.0, Major)]),
    ("Ce", &[("M5", 883.0, Major), ("M4", 901.0, Major)]),
    ("Gd", &[("M5", 1185.0, Major), ("M4", 1217.0, Major)]),
    ("Dy", &[("M5", 1295.0, Major), ("M4", 1332.0, Major)]),
    ("Ta", &[("M5", 1735.0, Major), ("M4", 1793.0, Major)]),
    ("W", &[("M5", 1809.0, Major), ("M4", 1872.0, Major)]),
    ("Pt", &[("M5", 2122.0, Major), ("M4", 2202.0, Major)]),
    ("Au", &[("M5", 2206.0, Major), ("M4", 2291.0, Major)]),
    ("Pb", &[("M5", 2484.0, Major), ("M4", 2586.0, Major)]),
    ("Th", &[("M5", 3332.0, Major), ("M4", 3491.0, Major)]),
    ("U", &[("M5", 3552.0, Major), ("M4", 3728.0, Major)]),
];

#[cfg(test)]
mod tests {
    use super::BINDING_ENERGY_TABLES;

    #[test]
    fn onsets_are_positive() {
        for (symbol, edges) in BINDING_ENERGY_TABLES {
            assert!(!edges.is_empty(), "{symbol} has no edges");
            for (subshell, onset, _) in *edges {
                assert!(*onset > 0.0, "{symbol}_{subshell} onset");
            }
        }
    }
}
