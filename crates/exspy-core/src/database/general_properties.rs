//! General and physical element properties.
//!
//! Atomic weights follow the IUPAC standard values; densities are
//! room-temperature values in g/cm^3 (gas densities for the gaseous
//! elements). Elements without a tabulated density carry `None`.

/// `(symbol, name, Z, atomic weight, density g/cm^3)`
pub(crate) const GENERAL_PROPERTIES: &[(&str, &str, u32, f64, Option<f64>)] = &[
    ("H", "hydrogen", 1, 1.008, Some(0.0000899)),
    ("He", "helium", 2, 4.0026, Some(0.0001785)),
    ("Li", "lithium", 3, 6.94, Some(0.534)),
    ("Be", "beryllium", 4, 9.0122, Some(1.85)),
    ("B", "boron", 5, 10.81, Some(2.34)),
    ("C", "carbon", 6, 12.011, Some(2.26)),
    ("N", "nitrogen", 7, 14.007, Some(0.0012506)),
    ("O", "oxygen", 8, 15.999, Some(0.001429)),
    ("F", "fluorine", 9, 18.998, Some(0.001696)),
    ("Ne", "neon", 10, 20.18, Some(0.0008999)),
    ("Na", "sodium", 11, 22.9898, Some(0.971)),
    ("Mg", "magnesium", 12, 24.305, Some(1.738)),
    ("Al", "aluminium", 13, 26.9815, Some(2.6989)),
    ("Si", "silicon", 14, 28.0855, Some(2.33)),
    ("P", "phosphorus", 15, 30.9738, Some(1.82)),
    ("S", "sulfur", 16, 32.065, Some(2.067)),
    ("Cl", "chlorine", 17, 35.453, Some(0.003214)),
    ("Ar", "argon", 18, 39.948, Some(0.0017837)),
    ("K", "potassium", 19, 39.0983, Some(0.862)),
    ("Ca", "calcium", 20, 40.078, Some(1.55)),
    ("Sc", "scandium", 21, 44.9559, Some(2.989)),
    ("Ti", "titanium", 22, 47.867, Some(4.54)),
    ("V", "vanadium", 23, 50.9415, Some(6.11)),
    ("Cr", "chromium", 24, 51.9961, Some(7.19)),
    ("Mn", "manganese", 25, 54.938, Some(7.44)),
    ("Fe", "iron", 26, 55.845, Some(7.874)),
    ("Co", "cobalt", 27, 58.9332, Some(8.9)),
    ("Ni", "nickel", 28, 58.6934, Some(8.902)),
    ("Cu", "copper", 29, 63.546, Some(8.92)),
    ("Zn", "zinc", 30, 65.38, Some(7.133)),
    ("Ga", "gallium", 31, 69.723, Some(5.904)),
    ("Ge", "germanium", 32, 72.64, Some(5.323)),
    ("As", "arsenic", 33, 74.9216, Some(5.73)),
    ("Se", "selenium", 34, 78.96, Some(4.79)),
    ("Br", "bromine", 35, 79.904, Some(3.12)),
    ("Kr", "krypton", 36, 83.798, Some(0.003733)),
    ("Rb", "rubidium", 37, 85.4678, Some(1.532)),
    ("Sr", "strontium", 38, 87.62, Some(2.54)),
    ("Y", "yttrium", 39, 88.9059, Some(4.469)),
    ("Zr", "zirconium", 40, 91.224, Some(6.506)),
    ("Nb", "niobium", 41, 92.9064, Some(8.57)),
    ("Mo", "molybdenum", 42, 95.96, Some(10.22)),
    ("Tc", "technetium", 43, 98.0, Some(11.5)),
    ("Ru", "ruthenium", 44, 101.07, Some(12.41)),
    ("Rh", "rhodium", 45, 102.9055, Some(12.41)),
    ("Pd", "palladium", 46, 106.42, Some(12.02)),
    ("Ag", "silver", 47, 107.8682, Some(10.5)),
    ("Cd", "cadmium", 48, 112.411, Some(8.65)),
    ("In", "indium", 49, 114.818, Some(7.31)),
    ("Sn", "tin", 50, 118.71, Some(7.31)),
    ("Sb", "antimony", 51, 121.76, Some(6.691)),
    ("Te", "tellurium", 52, 127.6, Some(6.24)),
    ("I", "iodine", 53, 126.9045, Some(4.93)),
    ("Xe", "xenon", 54, 131.293, Some(0.005887)),
    ("Cs", "caesium", 55, 132.9055, Some(1.873)),
    ("Ba", "barium", 56, 137.327, Some(3.594)),
    ("La", "lanthanum", 57, 138.9055, Some(6.145)),
    ("Ce", "cerium", 58, 140.116, Some(6.77)),
    ("Pr", "praseodymium", 59, 140.9077, Some(6.773)),
    ("Nd", "neodymium", 60, 144.242, Some(7.008)),
    ("Pm", "promethium", 61, 145.0, Some(7.264)),
    ("Sm", "samarium", 62, 150.36, Some(7.52)),
    ("Eu", "europium", 63, 151.964, Some(5.244)),
    ("Gd", "gadolinium", 64, 157.25, Some(7.901)),
    ("Tb", "terbium", 65, 158.9254, Some(8.23)),
    ("Dy", "dysprosium", 66, 162.5, Some(8.551)),
    ("Ho", "holmium", 67, 164.9303, Some(8.795)),
    ("Er", "erbium", 68, 167.259, Some(9.066)),
    ("Tm", "thulium", 69, 168.9342, Some(9.321)),
    ("Yb", "ytterbium", 70, 173.054, Some(6.966)),
    ("Lu", "lutetium", 71, 174.9668, Some(9.841)),
    ("Hf", "hafnium", 72, 178.49, Some(13.31)),
    ("Ta", "tantalum", 73, 180.9479, Some(16.654)),
    ("W", "tungsten", 74, 183.84, Some(19.3)),
    ("Re", "rhenium", 75, 186.207, Some(21.02)),
    ("Os", "osmium", 76, 190.23, Some(22.57)),
    ("Ir", "iridium", 77, 192.217, Some(22.42)),
    ("Pt", "platinum", 78, 195.084, Some(21.45)),
    ("Au", "gold", 79, 196.9666, Some(19.3)),
    ("Hg", "mercury", 80, 200.59, Some(13.546)),
    ("Tl", "thallium", 81, 204.3833, Some(11.85)),
    ("Pb", "lead", 82, 207.2, Some(11.35)),
    ("Bi", "bismuth", 83, 208.9804, Some(9.747)),
    ("Po", "polonium", 84, 209.0, Some(9.32)),
    ("At", "astatine", 85, 210.0, None),
    ("Rn", "radon", 86, 222.0, Some(0.00973)),
    ("Fr", "francium", 87, 223.0, None),
    ("Ra", "radium", 88, 226.0, Some(5.0)),
    ("Ac", "actinium", 89, 227.0, Some(10.07)),
    ("Th", "thorium", 90, 232.0381, Some(11.72)),
    ("Pa", "protactinium", 91, 231.0359, Some(15.37)),
    ("U", "uranium", 92, 238.0289, Some(18.95)),
    ("Np", "neptunium", 93, 237.0, Some(20.25)),
    ("Pu", "plutonium", 94, 244.0, Some(19.84)),
    ("Am", "americium", 95, 243.0, Some(13.69)),
    ("Cm", "curium", 96, 247.0, Some(13.51)),
];

#[cfg(test)]
mod tests {
    use super::GENERAL_PROPERTIES;

    #[test]
    fn table_is_sorted_by_atomic_number_without_gaps() {
        for (index, (_, _, z, _, _)) in GENERAL_PROPERTIES.iter().enumerate() {
            assert_eq!(*z as usize, index + 1);
        }
    }

    #[test]
    fn weights_and_densities_are_positive() {
        for (symbol, _, _, weight, density) in GENERAL_PROPERTIES {
            assert!(*weight > 0.0, "{symbol} weight");
            if let Some(density) = density {
                assert!(*density > 0.0, "{symbol} density");
            }
        }
    }
}
