use std::collections::HashMap;

use lazy_static::lazy_static;

/// Element symbols indexed by atomic number. Slot 0 is unused and the last
/// slot is the `Zz` placeholder for unknown atoms.
pub const ELEMENTS: [&str; 120] = [
    "",
    "H", "He",
    "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar",
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr",
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te", "I", "Xe",
    "Cs", "Ba", "La",
    "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu",
    "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    "Fr", "Ra", "Ac",
    "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No",
    "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
    "Zz",
];

/// Atomic number used for the `Zz` placeholder.
pub const UNKNOWN_ATOMIC_NUMBER: u32 = ELEMENTS.len() as u32 - 1;

/// Standard atomic weights rounded to whole mass units, indexed by atomic
/// number. Elements without a stable isotope use their longest-lived one.
const ROUNDED_MASSES: [u16; 119] = [
    0,
    1, 4,
    7, 9, 11, 12, 14, 16, 19, 20,
    23, 24, 27, 28, 31, 32, 35, 40,
    39, 40, 45, 48, 51, 52, 55, 56, 59, 59, 64, 65, 70, 73, 75, 79, 80, 84,
    85, 88, 89, 91, 93, 96, 97, 101, 103, 106, 108, 112, 115, 119, 122, 128, 127, 131,
    133, 137, 139,
    140, 141, 144, 145, 150, 152, 157, 159, 162, 165, 167, 169, 173, 175,
    178, 181, 184, 186, 190, 192, 195, 197, 201, 204, 207, 209, 209, 210, 222,
    223, 226, 227,
    232, 231, 238, 237, 244, 243, 247, 247, 251, 252, 257, 258, 259,
    266, 267, 268, 269, 270, 277, 278, 281, 282, 285, 286, 289, 290, 293, 294, 294,
];

pub const HYDROGEN: u32 = 1;
pub const CARBON: u32 = 6;

lazy_static! {
    static ref SYMBOL_TO_NUMBER: HashMap<&'static str, u32> = {
        let mut map = HashMap::new();
        for (number, symbol) in ELEMENTS.iter().enumerate().skip(1) {
            map.insert(*symbol, number as u32);
        }
        // Deuterium and tritium are stored as hydrogen.
        map.insert("D", HYDROGEN);
        map.insert("T", HYDROGEN);
        map
    };
}

/// Looks up the atomic number for an element symbol. Symbols are case
/// sensitive, as in connection tables.
pub fn atomic_number(symbol: &str) -> Option<u32> {
    SYMBOL_TO_NUMBER.get(symbol).copied()
}

/// Looks up the symbol for an atomic number in `1..=UNKNOWN_ATOMIC_NUMBER`.
pub fn element_symbol(atomic_number: u32) -> Option<&'static str> {
    match atomic_number {
        0 => None,
        n => ELEMENTS.get(n as usize).copied(),
    }
}

/// The standard atomic weight of an element rounded to a whole mass
/// number. `None` for the `Zz` placeholder.
pub fn rounded_mass(atomic_number: u32) -> Option<i32> {
    match atomic_number {
        0 => None,
        n => ROUNDED_MASSES.get(n as usize).map(|&mass| i32::from(mass)),
    }
}

pub fn is_valid_atomic_number(atomic_number: i64) -> bool {
    (1..=UNKNOWN_ATOMIC_NUMBER as i64).contains(&atomic_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(atomic_number("C"), Some(6));
        assert_eq!(atomic_number("Cl"), Some(17));
        assert_eq!(atomic_number("Og"), Some(118));
        assert_eq!(atomic_number("Zz"), Some(UNKNOWN_ATOMIC_NUMBER));
        assert_eq!(atomic_number("cl"), None);
        assert_eq!(atomic_number(""), None);
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn test_hydrogen_aliases() {
        assert_eq!(atomic_number("H"), Some(HYDROGEN));
        assert_eq!(atomic_number("D"), Some(HYDROGEN));
        assert_eq!(atomic_number("T"), Some(HYDROGEN));
        // Aliases never come back out of the reverse lookup.
        assert_eq!(element_symbol(1), Some("H"));
    }

    #[test]
    fn test_number_lookup() {
        assert_eq!(element_symbol(0), None);
        assert_eq!(element_symbol(8), Some("O"));
        assert_eq!(element_symbol(UNKNOWN_ATOMIC_NUMBER), Some("Zz"));
        assert_eq!(element_symbol(UNKNOWN_ATOMIC_NUMBER + 1), None);
        assert!(is_valid_atomic_number(119));
        assert!(!is_valid_atomic_number(120));
        assert!(!is_valid_atomic_number(0));
    }

    #[test]
    fn test_rounded_mass() {
        assert_eq!(rounded_mass(HYDROGEN), Some(1));
        assert_eq!(rounded_mass(CARBON), Some(12));
        assert_eq!(rounded_mass(17), Some(35));
        assert_eq!(rounded_mass(118), Some(294));
        assert_eq!(rounded_mass(0), None);
        assert_eq!(rounded_mass(UNKNOWN_ATOMIC_NUMBER), None);
    }
}
