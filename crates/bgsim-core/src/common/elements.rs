//! Periodic-table symbol lookups keyed by proton count.

pub const MAX_ATOMIC_NUMBER: u32 = 118;

const ELEMENT_SYMBOLS: [&str; MAX_ATOMIC_NUMBER as usize] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

pub fn element_symbol(atomic_number: u32) -> Option<&'static str> {
    let index = index_for_atomic_number(atomic_number)?;
    Some(ELEMENT_SYMBOLS[index])
}

pub fn atomic_number_for_symbol(symbol: &str) -> Option<u32> {
    let normalized = symbol.trim();
    if normalized.is_empty() {
        return None;
    }

    ELEMENT_SYMBOLS
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(normalized))
        .map(|index| index as u32 + 1)
}

const fn index_for_atomic_number(atomic_number: u32) -> Option<usize> {
    if atomic_number == 0 || atomic_number > MAX_ATOMIC_NUMBER {
        None
    } else {
        Some(atomic_number as usize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_ATOMIC_NUMBER, atomic_number_for_symbol, element_symbol};

    #[test]
    fn lookup_rejects_out_of_range_atomic_numbers() {
        assert!(element_symbol(0).is_none());
        assert!(element_symbol(MAX_ATOMIC_NUMBER + 1).is_none());
    }

    #[test]
    fn known_symbol_roundtrip_matches_atomic_number() {
        assert_eq!(atomic_number_for_symbol("Th"), Some(90));
        assert_eq!(atomic_number_for_symbol("th"), Some(90));
        assert_eq!(atomic_number_for_symbol(" U "), Some(92));
        assert_eq!(atomic_number_for_symbol("K"), Some(19));
        assert_eq!(element_symbol(27), Some("Co"));
        assert_eq!(element_symbol(118), Some("Og"));
        assert_eq!(atomic_number_for_symbol(""), None);
        assert_eq!(atomic_number_for_symbol("Xx"), None);
    }

    #[test]
    fn every_symbol_maps_back_to_its_index() {
        for atomic_number in 1..=MAX_ATOMIC_NUMBER {
            let symbol = element_symbol(atomic_number).expect("symbol");
            assert_eq!(atomic_number_for_symbol(symbol), Some(atomic_number));
        }
    }
}
