//! Isotope notation parsing for primary-particle names.
//!
//! Accepted forms are symbol-first (`Th232`, `U-238`, `K 40`, `co_60`) and
//! mass-first (`238U`, `232-Th`), with an optional trailing metastable
//! marker on symbol-first names (`Tc99m`). Anything else is a custom source
//! label and fails with [`IsotopeParseError`].

use super::elements::{atomic_number_for_symbol, element_symbol};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MAX_MASS_NUMBER: u32 = 300;
const SEPARATORS: [char; 3] = ['-', '_', ' '];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsotopeId {
    proton_count: u32,
    mass_number: u32,
    metastable: bool,
}

impl IsotopeId {
    pub fn new(proton_count: u32, mass_number: u32) -> Option<Self> {
        element_symbol(proton_count)?;
        if mass_number < proton_count || mass_number > MAX_MASS_NUMBER {
            return None;
        }
        Some(Self {
            proton_count,
            mass_number,
            metastable: false,
        })
    }

    pub const fn z(&self) -> u32 {
        self.proton_count
    }

    pub const fn a(&self) -> u32 {
        self.mass_number
    }

    pub const fn is_metastable(&self) -> bool {
        self.metastable
    }

    pub fn symbol(&self) -> &'static str {
        element_symbol(self.proton_count).unwrap_or("?")
    }

    /// Canonical corpus key, `"{Z}-{A}"`.
    pub fn key(&self) -> String {
        self.format("{Z}-{A}")
    }

    /// Expands `{Z}`, `{A}` and `{symbol}` in `template`.
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{Z}", &self.proton_count.to_string())
            .replace("{A}", &self.mass_number.to_string())
            .replace("{symbol}", self.symbol())
    }
}

impl Display for IsotopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.symbol(), self.mass_number)?;
        if self.metastable {
            f.write_str("m")?;
        }
        Ok(())
    }
}

impl FromStr for IsotopeId {
    type Err = IsotopeParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        parse_isotope(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IsotopeParseError {
    #[error("isotope name is empty")]
    Empty,
    #[error("'{name}' does not follow isotope notation")]
    Notation { name: String },
    #[error("unknown element symbol '{symbol}' in '{name}'")]
    UnknownElement { name: String, symbol: String },
    #[error("mass number {mass_number} is implausible for Z={proton_count} in '{name}'")]
    ImplausibleMass {
        name: String,
        proton_count: u32,
        mass_number: u32,
    },
}

pub fn parse_isotope(name: &str) -> Result<IsotopeId, IsotopeParseError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(IsotopeParseError::Empty);
    }
    let notation = || IsotopeParseError::Notation {
        name: trimmed.to_string(),
    };

    let (body, metastable) = split_metastable(trimmed);
    let (symbol, mass) = split_symbol_and_mass(body).ok_or_else(notation)?;
    let mass_number: u32 = mass.parse().map_err(|_| notation())?;
    let proton_count =
        atomic_number_for_symbol(symbol).ok_or_else(|| IsotopeParseError::UnknownElement {
            name: trimmed.to_string(),
            symbol: symbol.to_string(),
        })?;

    let isotope = IsotopeId::new(proton_count, mass_number).ok_or_else(|| {
        IsotopeParseError::ImplausibleMass {
            name: trimmed.to_string(),
            proton_count,
            mass_number,
        }
    })?;
    Ok(IsotopeId {
        metastable,
        ..isotope
    })
}

fn split_metastable(name: &str) -> (&str, bool) {
    let mut chars = name.chars().rev();
    match (chars.next(), chars.next()) {
        (Some('m' | 'M'), Some(previous)) if previous.is_ascii_digit() => {
            (&name[..name.len() - 1], true)
        }
        _ => (name, false),
    }
}

fn split_symbol_and_mass(body: &str) -> Option<(&str, &str)> {
    let first = body.chars().next()?;
    let (symbol, mass) = if first.is_ascii_alphabetic() {
        let split = body.find(|c: char| !c.is_ascii_alphabetic())?;
        let (symbol, rest) = body.split_at(split);
        (symbol, strip_separator(rest))
    } else if first.is_ascii_digit() {
        let split = body.find(|c: char| !c.is_ascii_digit())?;
        let (mass, rest) = body.split_at(split);
        (strip_separator(rest), mass)
    } else {
        return None;
    };

    let symbol_ok =
        (1..=2).contains(&symbol.len()) && symbol.chars().all(|c| c.is_ascii_alphabetic());
    let mass_ok = !mass.is_empty() && mass.chars().all(|c| c.is_ascii_digit());
    (symbol_ok && mass_ok).then_some((symbol, mass))
}

fn strip_separator(text: &str) -> &str {
    text.strip_prefix(SEPARATORS).unwrap_or(text)
}
