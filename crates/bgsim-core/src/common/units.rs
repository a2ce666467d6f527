//! Unit handling for energies, masses and rate time bases.
//!
//! Energies are carried in keV internally; the other units only convert
//! configuration values into the scale factors the evaluators apply.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const SECONDS_PER_YEAR: f64 = 365.25 * SECONDS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "eV")]
    Ev,
    #[default]
    #[serde(rename = "keV")]
    Kev,
    #[serde(rename = "MeV")]
    Mev,
}

impl EnergyUnit {
    pub const fn kev_per_unit(self) -> f64 {
        match self {
            Self::Ev => 1.0e-3,
            Self::Kev => 1.0,
            Self::Mev => 1.0e3,
        }
    }

    pub fn to_kev(self, value: f64) -> f64 {
        value * self.kev_per_unit()
    }

    pub fn from_kev(self, value: f64) -> f64 {
        value / self.kev_per_unit()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ev => "eV",
            Self::Kev => "keV",
            Self::Mev => "MeV",
        }
    }
}

impl Display for EnergyUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub value: f64,
    pub unit: EnergyUnit,
}

impl Energy {
    pub const fn new(value: f64, unit: EnergyUnit) -> Self {
        Self { value, unit }
    }

    pub const fn kev(value: f64) -> Self {
        Self::new(value, EnergyUnit::Kev)
    }

    pub fn in_kev(&self) -> f64 {
        self.unit.to_kev(self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MassUnit {
    #[serde(rename = "g")]
    Gram,
    #[default]
    #[serde(rename = "kg")]
    Kilogram,
}

impl MassUnit {
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            Self::Gram => value / 1.0e3,
            Self::Kilogram => value,
        }
    }
}

/// Time base for normalized rates; emission rates are always per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    #[default]
    Day,
    Year,
}

impl TimeUnit {
    pub const fn seconds(self) -> f64 {
        match self {
            Self::Second => 1.0,
            Self::Day => SECONDS_PER_DAY,
            Self::Year => SECONDS_PER_YEAR,
        }
    }
}
