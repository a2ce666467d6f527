//! View configuration: which normalized values and spectra to derive from
//! each match, and how to normalize them.
//!
//! The defaults describe an 800 g germanium detector read out in 1 keV bins
//! from 0 to 3 MeV, with average gamma rates over three windows reported in
//! `dru` and the full gamma spectrum in `1/kg/day`.

use super::units::{EnergyUnit, MassUnit, TimeUnit};
use crate::domain::{HitType, SimsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    pub detector_mass: f64,
    pub mass_unit: MassUnit,
    /// Time base of reported rates. Emission rates are per second.
    pub rate_time_unit: TimeUnit,
    /// Unit of `values` windows and `bins`.
    pub energy_unit: EnergyUnit,
    pub bins: BinSpec,
    /// Stored counts are per unit energy rather than per bin.
    pub binwidths: bool,
    pub values: Vec<ValueWindow>,
    pub value_unit: String,
    pub spectra: Vec<HitType>,
    pub spectrum_unit: String,
    /// Divide spectrum bins by their width.
    pub spectrum_density: bool,
    pub neutron_expansion: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            detector_mass: 800.0,
            mass_unit: MassUnit::Gram,
            rate_time_unit: TimeUnit::Day,
            energy_unit: EnergyUnit::Kev,
            bins: BinSpec::Uniform {
                start: 0.0,
                stop: 3000.0,
                step: 1.0,
            },
            binwidths: false,
            values: vec![
                ValueWindow::new(HitType::Gammas, 0.1, 5.0),
                ValueWindow::new(HitType::Gammas, 3.0, 100.0),
                ValueWindow::new(HitType::Gammas, 10.0, 2000.0),
            ],
            value_unit: "dru".to_string(),
            spectra: vec![HitType::Gammas],
            spectrum_unit: "1/kg/day".to_string(),
            spectrum_density: false,
            neutron_expansion: false,
        }
    }
}

impl ViewConfig {
    pub fn detector_mass_kg(&self) -> f64 {
        self.mass_unit.to_kg(self.detector_mass)
    }

    /// Factor turning counts per second of livetime into counts per
    /// detector mass per `rate_time_unit`.
    pub fn scale(&self) -> f64 {
        self.rate_time_unit.seconds() / self.detector_mass_kg()
    }

    pub fn value_label(&self, window: &ValueWindow) -> String {
        format!(
            "{}, {}-{} {}",
            window.hit.display_name(),
            window.low,
            window.high,
            self.energy_unit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueWindow {
    #[serde(default = "default_hit")]
    pub hit: HitType,
    pub low: f64,
    pub high: f64,
}

fn default_hit() -> HitType {
    HitType::Gammas
}

impl ValueWindow {
    pub const fn new(hit: HitType, low: f64, high: f64) -> Self {
        Self { hit, low, high }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    Uniform { start: f64, stop: f64, step: f64 },
    Edges(Vec<f64>),
}

#[derive(Debug, thiserror::Error)]
pub enum ViewConfigError {
    #[error("failed to read view config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse view config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ViewConfigError> for SimsError {
    fn from(error: ViewConfigError) -> Self {
        match &error {
            ViewConfigError::Read { .. } => SimsError::io_system("IO.VIEW_CONFIG", error.to_string()),
            ViewConfigError::Parse { .. } => {
                SimsError::input_validation("INPUT.VIEW_CONFIG", error.to_string())
            }
        }
    }
}

pub fn load_view_config(config_path: impl AsRef<Path>) -> Result<ViewConfig, ViewConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ViewConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ViewConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{BinSpec, ViewConfig, ViewConfigError, load_view_config};
    use crate::common::units::{MassUnit, TimeUnit};
    use crate::domain::HitType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_describe_the_reference_detector() {
        let config = ViewConfig::default();
        assert_eq!(config.detector_mass_kg(), 0.8);
        assert_eq!(config.scale(), 86_400.0 / 0.8);

        let labels: Vec<String> = config
            .values
            .iter()
            .map(|window| config.value_label(window))
            .collect();
        assert_eq!(
            labels,
            vec![
                "Gammas, 0.1-5 keV",
                "Gammas, 3-100 keV",
                "Gammas, 10-2000 keV"
            ]
        );
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("view.json");
        fs::write(
            &path,
            r#"{
              "detectorMass": 2.5,
              "massUnit": "kg",
              "rateTimeUnit": "year",
              "bins": [0, 10, 100, 1000],
              "values": [{"hit": "neutrons", "low": 100, "high": 1000}]
            }"#,
        )
        .expect("config should be written");

        let config = load_view_config(&path).expect("config should load");
        assert_eq!(config.mass_unit, MassUnit::Kilogram);
        assert_eq!(config.rate_time_unit, TimeUnit::Year);
        assert_eq!(config.bins, BinSpec::Edges(vec![0.0, 10.0, 100.0, 1000.0]));
        assert_eq!(config.values[0].hit, HitType::Neutrons);
        assert_eq!(config.value_unit, "dru");
        assert_eq!(config.spectra, vec![HitType::Gammas]);
    }

    #[test]
    fn load_errors_carry_the_config_path() {
        let temp = TempDir::new().expect("tempdir should be created");
        let missing = temp.path().join("missing.json");
        let error = load_view_config(&missing).expect_err("missing config");
        assert!(matches!(error, ViewConfigError::Read { .. }));
        assert!(error.to_string().contains("missing.json"));

        let broken = temp.path().join("broken.json");
        fs::write(&broken, "{ not json").expect("config should be written");
        let error = load_view_config(&broken).expect_err("broken config");
        assert!(matches!(error, ViewConfigError::Parse { .. }));
    }
}
