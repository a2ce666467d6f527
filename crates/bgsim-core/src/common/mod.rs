pub mod config;
pub mod elements;
pub mod isotope;
pub mod units;

pub use config::{BinSpec, ValueWindow, ViewConfig, ViewConfigError, load_view_config};
pub use isotope::{IsotopeId, IsotopeParseError, parse_isotope};
pub use units::{Energy, EnergyUnit, MassUnit, TimeUnit};
