pub mod corpus;
pub mod livetime;
pub mod query;
pub mod resolver;
pub mod serialization;
pub mod spectrum;
pub mod view;

pub use corpus::{CorpusConfig, DocumentSummary, FnCorpus, JsonDirectoryCorpus, SimulationCorpus};
pub use livetime::{component_livetime, livetime, total_primaries};
pub use query::{
    FieldOverrides, NEUTRON_PRIMARY, NoOverrides, QueryBuilder, QueryOverride, Resolution,
};
pub use resolver::MatchResolver;
pub use spectrum::{BinEdges, BinnedSpectrum, DirectSpectrum, SpectrumAverage, resample};
pub use view::{
    DerivedSpectrum, DerivedValue, MatchEvaluation, NamedSpectrum, NamedValue, RequestEvaluation,
    SimView,
};
