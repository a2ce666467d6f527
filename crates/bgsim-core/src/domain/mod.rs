pub mod document;
pub mod errors;
pub mod model;
pub mod query;
pub mod request;

pub use document::{HitType, Histogram, Hits, Projection, SimulationDocument};
pub use errors::{EvaluationError, SimsError, SimsErrorCategory, SimsResult};
pub use model::{Component, EmissionSpec, QueryOverrides, load_model};
pub use query::QueryDescriptor;
pub use request::{ComponentContext, Match, MatchRequest, PrimaryChannel, RequestStatus};
