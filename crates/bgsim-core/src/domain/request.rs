use super::document::SimulationDocument;
use super::model::{Component, EmissionSpec, QueryOverrides};
use super::query::QueryDescriptor;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Error,
}

/// Which kind of simulated primary a request looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryChannel {
    #[default]
    Gamma,
    Neutron,
}

impl PrimaryChannel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gamma => "gamma",
            Self::Neutron => "neutron",
        }
    }
}

impl Display for PrimaryChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Read-only attributes of the originating component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentContext {
    pub name: String,
    pub volume: String,
    #[serde(skip)]
    pub query_overrides: QueryOverrides,
}

impl From<&Component> for ComponentContext {
    fn from(component: &Component) -> Self {
        Self {
            name: component.name.clone(),
            volume: component.simvolume().to_string(),
            query_overrides: component.query_overrides.clone(),
        }
    }
}

/// One (component, emission spec) pair to resolve against the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub component: ComponentContext,
    pub spec: EmissionSpec,
    pub channel: PrimaryChannel,
    /// Weighted once, here; never re-weighted downstream.
    pub emission_rate: f64,
    pub query: Option<QueryDescriptor>,
    pub matches: Vec<Match>,
    status: BTreeSet<RequestStatus>,
}

impl MatchRequest {
    pub fn new(component: &Component, spec: &EmissionSpec) -> Self {
        Self {
            component: ComponentContext::from(component),
            spec: spec.clone(),
            channel: PrimaryChannel::Gamma,
            emission_rate: spec.weighted_rate(),
            query: None,
            matches: Vec::new(),
            status: BTreeSet::new(),
        }
    }

    /// Copy for another primary channel, without query or matches.
    pub fn clone_for(&self, channel: PrimaryChannel, emission_rate: f64) -> Self {
        Self {
            component: self.component.clone(),
            spec: self.spec.clone(),
            channel,
            emission_rate,
            query: None,
            matches: Vec::new(),
            status: self.status.clone(),
        }
    }

    pub fn add_status(&mut self, status: RequestStatus) {
        self.status.insert(status);
    }

    pub fn status(&self) -> &BTreeSet<RequestStatus> {
        &self.status
    }

    pub fn is_error(&self) -> bool {
        self.status.contains(&RequestStatus::Error)
    }
}

/// One resolved query and the documents it matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub query: QueryDescriptor,
    pub channel: PrimaryChannel,
    pub emission_rate: f64,
    pub documents: Vec<SimulationDocument>,
}

impl Match {
    pub fn new(
        query: QueryDescriptor,
        channel: PrimaryChannel,
        emission_rate: f64,
        documents: Vec<SimulationDocument>,
    ) -> Self {
        Self {
            query,
            channel,
            emission_rate,
            documents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
