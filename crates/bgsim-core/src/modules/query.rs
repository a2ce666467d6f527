//! Translation of (component, emission spec) requests into corpus queries.

use crate::common::isotope::parse_isotope;
use crate::domain::{MatchRequest, PrimaryChannel, QueryDescriptor, RequestStatus};

pub const NEUTRON_PRIMARY: &str = "neutron";

/// Override source applied after the builder has populated its defaults.
pub trait QueryOverride {
    fn mutate(&self, descriptor: &mut QueryDescriptor, request: &MatchRequest);
}

/// Merges component overrides, then emission-spec overrides, key by key.
/// An explicit null clears a key back to "match any".
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOverrides;

impl QueryOverride for FieldOverrides {
    fn mutate(&self, descriptor: &mut QueryDescriptor, request: &MatchRequest) {
        let overrides = request
            .component
            .query_overrides
            .iter()
            .chain(&request.spec.query_overrides);
        for (key, value) in overrides {
            descriptor.set(key, value.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl QueryOverride for NoOverrides {
    fn mutate(&self, _descriptor: &mut QueryDescriptor, _request: &MatchRequest) {}
}

/// Outcome of building a request: the request itself, or the ordered clones
/// it fanned out into.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Single(MatchRequest),
    Multiple(Vec<MatchRequest>),
}

impl Resolution {
    pub fn from_requests(requests: Vec<MatchRequest>) -> Self {
        match <[MatchRequest; 1]>::try_from(requests) {
            Ok([request]) => Self::Single(request),
            Err(requests) => Self::Multiple(requests),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(requests) => requests.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn requests(&self) -> &[MatchRequest] {
        match self {
            Self::Single(request) => std::slice::from_ref(request),
            Self::Multiple(requests) => requests,
        }
    }

    pub fn requests_mut(&mut self) -> &mut [MatchRequest] {
        match self {
            Self::Single(request) => std::slice::from_mut(request),
            Self::Multiple(requests) => requests,
        }
    }

    pub fn into_requests(self) -> Vec<MatchRequest> {
        match self {
            Self::Single(request) => vec![request],
            Self::Multiple(requests) => requests,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder<O = FieldOverrides> {
    overrides: O,
    neutron_expansion: bool,
}

impl QueryBuilder<FieldOverrides> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: QueryOverride> QueryBuilder<O> {
    pub fn with_overrides(overrides: O) -> Self {
        Self {
            overrides,
            neutron_expansion: false,
        }
    }

    /// Split specs that carry a neutron rate into a gamma and a neutron
    /// request.
    pub fn neutron_expansion(mut self, enabled: bool) -> Self {
        self.neutron_expansion = enabled;
        self
    }

    /// Default query for `request`, with overrides applied. Depends only on
    /// the request's component, spec and channel, so repeated calls agree.
    pub fn descriptor(&self, request: &mut MatchRequest) -> QueryDescriptor {
        let isotope = match parse_isotope(&request.spec.name) {
            Ok(isotope) => Some(isotope.key()),
            Err(error) => {
                tracing::error!(
                    spec = %request.spec.name,
                    component = %request.component.name,
                    "can not interpret spec name as isotope: {error}"
                );
                request.add_status(RequestStatus::Error);
                None
            }
        };

        let mut descriptor = QueryDescriptor::new(request.component.volume.clone(), None);
        match request.channel {
            PrimaryChannel::Gamma => descriptor.primary = isotope,
            PrimaryChannel::Neutron => {
                descriptor.primary = Some(NEUTRON_PRIMARY.to_string());
                descriptor.spectrum = isotope;
            }
        }

        self.overrides.mutate(&mut descriptor, request);
        descriptor
    }

    /// Registers queries on `request`, expanding it when needed. Malformed
    /// requests are logged and dropped.
    pub fn build(&self, request: MatchRequest) -> Option<Resolution> {
        if let Some(reason) = malformed_reason(&request) {
            tracing::warn!(
                spec = %request.spec.name,
                component = %request.component.name,
                "dropping malformed match request: {reason}"
            );
            return None;
        }

        let requests = self
            .expand(request)
            .into_iter()
            .map(|mut request| {
                let descriptor = self.descriptor(&mut request);
                request.query = Some(descriptor);
                request
            })
            .collect();
        Some(Resolution::from_requests(requests))
    }

    fn expand(&self, request: MatchRequest) -> Vec<MatchRequest> {
        let neutron_rate = request
            .spec
            .weighted_neutron_rate()
            .filter(|rate| *rate > 0.0);
        match neutron_rate {
            Some(rate) if self.neutron_expansion => {
                let neutron = request.clone_for(PrimaryChannel::Neutron, rate);
                let gamma = request.clone_for(PrimaryChannel::Gamma, request.emission_rate);
                vec![gamma, neutron]
            }
            _ => vec![request],
        }
    }
}

fn malformed_reason(request: &MatchRequest) -> Option<String> {
    if request.component.name.trim().is_empty() {
        return Some("component has no name".to_string());
    }
    if request.component.volume.trim().is_empty() {
        return Some("component has no simulation volume".to_string());
    }
    if request.spec.name.trim().is_empty() {
        return Some("emission spec has no name".to_string());
    }
    let rates = [Some(request.emission_rate), request.spec.weighted_neutron_rate()];
    rates
        .into_iter()
        .flatten()
        .find(|rate| !rate.is_finite() || *rate < 0.0)
        .map(|rate| format!("emission rate {rate} is not a non-negative number"))
}
