use super::corpus::SimulationCorpus;
use super::query::{FieldOverrides, QueryBuilder, QueryOverride, Resolution};
use crate::domain::{Component, Match, MatchRequest, Projection, SimsResult};

/// Issues built queries against a corpus and attaches the results.
#[derive(Debug, Clone, Default)]
pub struct MatchResolver<O = FieldOverrides> {
    builder: QueryBuilder<O>,
}

impl MatchResolver<FieldOverrides> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: QueryOverride> MatchResolver<O> {
    pub fn with_builder(builder: QueryBuilder<O>) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &QueryBuilder<O> {
        &self.builder
    }

    /// Builds and fetches `request`. Returns `None` when the builder drops
    /// the request. Requests already in error status come back unresolved;
    /// an empty match is a valid result.
    pub fn resolve<C>(
        &self,
        request: MatchRequest,
        corpus: &C,
        projection: &Projection,
    ) -> SimsResult<Option<Resolution>>
    where
        C: SimulationCorpus + ?Sized,
    {
        let Some(mut resolution) = self.builder.build(request) else {
            return Ok(None);
        };

        for request in resolution.requests_mut() {
            if request.is_error() {
                tracing::debug!(
                    spec = %request.spec.name,
                    component = %request.component.name,
                    "skipping fetch for request in error status"
                );
                continue;
            }
            let Some(query) = request.query.clone() else {
                continue;
            };
            let documents = corpus.fetch(&query, projection)?;
            tracing::debug!(
                spec = %request.spec.name,
                component = %request.component.name,
                channel = %request.channel,
                documents = documents.len(),
                "resolved match request"
            );
            request.matches.push(Match::new(
                query,
                request.channel,
                request.emission_rate,
                documents,
            ));
        }

        Ok(Some(resolution))
    }

    /// Resolves every spec attached to `component` (and its descendants when
    /// `children` is set), flattening expansions in spec order.
    pub fn resolve_component<C>(
        &self,
        component: &Component,
        children: bool,
        corpus: &C,
        projection: &Projection,
    ) -> SimsResult<Vec<MatchRequest>>
    where
        C: SimulationCorpus + ?Sized,
    {
        let mut requests = Vec::new();
        for (owner, spec) in component.emission_specs(children) {
            let request = MatchRequest::new(owner, spec);
            if let Some(resolution) = self.resolve(request, corpus, projection)? {
                requests.extend(resolution.into_requests());
            }
        }
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::MatchResolver;
    use crate::domain::{
        Component, EmissionSpec, MatchRequest, PrimaryChannel, Projection, QueryDescriptor,
        SimsError, SimsErrorCategory, SimulationDocument,
    };
    use crate::modules::corpus::{FnCorpus, JsonDirectoryCorpus};
    use crate::modules::query::QueryBuilder;
    use std::cell::Cell;

    fn document(volume: &str, primary: &str, spectrum: Option<&str>, n: u64) -> SimulationDocument {
        SimulationDocument {
            nprimaries: n,
            volume: Some(volume.to_string()),
            primary: Some(primary.to_string()),
            spectrum: spectrum.map(str::to_string),
            ..SimulationDocument::default()
        }
    }

    fn corpus() -> JsonDirectoryCorpus {
        JsonDirectoryCorpus::from_documents(vec![
            document("Crystal", "92-238", None, 100),
            document("Crystal", "92-238", None, 300),
            document("Crystal", "neutron", Some("92-238"), 40),
            document("Shield", "92-238", None, 7),
        ])
    }

    #[test]
    fn single_request_collects_one_match() {
        let crystal = Component::new("Crystal");
        let request = MatchRequest::new(&crystal, &EmissionSpec::new("U238", 2.0));

        let resolution = MatchResolver::new()
            .resolve(request, &corpus(), &Projection::livetime())
            .expect("resolve")
            .expect("request kept");
        let requests = resolution.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].matches.len(), 1);
        let matched = &requests[0].matches[0];
        assert_eq!(matched.documents.len(), 2);
        assert_eq!(matched.emission_rate, 2.0);
    }

    #[test]
    fn expanded_requests_keep_documents_apart() {
        let crystal = Component::new("Crystal");
        let spec = EmissionSpec::new("U238", 2.0).with_neutron_rate(0.5);
        let resolver = MatchResolver::with_builder(QueryBuilder::new().neutron_expansion(true));

        let requests = resolver
            .resolve(
                MatchRequest::new(&crystal, &spec),
                &corpus(),
                &Projection::livetime(),
            )
            .expect("resolve")
            .expect("request kept")
            .into_requests();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].channel, PrimaryChannel::Gamma);
        assert_eq!(requests[0].matches.len(), 1);
        let gamma_primaries: Vec<u64> = requests[0].matches[0]
            .documents
            .iter()
            .map(|doc| doc.nprimaries)
            .collect();
        assert_eq!(gamma_primaries, vec![100, 300]);

        assert_eq!(requests[1].channel, PrimaryChannel::Neutron);
        assert_eq!(requests[1].matches.len(), 1);
        assert_eq!(requests[1].matches[0].emission_rate, 0.5);
        let neutron_primaries: Vec<u64> = requests[1].matches[0]
            .documents
            .iter()
            .map(|doc| doc.nprimaries)
            .collect();
        assert_eq!(neutron_primaries, vec![40]);
    }

    #[test]
    fn error_status_skips_fetch() {
        let calls = Cell::new(0);
        let counting = FnCorpus(|_query: &QueryDescriptor, _projection: &Projection| {
            calls.set(calls.get() + 1);
            Ok(Vec::new())
        });
        let crystal = Component::new("Crystal");
        let request = MatchRequest::new(&crystal, &EmissionSpec::new("mystery glow", 1.0));

        let resolution = MatchResolver::new()
            .resolve(request, &counting, &Projection::livetime())
            .expect("resolve")
            .expect("request kept");
        assert_eq!(calls.get(), 0);
        let request = &resolution.requests()[0];
        assert!(request.is_error());
        assert!(request.matches.is_empty());
        assert_eq!(request.query.as_ref().and_then(|q| q.primary.clone()), None);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let vessel = Component::new("Vessel");
        let request = MatchRequest::new(&vessel, &EmissionSpec::new("Co60", 1.0));

        let resolution = MatchResolver::new()
            .resolve(request, &corpus(), &Projection::livetime())
            .expect("resolve")
            .expect("request kept");
        let request = &resolution.requests()[0];
        assert!(!request.is_error());
        assert_eq!(request.matches.len(), 1);
        assert!(request.matches[0].is_empty());
    }

    #[test]
    fn fetch_failures_propagate_unchanged() {
        let offline = FnCorpus(|_query: &QueryDescriptor, _projection: &Projection| {
            Err(SimsError::io_system("IO.CORPUS_FETCH", "corpus unreachable"))
        });
        let crystal = Component::new("Crystal");
        let request = MatchRequest::new(&crystal, &EmissionSpec::new("K40", 1.0));

        let error = MatchResolver::new()
            .resolve(request, &offline, &Projection::livetime())
            .expect_err("fetch failure must propagate");
        assert_eq!(error.category(), SimsErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.CORPUS_FETCH");
    }

    #[test]
    fn component_resolution_follows_spec_order_and_drops_malformed() {
        let detector = Component::new("Detector").with_child(
            Component::new("Crystal")
                .with_spec(EmissionSpec::new("U238", 1.0))
                .with_spec(EmissionSpec::new("", 1.0))
                .with_spec(EmissionSpec::new("Th232", 1.0)),
        );

        let requests = MatchResolver::new()
            .resolve_component(&detector, true, &corpus(), &Projection::livetime())
            .expect("resolve");
        let names: Vec<&str> = requests.iter().map(|r| r.spec.name.as_str()).collect();
        assert_eq!(names, vec!["U238", "Th232"]);
        assert_eq!(requests[1].matches[0].documents.len(), 0);

        let own = MatchResolver::new()
            .resolve_component(&detector, false, &corpus(), &Projection::livetime())
            .expect("resolve");
        assert!(own.is_empty());
    }
}
