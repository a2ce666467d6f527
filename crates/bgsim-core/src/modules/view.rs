//! Named derived quantities evaluated for every resolved match.
//!
//! A [`SimView`] is built once from a [`ViewConfig`] and then applied to any
//! number of requests. Undefined rates (zero emission rate, zero livetime)
//! and empty matches render as absent values; malformed histograms are
//! reported as errors.

use super::livetime::livetime;
use super::query::QueryBuilder;
use super::resolver::MatchResolver;
use super::spectrum::{BinEdges, BinnedSpectrum, DirectSpectrum, SpectrumAverage};
use crate::common::{Energy, ViewConfig};
use crate::domain::{
    EvaluationError, HitType, Match, MatchRequest, PrimaryChannel, Projection, QueryDescriptor,
    RequestStatus,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub label: String,
    pub unit: String,
    pub evaluator: SpectrumAverage,
    /// Label of the spectrum this value is read from, when one is shown.
    pub spectrum: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSpectrum {
    pub label: String,
    pub unit: String,
    pub evaluator: DirectSpectrum,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimView {
    values: Vec<NamedValue>,
    spectra: Vec<NamedSpectrum>,
    neutron_expansion: bool,
}

impl SimView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ViewConfig) -> Result<Self, EvaluationError> {
        let mass_kg = config.detector_mass_kg();
        if !(mass_kg.is_finite() && mass_kg > 0.0) {
            return Err(EvaluationError::InvalidDetectorMass { mass_kg });
        }
        let edges = BinEdges::from_spec(&config.bins, config.energy_unit)?;
        let scale = config.scale();

        let mut view = Self::new().with_neutron_expansion(config.neutron_expansion);
        for &hit in &config.spectra {
            let evaluator = DirectSpectrum::new(hit, edges.clone())
                .with_unit(config.energy_unit)
                .with_binwidths(config.binwidths)
                .with_scale(scale)
                .with_density(config.spectrum_density);
            view = view.with_spectrum(hit.as_str(), config.spectrum_unit.clone(), evaluator);
        }
        for window in &config.values {
            let evaluator = SpectrumAverage::new(
                window.hit,
                Energy::new(window.low, config.energy_unit),
                Energy::new(window.high, config.energy_unit),
            )?
            .with_bin_edges(edges.clone())
            .with_binwidths(config.binwidths)
            .with_scale(scale);
            view = view.with_value(
                config.value_label(window),
                config.value_unit.clone(),
                evaluator,
            );
        }
        Ok(view)
    }

    /// Adds a value; it is associated with the spectrum of the same hit type
    /// when that spectrum is already registered.
    pub fn with_value(
        mut self,
        label: impl Into<String>,
        unit: impl Into<String>,
        evaluator: SpectrumAverage,
    ) -> Self {
        let spectrum = self
            .spectrum_for(evaluator.hit())
            .map(|spectrum| spectrum.label.clone());
        self.values.push(NamedValue {
            label: label.into(),
            unit: unit.into(),
            evaluator,
            spectrum,
        });
        self
    }

    pub fn with_spectrum(
        mut self,
        label: impl Into<String>,
        unit: impl Into<String>,
        evaluator: DirectSpectrum,
    ) -> Self {
        self.spectra.push(NamedSpectrum {
            label: label.into(),
            unit: unit.into(),
            evaluator,
        });
        self
    }

    pub fn with_neutron_expansion(mut self, enabled: bool) -> Self {
        self.neutron_expansion = enabled;
        self
    }

    pub fn values(&self) -> &[NamedValue] {
        &self.values
    }

    pub fn spectra(&self) -> &[NamedSpectrum] {
        &self.spectra
    }

    fn spectrum_for(&self, hit: HitType) -> Option<&NamedSpectrum> {
        self.spectra
            .iter()
            .find(|spectrum| spectrum.evaluator.hit() == hit)
    }

    /// Fields every fetch must return for this view to evaluate.
    pub fn projection(&self) -> Projection {
        let mut projection = Projection::livetime();
        for value in &self.values {
            projection.merge(&value.evaluator.projection());
        }
        for spectrum in &self.spectra {
            projection.merge(&spectrum.evaluator.projection());
        }
        projection
    }

    pub fn resolver(&self) -> MatchResolver {
        MatchResolver::with_builder(QueryBuilder::new().neutron_expansion(self.neutron_expansion))
    }

    pub fn evaluate_match(&self, matched: &Match) -> Result<MatchEvaluation, EvaluationError> {
        let livetime = livetime(matched).ok();
        let defined = !matched.is_empty();

        let mut values = Vec::with_capacity(self.values.len());
        for named in &self.values {
            let outcome = if defined {
                absent_when_undefined(named.evaluator.evaluate(matched))?
            } else {
                Outcome::default()
            };
            values.push(DerivedValue {
                label: named.label.clone(),
                unit: named.unit.clone(),
                value: outcome.value,
                spectrum: named.spectrum.clone(),
                note: outcome.note,
            });
        }

        let mut spectra = Vec::with_capacity(self.spectra.len());
        for named in &self.spectra {
            let outcome = if defined {
                absent_when_undefined(named.evaluator.evaluate(matched))?
            } else {
                Outcome::default()
            };
            spectra.push(DerivedSpectrum {
                label: named.label.clone(),
                unit: named.unit.clone(),
                spectrum: outcome.value,
                note: outcome.note,
            });
        }

        Ok(MatchEvaluation {
            query: matched.query.clone(),
            channel: matched.channel,
            emission_rate: matched.emission_rate,
            documents: matched.documents.len(),
            livetime,
            values,
            spectra,
        })
    }

    /// Evaluates every match of `request` in resolution order.
    pub fn evaluate_request(
        &self,
        request: &MatchRequest,
    ) -> Result<RequestEvaluation, EvaluationError> {
        let matches = request
            .matches
            .iter()
            .map(|matched| self.evaluate_match(matched))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RequestEvaluation {
            component: request.component.name.clone(),
            volume: request.component.volume.clone(),
            spec: request.spec.name.clone(),
            channel: request.channel,
            emission_rate: request.emission_rate,
            status: request.status().iter().copied().collect(),
            query: request.query.clone(),
            matches,
        })
    }
}

struct Outcome<T> {
    value: Option<T>,
    note: Option<String>,
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self {
            value: None,
            note: None,
        }
    }
}

fn absent_when_undefined<T>(
    result: Result<T, EvaluationError>,
) -> Result<Outcome<T>, EvaluationError> {
    match result {
        Ok(value) => Ok(Outcome {
            value: Some(value),
            note: None,
        }),
        Err(error @ (EvaluationError::ZeroEmissionRate | EvaluationError::ZeroLivetime)) => {
            tracing::debug!(%error, "derived quantity is undefined");
            Ok(Outcome {
                value: None,
                note: Some(error.to_string()),
            })
        }
        Err(error) => Err(error),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedValue {
    pub label: String,
    pub unit: String,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSpectrum {
    pub label: String,
    pub unit: String,
    pub spectrum: Option<BinnedSpectrum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEvaluation {
    pub query: QueryDescriptor,
    pub channel: PrimaryChannel,
    pub emission_rate: f64,
    pub documents: usize,
    pub livetime: Option<f64>,
    pub values: Vec<DerivedValue>,
    pub spectra: Vec<DerivedSpectrum>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEvaluation {
    pub component: String,
    pub volume: String,
    pub spec: String,
    pub channel: PrimaryChannel,
    pub emission_rate: f64,
    pub status: Vec<RequestStatus>,
    pub query: Option<QueryDescriptor>,
    pub matches: Vec<MatchEvaluation>,
}

impl RequestEvaluation {
    pub fn is_error(&self) -> bool {
        self.status.contains(&RequestStatus::Error)
    }
}
