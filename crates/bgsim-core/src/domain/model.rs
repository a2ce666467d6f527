//! Minimal read-only view of the detector model: components and the
//! emission specs attached to them.

use super::errors::{SimsError, SimsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Query fields that replace the builder's defaults, key by key.
pub type QueryOverrides = BTreeMap<String, Value>;

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionSpec {
    pub name: String,
    /// Activity in decays per second.
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Neutrons per second from (alpha,n) and spontaneous fission.
    #[serde(default, rename = "neutronRate", alias = "neutron_rate")]
    pub neutron_rate: Option<f64>,
    #[serde(default, rename = "querymod", alias = "query_overrides")]
    pub query_overrides: QueryOverrides,
}

impl EmissionSpec {
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate: Some(rate),
            weight: default_weight(),
            neutron_rate: None,
            query_overrides: QueryOverrides::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_neutron_rate(mut self, neutron_rate: f64) -> Self {
        self.neutron_rate = Some(neutron_rate);
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_overrides.insert(key.into(), value.into());
        self
    }

    /// Emission rate with the weight applied. A spec without an activity
    /// has a rate of zero.
    pub fn weighted_rate(&self) -> f64 {
        self.rate.unwrap_or(0.0) * self.weight
    }

    pub fn weighted_neutron_rate(&self) -> Option<f64> {
        self.neutron_rate.map(|rate| rate * self.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    /// Simulation volume, when it differs from the component name.
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default, rename = "querymod", alias = "query_overrides")]
    pub query_overrides: QueryOverrides,
    #[serde(default)]
    pub specs: Vec<EmissionSpec>,
    #[serde(default)]
    pub children: Vec<Component>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: None,
            query_overrides: QueryOverrides::new(),
            specs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_spec(mut self, spec: EmissionSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn with_child(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_overrides.insert(key.into(), value.into());
        self
    }

    pub fn simvolume(&self) -> &str {
        self.volume.as_deref().unwrap_or(&self.name)
    }

    /// Attached specs in depth-first order, paired with their owner.
    pub fn emission_specs(&self, children: bool) -> Vec<(&Component, &EmissionSpec)> {
        let mut specs: Vec<(&Component, &EmissionSpec)> =
            self.specs.iter().map(|spec| (self, spec)).collect();
        if children {
            for child in &self.children {
                specs.extend(child.emission_specs(true));
            }
        }
        specs
    }

    pub fn find(&self, name: &str) -> Option<&Component> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

pub fn load_model(path: impl AsRef<Path>) -> SimsResult<Component> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| {
        SimsError::io_system(
            "IO.MODEL_READ",
            format!("failed to read model '{}': {}", path.display(), source),
        )
    })?;
    serde_json::from_str(&source).map_err(|source| {
        SimsError::input_validation(
            "INPUT.MODEL_PARSE",
            format!("failed to parse model '{}': {}", path.display(), source),
        )
    })
}
