//! Simulation result documents as stored in the corpus.
//!
//! On disk the histograms use a flat layout inside `hits`: the counts live
//! under the hit-type name (`"gammas"`) and the optional bin edges, in keV,
//! under the same name with a `_bins` suffix (`"gammas_bins"`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitType {
    Gammas,
    Neutrons,
}

impl HitType {
    pub const ALL: [HitType; 2] = [HitType::Gammas, HitType::Neutrons];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gammas => "gammas",
            Self::Neutrons => "neutrons",
        }
    }

    pub const fn bins_key(self) -> &'static str {
        match self {
            Self::Gammas => "gammas_bins",
            Self::Neutrons => "neutrons_bins",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Gammas => "Gammas",
            Self::Neutrons => "Neutrons",
        }
    }
}

impl Display for HitType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Histogram {
    pub counts: Vec<f64>,
    /// Bin edges in keV. Documents may omit them, in which case evaluators
    /// fall back to their canonical edges.
    pub edges: Option<Vec<f64>>,
}

impl Histogram {
    pub fn new(counts: Vec<f64>, edges: Option<Vec<f64>>) -> Self {
        Self { counts, edges }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Vec<f64>>")]
pub struct Hits(BTreeMap<HitType, Histogram>);

impl Hits {
    pub fn get(&self, hit: HitType) -> Option<&Histogram> {
        self.0.get(&hit)
    }

    pub fn insert(&mut self, hit: HitType, histogram: Histogram) {
        self.0.insert(hit, histogram);
    }

    pub fn retain(&mut self, keep: impl Fn(HitType) -> bool) {
        self.0.retain(|hit, _| keep(*hit));
    }

    pub fn hit_types(&self) -> impl Iterator<Item = HitType> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Anything that is not a number array under a known hit key is skipped
/// instead of failing the whole document.
impl From<BTreeMap<String, Value>> for Hits {
    fn from(mut raw: BTreeMap<String, Value>) -> Self {
        let mut hits = BTreeMap::new();
        for hit in HitType::ALL {
            let edges = raw
                .remove(hit.bins_key())
                .and_then(|value| number_array(hit.bins_key(), value));
            if let Some(counts) = raw
                .remove(hit.as_str())
                .and_then(|value| number_array(hit.as_str(), value))
            {
                hits.insert(hit, Histogram { counts, edges });
            }
        }
        for key in raw.keys() {
            tracing::debug!(key = %key, "ignoring unsupported hit entry");
        }
        Self(hits)
    }
}

fn number_array(key: &str, value: Value) -> Option<Vec<f64>> {
    let numbers: Option<Vec<f64>> = match &value {
        Value::Array(items) => items.iter().map(Value::as_f64).collect(),
        _ => None,
    };
    if numbers.is_none() {
        tracing::debug!(key, value = %value, "ignoring hit entry that is not a number array");
    }
    numbers
}

impl From<Hits> for BTreeMap<String, Vec<f64>> {
    fn from(hits: Hits) -> Self {
        let mut raw = BTreeMap::new();
        for (hit, histogram) in hits.0 {
            raw.insert(hit.as_str().to_string(), histogram.counts);
            if let Some(edges) = histogram.edges {
                raw.insert(hit.bins_key().to_string(), edges);
            }
        }
        raw
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationDocument {
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "deserialize_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub nprimaries: u64,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub spectrum: Option<String>,
    #[serde(default, skip_serializing_if = "Hits::is_empty")]
    pub hits: Hits,
    /// Any further top-level metadata; matched by extra query keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SimulationDocument {
    pub fn histogram(&self, hit: HitType) -> Option<&Histogram> {
        self.hits.get(hit)
    }

    /// Value of a top-level metadata field as the query layer sees it.
    pub fn field(&self, key: &str) -> Value {
        let text = |value: &Option<String>| {
            value
                .as_ref()
                .map_or(Value::Null, |text| Value::String(text.clone()))
        };
        match key {
            "volume" => text(&self.volume),
            "primary" => text(&self.primary),
            "spectrum" => text(&self.spectrum),
            "nprimaries" => Value::from(self.nprimaries),
            other => self.extra.get(other).cloned().unwrap_or(Value::Null),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Object(map)) if map.contains_key("$oid") => {
            map.get("$oid").and_then(Value::as_str).map(str::to_string)
        }
        Some(other) => Some(other.to_string()),
    })
}

/// Top-level fields a corpus fetch must return.
///
/// Query metadata (`volume`, `primary`, `spectrum`) and `nprimaries` are
/// always cheap and always kept; histogram payloads are only transferred
/// for the hit types named here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    hits: BTreeSet<HitType>,
}

impl Projection {
    pub fn livetime() -> Self {
        Self::default()
    }

    pub fn with_hits(hits: impl IntoIterator<Item = HitType>) -> Self {
        Self {
            hits: hits.into_iter().collect(),
        }
    }

    pub fn includes(&self, hit: HitType) -> bool {
        self.hits.contains(&hit)
    }

    pub fn merge(&mut self, other: &Projection) {
        self.hits.extend(other.hits.iter().copied());
    }

    pub fn apply(&self, document: &SimulationDocument) -> SimulationDocument {
        let mut projected = document.clone();
        projected.hits.retain(|hit| self.includes(hit));
        projected
    }
}
