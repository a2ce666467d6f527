use super::document::SimulationDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field -> expected value mapping sent to the corpus. `None`/null means
/// "match any" for that field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub volume: Option<String>,
    pub primary: Option<String>,
    pub spectrum: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl QueryDescriptor {
    pub fn new(volume: impl Into<String>, primary: Option<String>) -> Self {
        Self {
            volume: Some(volume.into()),
            primary,
            spectrum: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Value {
        let text = |value: &Option<String>| {
            value
                .as_ref()
                .map_or(Value::Null, |text| Value::String(text.clone()))
        };
        match key {
            "volume" => text(&self.volume),
            "primary" => text(&self.primary),
            "spectrum" => text(&self.spectrum),
            other => self.extra.get(other).cloned().unwrap_or(Value::Null),
        }
    }

    /// Replaces a single key. Non-string values for the named keys are
    /// stored in their JSON text form.
    pub fn set(&mut self, key: &str, value: Value) {
        let text = match &value {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        };
        match key {
            "volume" => self.volume = text,
            "primary" => self.primary = text,
            "spectrum" => self.spectrum = text,
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        ["volume", "primary", "spectrum"]
            .into_iter()
            .chain(self.extra.keys().map(String::as_str))
    }

    /// Field-equality match; null fields constrain nothing.
    pub fn matches(&self, document: &SimulationDocument) -> bool {
        self.keys().all(|key| {
            let expected = self.get(key);
            expected.is_null() || expected == document.field(key)
        })
    }
}
