//! Episode-static context assembled from Environment modules.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use sc_core::ResourceKind;

use crate::{ConfigError, SimResult};

/// Immutable information gathered before any agent runs.
///
/// The list of simulated resource kinds is a first-class field; everything
/// else is a named JSON value keyed by the contributing module's name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    resources: Vec<ResourceKind>,
    entries:   BTreeMap<String, Value>,
}

impl Context {
    /// The resource kinds simulated in this episode.
    pub fn resources(&self) -> &[ResourceKind] {
        &self.resources
    }

    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.iter().any(|r| r.as_str() == resource)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Deserialize the entry `name`, if present.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> SimResult<Option<T>> {
        self.entries
            .get(name)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(|e| ConfigError::Context { name: name.to_owned(), reason: e.to_string() }.into())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Collects Environment contributions.
///
/// Every key may be set by one module only, so the result does not depend on
/// the order in which modules contribute.
#[derive(Default)]
pub struct ContextBuilder {
    resources: Option<(String, Vec<ResourceKind>)>,
    entries:   BTreeMap<String, Value>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the simulated resource kinds.
    pub fn set_resources(&mut self, module: &str, resources: Vec<ResourceKind>) -> SimResult<()> {
        if let Some((owner, _)) = &self.resources {
            return Err(ConfigError::DuplicateContext {
                name:   "resources".to_owned(),
                first:  owner.clone(),
                second: module.to_owned(),
            }
            .into());
        }
        self.resources = Some((module.to_owned(), resources));
        Ok(())
    }

    /// Add a named entry.
    pub fn insert(&mut self, module: &str, value: Value) -> SimResult<()> {
        if self.entries.contains_key(module) {
            return Err(ConfigError::DuplicateContext {
                name:   module.to_owned(),
                first:  module.to_owned(),
                second: module.to_owned(),
            }
            .into());
        }
        self.entries.insert(module.to_owned(), value);
        Ok(())
    }

    pub fn build(self) -> Context {
        Context {
            resources: self.resources.map(|(_, r)| r).unwrap_or_default(),
            entries:   self.entries,
        }
    }
}
