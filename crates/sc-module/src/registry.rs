//! Module registry and profile resolution.
//!
//! Modules are looked up by identifier in an explicit table populated at
//! startup.  A profile names one metrics module and an ordered list of
//! other modules:
//!
//! ```json
//! { "metrics": ["newsvendor.cash_accounting"],
//!   "modules": ["newsvendor.selection", "newsvendor.topology", "newsvendor.customer"] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sc_core::RunParameters;

use crate::{ConfigError, Module, ServiceRegistry, SimResult};

/// Builds one module from the run parameters.  Services it depends on are
/// obtained from the registry passed in.
pub type ModuleFactory = fn(&RunParameters, &mut ServiceRegistry) -> SimResult<Box<dyn Module>>;

/// The module lists of one run configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub metrics: Vec<String>,
    #[serde(default)]
    pub modules: Vec<String>,
}

impl Profile {
    pub fn new<S: Into<String>>(
        metrics: impl IntoIterator<Item = S>,
        modules: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a profile document from a JSON file.
    pub fn from_path(path: &Path) -> SimResult<Self> {
        let profile_err = |reason: String| ConfigError::Profile {
            name: path.display().to_string(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| profile_err(e.to_string()))?;
        Ok(serde_json::from_str(&text).map_err(|e| profile_err(e.to_string()))?)
    }
}

/// The instantiated modules of one run.
pub struct LoadedModules {
    pub metrics:  Box<dyn Module>,
    pub modules:  Vec<Box<dyn Module>>,
    pub services: ServiceRegistry,
}

/// Name → factory tables for modules, services and built-in profiles.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: BTreeMap<String, ModuleFactory>,
    profiles:  BTreeMap<String, Profile>,
    services:  ServiceRegistry,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_module(&mut self, id: &str, factory: ModuleFactory) -> &mut Self {
        self.factories.insert(id.to_owned(), factory);
        self
    }

    pub fn register_profile(&mut self, name: &str, profile: Profile) -> &mut Self {
        self.profiles.insert(name.to_owned(), profile);
        self
    }

    /// The service catalog new runs start from.
    pub fn services_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.services
    }

    pub fn module_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.profiles.keys().map(String::as_str)
    }

    /// Resolve a profile name: built-in profiles first, then a JSON file at
    /// that path.
    pub fn resolve_profile(&self, name: &str) -> SimResult<Profile> {
        if let Some(p) = self.profiles.get(name) {
            return Ok(p.clone());
        }
        let path = Path::new(name);
        if path.is_file() {
            debug!(path = %path.display(), "loading profile from file");
            return Profile::from_path(path);
        }
        Err(ConfigError::Profile {
            name:   name.to_owned(),
            reason: "neither a built-in profile nor a readable file".to_owned(),
        }
        .into())
    }

    /// Construct one module by identifier.
    pub fn instantiate(
        &self,
        id:       &str,
        params:   &RunParameters,
        services: &mut ServiceRegistry,
    ) -> SimResult<Box<dyn Module>> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| ConfigError::UnknownModule(id.to_owned()))?;
        factory(params, services)
    }

    /// Resolve `params.profile` and build every module it names.
    pub fn load(&self, params: &RunParameters) -> SimResult<LoadedModules> {
        let profile = self.resolve_profile(&params.profile)?;
        self.load_profile(&profile, params)
    }

    /// Build every module `profile` names, with a fresh service registry.
    ///
    /// # Errors
    /// [`ConfigError::MetricsCount`] unless exactly one metrics module is
    /// listed; checked before anything is constructed.
    pub fn load_profile(&self, profile: &Profile, params: &RunParameters) -> SimResult<LoadedModules> {
        let [metrics_id] = profile.metrics.as_slice() else {
            return Err(ConfigError::MetricsCount(profile.metrics.len()).into());
        };

        let mut services = self.services.clone();

        let mut metrics = self.instantiate(metrics_id, params, &mut services)?;
        if metrics.as_metrics().is_none() {
            return Err(ConfigError::NotMetrics(metrics_id.clone()).into());
        }

        let modules = profile
            .modules
            .iter()
            .map(|id| self.instantiate(id, params, &mut services))
            .collect::<SimResult<Vec<_>>>()?;

        info!(
            profile = %params.profile,
            metrics = %metrics_id,
            modules = modules.len(),
            "modules loaded"
        );
        Ok(LoadedModules { metrics, modules, services })
    }
}
