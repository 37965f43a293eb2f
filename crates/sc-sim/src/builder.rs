//! Fluent builder for constructing a [`SupplyChainSim`].

use std::collections::BTreeSet;
use std::time::Instant;

use sc_core::{Calendar, RunParameters, Tick};
use sc_module::{ModuleRegistry, Profile, SimResult};

use crate::{SupplyChainSim, TimeProfile};

/// Fluent builder for [`SupplyChainSim`].
///
/// # Required inputs
///
/// - [`ModuleRegistry`]: module factories, service catalog, built-in profiles
/// - [`RunParameters`]: profile name, seed, start date, increment, horizon
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                  |
/// |---------------------|------------------------------------------|
/// | `.profile(p)`       | `params.profile` resolved in the registry |
/// | `.breakpoints(v)`   | none                                     |
///
/// # Example
///
/// ```rust,ignore
/// let registry = sc_modules::standard_registry();
/// let mut sim = SimBuilder::new(&registry, params)
///     .breakpoints([Tick(5)])
///     .build()?;
/// sim.run()?;
/// ```
pub struct SimBuilder<'r> {
    registry:    &'r ModuleRegistry,
    params:      RunParameters,
    profile:     Option<Profile>,
    breakpoints: BTreeSet<Tick>,
}

impl<'r> SimBuilder<'r> {
    pub fn new(registry: &'r ModuleRegistry, params: RunParameters) -> Self {
        Self { registry, params, profile: None, breakpoints: BTreeSet::new() }
    }

    /// Use `profile` instead of resolving `params.profile`.
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Ticks at which [`SupplyChainSim::run`] halts.
    pub fn breakpoints(mut self, ticks: impl IntoIterator<Item = Tick>) -> Self {
        self.breakpoints.extend(ticks);
        self
    }

    /// Validate the parameters and construct every module.
    ///
    /// # Errors
    /// Configuration errors: unsupported time increment, malformed start
    /// date, unresolvable profile, wrong metrics count, unknown module or
    /// service, or any error raised by a module factory.
    pub fn build(self) -> SimResult<SupplyChainSim> {
        let started = Instant::now();

        let increment = self.params.increment()?;
        let start = self.params.start()?;

        let loaded = match &self.profile {
            Some(profile) => self.registry.load_profile(profile, &self.params)?,
            None => self.registry.load(&self.params)?,
        };

        let mut profile = TimeProfile::new();
        profile.add("init", started.elapsed());

        Ok(SupplyChainSim::from_parts(
            self.params,
            Calendar { start, increment },
            loaded,
            self.breakpoints,
            profile,
        ))
    }
}
