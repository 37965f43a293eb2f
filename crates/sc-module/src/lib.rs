//! `sc-module` — the contract between pluggable modules and the controller.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`action`]   | `Action`, `ActionKind`: the only way an agent changes the world  |
//! | [`order`]    | `Order`, `OrderKind`                                              |
//! | [`reward`]   | `Reward`, `StepReward`                                            |
//! | [`context`]  | `Context`, `ContextBuilder`: episode-static data                 |
//! | [`state`]    | `SimulationState`                                                 |
//! | [`module`]   | `Module`, `Environment`, `Agent`, `Metrics`, `Service` traits     |
//! | [`service`]  | `ServiceRegistry`: per-run cache of named services               |
//! | [`registry`] | `ModuleRegistry`, `Profile`: name → factory tables               |
//! | [`error`]    | `SimError` (`ConfigError` / `RuntimeError`), `SimResult<T>`       |
//!
//! # Design notes
//!
//! A module is one value implementing [`Module`]; its capabilities are
//! discovered through the `as_environment` / `as_agent` / `as_metrics`
//! accessors rather than through a type hierarchy.  Agents and metrics only
//! ever receive `&SimulationState`; every effect they want flows back to the
//! controller as an [`Action`].

pub mod action;
pub mod context;
pub mod error;
pub mod module;
pub mod order;
pub mod registry;
pub mod reward;
pub mod service;
pub mod state;

#[cfg(test)]
mod tests;

pub use action::{Action, ActionKind};
pub use context::{Context, ContextBuilder};
pub use error::{ConfigError, RuntimeError, SimError, SimResult};
pub use module::{Agent, Environment, Metrics, Module, Service};
pub use order::{Order, OrderKind};
pub use registry::{LoadedModules, ModuleFactory, ModuleRegistry, Profile};
pub use reward::{Reward, StepReward};
pub use service::ServiceRegistry;
pub use state::SimulationState;
