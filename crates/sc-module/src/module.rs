//! Module capability traits: the extension points for user code.

use std::any::Any;

use serde_json::Value;

use sc_network::NetworkBuilder;

use crate::{Action, Context, ContextBuilder, Reward, SimResult, SimulationState};

/// A pluggable unit named in a profile.
///
/// A module advertises what it can do through the three `as_*` accessors;
/// each defaults to `None`.  A module may be an Environment and an Agent at
/// the same time.
///
/// # Example
///
/// ```rust,ignore
/// struct Restocker { shop: String }
///
/// impl Module for Restocker {
///     fn name(&self) -> &str { "restocker" }
///     fn as_agent(&mut self) -> Option<&mut dyn Agent> { Some(self) }
/// }
///
/// impl Agent for Restocker {
///     fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Module: 'static {
    /// Stable, unique name.  Keys this module's context entry and private
    /// state fragment.
    fn name(&self) -> &str;

    fn as_environment(&self) -> Option<&dyn Environment> {
        None
    }

    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        None
    }

    fn as_metrics(&mut self) -> Option<&mut dyn Metrics> {
        None
    }
}

/// Contributes static context, network topology and initial state.
///
/// Contributions must not depend on the order in which environment modules
/// are configured.
pub trait Environment {
    /// Add episode-static entries.  Called before any other hook.
    fn contribute_context(&self, _ctx: &mut ContextBuilder) -> SimResult<()> {
        Ok(())
    }

    /// Add nodes and edges to the shared network.
    fn contribute_network(&self, _ctx: &Context, _network: &mut NetworkBuilder) -> SimResult<()> {
        Ok(())
    }

    /// A private state fragment, stored under the module's name.
    fn initial_state(&self, _ctx: &Context) -> SimResult<Option<Value>> {
        Ok(None)
    }
}

/// Reacts to the state once per tick by proposing actions.
pub trait Agent {
    /// Called once per episode after the initial state exists.  A returned
    /// value is stored as the module's private state fragment.
    fn reset(&mut self, _ctx: &Context, _state: &SimulationState) -> SimResult<Option<Value>> {
        Ok(None)
    }

    /// Actions to take this tick, in order.  Empty when nothing is warranted.
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>>;
}

/// Turns executed actions into rewards.  Exactly one per run.
pub trait Metrics {
    fn reset(&mut self, ctx: &Context, state: &SimulationState) -> SimResult<()>;

    /// Reward for one executed shipment-type action, or for the synthetic
    /// `AdvanceTime` action at the end of each tick.  `state` already
    /// reflects the action.
    fn compute_reward(&mut self, state: &SimulationState, action: &Action) -> SimResult<Reward>;
}

/// Auxiliary logic (forecasts, cost tables) shared between modules.
///
/// Services are never listed in a profile; modules obtain them from the
/// [`ServiceRegistry`][crate::ServiceRegistry] at construction time.
pub trait Service: Any {
    fn name(&self) -> &str;

    /// Called once per episode with the freshly assembled context.
    fn reset(&mut self, _ctx: &Context) -> SimResult<()> {
        Ok(())
    }
}
