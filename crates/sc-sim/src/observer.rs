//! Simulation observer trait for progress reporting and data collection.

use sc_core::Tick;
use sc_module::{SimulationState, StepReward};

/// Callbacks invoked by [`SupplyChainSim::run_with`][crate::SupplyChainSim::run_with]
/// at tick boundaries.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: reward printer
///
/// ```rust,ignore
/// struct RewardPrinter;
///
/// impl SimObserver for RewardPrinter {
///     fn on_tick_end(&mut self, tick: Tick, _state: &SimulationState, reward: &StepReward) {
///         println!("{tick}: {:.2} (episode {:.2})", reward.timestep.total, reward.episode_total);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before the tick starting at `tick` is processed.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the tick starting at `tick` has been processed.  `state`
    /// already has its clock advanced.
    fn on_tick_end(&mut self, _tick: Tick, _state: &SimulationState, _reward: &StepReward) {}

    /// Called once when the episode reaches its horizon.
    fn on_sim_end(&mut self, _final_tick: Tick, _state: &SimulationState) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
