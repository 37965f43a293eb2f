//! `sc-sim` — the simulation controller for the rust_sc framework.
//!
//! # Per-tick algorithm
//!
//! ```text
//! step(state, backlog):
//!   ① Transit  : every in-flight shipment moves one tick closer; arrivals
//!                 are added to the destination's stock or delivered count.
//!   ② Agents   : for each agent module, in profile order:
//!                   backlog += agent.compute_actions(state)
//!                   execute every due action in the backlog
//!   ③ Advance  : metrics reward for the synthetic AdvanceTime action,
//!                 clock += 1, date_time += increment.
//!   ④ Reward   : timestep total added to the running episode total.
//! ```
//!
//! The whole backlog is re-executed after every agent, so an agent sees the
//! effects of the agents before it within the same tick.  Agent order is
//! therefore significant: it decides whose request wins when stock is
//! contested.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sc_core::RunParameters;
//! use sc_sim::{NoopObserver, SimBuilder};
//!
//! let registry = sc_modules::standard_registry();
//! let mut sim = SimBuilder::new(&registry, RunParameters::default()).build()?;
//! sim.run_with(&mut NoopObserver)?;
//! println!("episode reward: {}", sim.episode_reward());
//! ```

pub mod builder;
pub mod observer;
pub mod profile;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use observer::{NoopObserver, SimObserver};
pub use profile::TimeProfile;
pub use sim::{Phase, RunStatus, SupplyChainSim};
