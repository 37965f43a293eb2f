//! `sc-core` — foundational types for the `rust_sc` supply-chain simulator.
//!
//! This crate is a dependency of every other `sc-*` crate.  It has no `sc-*`
//! dependencies and only a handful of external ones (`rand`, `thiserror`,
//! `serde`, `serde_json`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `NodeId`, `EdgeId`, `EntityId`, `IdAllocator`             |
//! | [`resource`]  | `ResourceKind`, `Quantity`, `quantity_from_f64`           |
//! | [`geo`]       | `GeoPoint`, haversine distance                            |
//! | [`time`]      | `Tick`, `TimeIncrement`, `DateTime`, `Calendar`           |
//! | [`rng`]       | `SimRng` (seeded, per module)                             |
//! | [`params`]    | `RunParameters`, `ResourceSelection`                      |
//! | [`error`]     | `CoreError`, `CoreResult`                                 |

pub mod error;
pub mod geo;
pub mod ids;
pub mod params;
pub mod resource;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, EntityId, IdAllocator, NodeId};
pub use params::{ResourceSelection, RunParameters};
pub use resource::{Quantity, ResourceKind, quantity_from_f64};
pub use rng::SimRng;
pub use time::{Calendar, DateTime, Tick, TimeIncrement};
