//! `sc-network` — the network part of the simulation state.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`node`]    | `Node`, `NodeRole`, `NodeKind`                                 |
//! | [`edge`]    | `Edge`, `Shipment`                                             |
//! | [`network`] | `Network`: lookups, aggregation queries, transit, dispatch     |
//! | [`builder`] | `NetworkBuilder`: name-addressed incremental construction      |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                             |
//!
//! # Ownership
//!
//! Read access is unrestricted.  The two mutating entry points,
//! [`Network::advance_shipments`] and [`Network::dispatch`], are only ever
//! called by the simulation controller; agents see the network through a
//! shared reference and can change it only by returning actions.

pub mod builder;
pub mod edge;
pub mod error;
pub mod network;
pub mod node;


pub use builder::NetworkBuilder;
pub use edge::{Edge, Shipment};
pub use error::{NetworkError, NetworkResult};
pub use network::{Dispatch, Network};
pub use node::{Node, NodeKind, NodeRole};
