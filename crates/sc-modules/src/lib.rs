//! `sc-modules` — the demo modules shipped with rust_sc.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`newsvendor`] | Single-store book retailer: selection, topology, Poisson customer, service-level buying, infinite vendor, closest-storage fulfillment, cash accounting |
//! | [`ports`]      | Port-and-warehouses network, even placement out of the port      |
//! | [`grid`]       | National electricity grid: selection, topology (fixed or battery fleet), supply, demand, fulfillment, battery and balance-mechanism placement, cash accounting |
//! | [`services`]   | `HoldingCost`, `ElectricitySupplyForecast`, `ElectricityDemandForecast` |
//! | [`registry`]   | `standard_registry()`, built-in profiles, parameter presets      |
//!
//! # Profiles
//!
//! ```text
//! newsvendor_demo_profile   metrics: newsvendor.cash_accounting
//!                           modules: selection → topology → poisson_customer
//!                                    → service_level_buying → infinite_vendor
//!                                    → closest_storage_fulfillment
//!
//! ports_demo_profile        metrics: newsvendor.cash_accounting
//!                           modules: selection → ports.topology → poisson_customer
//!                                    → service_level_buying → infinite_vendor
//!                                    → ports.even_placement → closest_storage_fulfillment
//!
//! national_grid_profile     metrics: grid.cash_accounting
//!                           modules: selection → topology → forecast_supply
//!                                    → constant_demand → closest_gateway_fulfillment
//!                                    → battery_drawdown → balance_excess_demand
//!                                    → store_excess_supply → balance_excess_supply
//!
//! national_grid_dynamic_profile   as above with grid.dynamic_topology
//! ```
//!
//! Agent order is significant: the battery modules must run before the
//! balance-mechanism modules, otherwise every deficit and surplus goes to the
//! balance mechanism.

pub mod grid;
pub mod newsvendor;
pub mod ports;
pub mod registry;
pub mod services;


pub use registry::{
    NATIONAL_GRID_FLEET_PROFILE, NATIONAL_GRID_PROFILE, NEWSVENDOR_PROFILE, PORTS_PROFILE,
    national_grid_fleet_params, national_grid_fleet_profile, national_grid_params,
    national_grid_profile, newsvendor_profile, ports_params, ports_profile, standard_registry,
};
pub use services::{ElectricityDemandForecast, ElectricitySupplyForecast, HoldingCost};

use sc_core::{GeoPoint, NodeId};
use sc_module::{Module, SimResult};
use sc_network::Network;

/// Box a constructed module for a [`ModuleFactory`][sc_module::ModuleFactory].
pub(crate) fn boxed<M: Module>(module: M) -> SimResult<Box<dyn Module>> {
    Ok(Box::new(module))
}

/// The candidate closest to `from` by great-circle distance.  Ties go to the
/// earlier candidate.
pub(crate) fn closest_node(
    network:    &Network,
    candidates: impl IntoIterator<Item = NodeId>,
    from:       GeoPoint,
) -> Option<NodeId> {
    candidates
        .into_iter()
        .filter_map(|id| network.node(id).map(|n| (id, n.location.distance_m(from))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
