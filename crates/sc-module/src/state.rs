//! The mutable world state a simulation steps through.

use std::collections::BTreeMap;

use serde_json::Value;

use sc_core::{DateTime, EntityId, IdAllocator, Tick};
use sc_network::Network;

use crate::Order;

/// Everything that changes during an episode.
///
/// Agents and metrics receive `&SimulationState`; only the controller holds
/// it mutably.
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub clock:     Tick,
    pub date_time: DateTime,
    pub network:   Network,

    pub customer_orders: Vec<Order>,
    pub purchase_orders: Vec<Order>,

    /// Private fragments contributed by Environment and Agent modules,
    /// keyed by module name.
    pub modules: BTreeMap<String, Value>,

    pub ids: IdAllocator,
}

impl SimulationState {
    pub fn new(date_time: DateTime, network: Network) -> Self {
        Self {
            clock: Tick::ZERO,
            date_time,
            network,
            customer_orders: Vec::new(),
            purchase_orders: Vec::new(),
            modules: BTreeMap::new(),
            ids: IdAllocator::new(),
        }
    }

    /// The private fragment of module `name`.
    pub fn module_state(&self, name: &str) -> Option<&Value> {
        self.modules.get(name)
    }

    /// The open order with `id`, from either collection.
    pub fn order(&self, id: EntityId) -> Option<&Order> {
        self.customer_orders
            .iter()
            .chain(&self.purchase_orders)
            .find(|o| o.id == id)
    }

    /// Remove the open order with `id` from whichever collection holds it.
    pub fn remove_order(&mut self, id: EntityId) -> Option<Order> {
        if let Some(i) = self.customer_orders.iter().position(|o| o.id == id) {
            return Some(self.customer_orders.remove(i));
        }
        let i = self.purchase_orders.iter().position(|o| o.id == id)?;
        Some(self.purchase_orders.remove(i))
    }
}
