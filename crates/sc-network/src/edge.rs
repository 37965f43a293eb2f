//! Directed edges and the shipments travelling along them.

use serde::{Deserialize, Serialize};

use sc_core::{EdgeId, EntityId, NodeId, Quantity, ResourceKind};

/// A quantity of one resource in transit between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    /// Shares its id with the order it fulfils, when there is one.
    pub id:          EntityId,
    pub resource:    ResourceKind,
    pub origin:      NodeId,
    pub destination: NodeId,
    pub quantity:    Quantity,

    /// Decremented once per tick; the shipment is delivered when this
    /// reaches zero.
    pub ticks_until_arrival: i64,
}

/// A directed connection with a fixed transit time.
///
/// At most one edge exists per ordered `(origin, destination)` pair.
#[derive(Clone, Debug)]
pub struct Edge {
    pub id:            EdgeId,
    pub origin:        NodeId,
    pub destination:   NodeId,
    pub transit_ticks: u32,
    pub(crate) shipments: Vec<Shipment>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, origin: NodeId, destination: NodeId, transit_ticks: u32) -> Self {
        Self { id, origin, destination, transit_ticks, shipments: Vec::new() }
    }

    /// Shipments currently on this edge, oldest dispatch first.
    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    /// Units of `resource` currently on this edge.
    pub fn in_flight(&self, resource: &str) -> Quantity {
        self.shipments
            .iter()
            .filter(|s| s.resource.as_str() == resource)
            .map(|s| s.quantity)
            .sum()
    }
}
