//! Open orders awaiting fulfilment.

use serde::{Deserialize, Serialize};

use sc_core::{EntityId, NodeId, Quantity, ResourceKind, Tick};

use crate::ActionKind;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Purchase,
    Customer,
}

impl OrderKind {
    /// The order kind an order-type action creates, if any.
    pub fn from_action(kind: ActionKind) -> Option<Self> {
        match kind {
            ActionKind::PurchaseOrder => Some(OrderKind::Purchase),
            ActionKind::CustomerOrder => Some(OrderKind::Customer),
            _ => None,
        }
    }
}

/// A demand or purchase request that has not yet become a shipment.
///
/// The order id is carried over to the shipment that fulfils it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id:          EntityId,
    pub kind:        OrderKind,
    pub resource:    ResourceKind,
    pub quantity:    Quantity,
    pub origin:      Option<NodeId>,
    pub destination: Option<NodeId>,
    pub schedule:    Tick,
}
