//! Actions: requested state mutations returned by agents.

use std::fmt;

use serde::{Deserialize, Serialize};

use sc_core::{EntityId, NodeId, Quantity, ResourceKind, Tick};

/// What an action asks the controller to do.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Ask a vendor for stock.  Becomes an entry in `purchase_orders`.
    PurchaseOrder,
    /// Customer demand.  Becomes an entry in `customer_orders`.
    CustomerOrder,
    /// Stock entering the fulfilment network, usually from a vendor.
    InboundShipment,
    /// Stock leaving the fulfilment network, usually towards a customer.
    OutboundShipment,
    /// Stock moving between two holding nodes.
    Transfer,
    /// Synthetic end-of-tick action handed to the metrics module only.
    AdvanceTime,
}

impl ActionKind {
    #[inline]
    pub fn is_order(self) -> bool {
        matches!(self, ActionKind::PurchaseOrder | ActionKind::CustomerOrder)
    }

    #[inline]
    pub fn is_shipment(self) -> bool {
        matches!(
            self,
            ActionKind::InboundShipment | ActionKind::OutboundShipment | ActionKind::Transfer
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::PurchaseOrder    => "purchase_order",
            ActionKind::CustomerOrder    => "customer_order",
            ActionKind::InboundShipment  => "inbound_shipment",
            ActionKind::OutboundShipment => "outbound_shipment",
            ActionKind::Transfer         => "transfer",
            ActionKind::AdvanceTime      => "advance_time",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested state mutation.
///
/// Actions are plain data: agents build them, the controller validates and
/// applies them once `schedule <= clock`.  An action carrying an `id` that
/// matches an open order completes (or replaces) that order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind:        ActionKind,
    pub resource:    Option<ResourceKind>,
    pub origin:      Option<NodeId>,
    pub destination: Option<NodeId>,
    pub quantity:    Quantity,
    pub schedule:    Tick,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id:          Option<EntityId>,
}

impl Action {
    fn new(kind: ActionKind, resource: Option<ResourceKind>, quantity: Quantity, schedule: Tick) -> Self {
        Self { kind, resource, origin: None, destination: None, quantity, schedule, id: None }
    }

    pub fn purchase_order(resource: impl Into<ResourceKind>, quantity: Quantity, schedule: Tick) -> Self {
        Self::new(ActionKind::PurchaseOrder, Some(resource.into()), quantity, schedule)
    }

    /// Customer demand delivered to `customer`; the origin is left for a
    /// fulfilment agent to choose.
    pub fn customer_order(
        resource: impl Into<ResourceKind>,
        customer: NodeId,
        quantity: Quantity,
        schedule: Tick,
    ) -> Self {
        let mut a = Self::new(ActionKind::CustomerOrder, Some(resource.into()), quantity, schedule);
        a.destination = Some(customer);
        a
    }

    /// A shipment-type action (`InboundShipment`, `OutboundShipment` or
    /// `Transfer`) along `origin → destination`.
    pub fn shipment(
        kind:        ActionKind,
        resource:    impl Into<ResourceKind>,
        origin:      NodeId,
        destination: NodeId,
        quantity:    Quantity,
        schedule:    Tick,
    ) -> Self {
        debug_assert!(kind.is_shipment());
        let mut a = Self::new(kind, Some(resource.into()), quantity, schedule);
        a.origin = Some(origin);
        a.destination = Some(destination);
        a
    }

    pub fn inbound_shipment(
        resource: impl Into<ResourceKind>,
        origin: NodeId,
        destination: NodeId,
        quantity: Quantity,
        schedule: Tick,
    ) -> Self {
        Self::shipment(ActionKind::InboundShipment, resource, origin, destination, quantity, schedule)
    }

    pub fn outbound_shipment(
        resource: impl Into<ResourceKind>,
        origin: NodeId,
        destination: NodeId,
        quantity: Quantity,
        schedule: Tick,
    ) -> Self {
        Self::shipment(ActionKind::OutboundShipment, resource, origin, destination, quantity, schedule)
    }

    pub fn transfer(
        resource: impl Into<ResourceKind>,
        origin: NodeId,
        destination: NodeId,
        quantity: Quantity,
        schedule: Tick,
    ) -> Self {
        Self::shipment(ActionKind::Transfer, resource, origin, destination, quantity, schedule)
    }

    /// The synthetic action the controller passes to metrics at the end of
    /// every tick.
    pub fn advance_time(schedule: Tick) -> Self {
        Self::new(ActionKind::AdvanceTime, None, 0, schedule)
    }

    /// Tie this action to an existing order (builder style).
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    /// `true` once the clock has reached the action's scheduled tick.
    #[inline]
    pub fn is_due(&self, clock: Tick) -> bool {
        self.schedule <= clock
    }
}
