//! Network nodes.
//!
//! A node is a named location with a closed role.  The role carries exactly the
//! data that kind of node needs: vendors list what they produce, storage and
//! gateway nodes hold inventory, customers count what was delivered to them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use sc_core::{GeoPoint, Quantity, ResourceKind};

/// The four node kinds, without their payload.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Vendor,
    Storage,
    Gateway,
    Customer,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Vendor   => "vendor",
            NodeKind::Storage  => "storage",
            NodeKind::Gateway  => "gateway",
            NodeKind::Customer => "customer",
        })
    }
}

/// Role-specific node data.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeRole {
    /// Unlimited source of the listed resources.  Never holds inventory.
    Vendor { produces: Vec<ResourceKind> },

    /// Holds inventory.  `capacity` is informational; only modules that
    /// choose to honour it do so.
    Storage {
        inventory: BTreeMap<ResourceKind, Quantity>,
        capacity:  BTreeMap<ResourceKind, Quantity>,
    },

    /// Holds inventory and sits between producers and consumers.
    Gateway { inventory: BTreeMap<ResourceKind, Quantity> },

    /// Terminal sink.  Shipments arriving here are counted, not stocked.
    Customer { delivered: BTreeMap<ResourceKind, Quantity> },
}

/// A named location in the resource-flow network.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name:     String,
    pub location: GeoPoint,

    /// When set, shipments may drive this node's on-hand stock below zero.
    pub allow_negative: bool,

    pub role: NodeRole,
}

impl Node {
    // ── Constructors ──────────────────────────────────────────────────────

    pub fn vendor<R: Into<ResourceKind>>(
        name:     impl Into<String>,
        location: GeoPoint,
        produces: impl IntoIterator<Item = R>,
    ) -> Self {
        Self::with_role(
            name,
            location,
            NodeRole::Vendor { produces: produces.into_iter().map(Into::into).collect() },
        )
    }

    pub fn storage(name: impl Into<String>, location: GeoPoint) -> Self {
        Self::with_role(
            name,
            location,
            NodeRole::Storage { inventory: BTreeMap::new(), capacity: BTreeMap::new() },
        )
    }

    pub fn gateway(name: impl Into<String>, location: GeoPoint) -> Self {
        Self::with_role(name, location, NodeRole::Gateway { inventory: BTreeMap::new() })
    }

    pub fn customer(name: impl Into<String>, location: GeoPoint) -> Self {
        Self::with_role(name, location, NodeRole::Customer { delivered: BTreeMap::new() })
    }

    fn with_role(name: impl Into<String>, location: GeoPoint, role: NodeRole) -> Self {
        Self { name: name.into(), location, allow_negative: false, role }
    }

    /// Set the initial stock of `resource`.  Ignored for nodes that do not
    /// track inventory.
    pub fn with_stock(mut self, resource: impl Into<ResourceKind>, quantity: Quantity) -> Self {
        if let Some(inv) = self.inventory_mut() {
            inv.insert(resource.into(), quantity);
        }
        self
    }

    /// Set the storage capacity for `resource`.  Ignored for non-storage nodes.
    pub fn with_capacity(mut self, resource: impl Into<ResourceKind>, quantity: Quantity) -> Self {
        if let NodeRole::Storage { capacity, .. } = &mut self.role {
            capacity.insert(resource.into(), quantity);
        }
        self
    }

    pub fn allowing_negative(mut self) -> Self {
        self.allow_negative = true;
        self
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn kind(&self) -> NodeKind {
        match self.role {
            NodeRole::Vendor { .. }   => NodeKind::Vendor,
            NodeRole::Storage { .. }  => NodeKind::Storage,
            NodeRole::Gateway { .. }  => NodeKind::Gateway,
            NodeRole::Customer { .. } => NodeKind::Customer,
        }
    }

    /// Storage and gateway nodes hold inventory; vendors and customers don't.
    #[inline]
    pub fn tracks_inventory(&self) -> bool {
        self.inventory().is_some()
    }

    /// Only vendors are never a valid shipment destination.
    #[inline]
    pub fn can_receive(&self) -> bool {
        !matches!(self.role, NodeRole::Vendor { .. })
    }

    pub fn inventory(&self) -> Option<&BTreeMap<ResourceKind, Quantity>> {
        match &self.role {
            NodeRole::Storage { inventory, .. } | NodeRole::Gateway { inventory } => Some(inventory),
            _ => None,
        }
    }

    fn inventory_mut(&mut self) -> Option<&mut BTreeMap<ResourceKind, Quantity>> {
        match &mut self.role {
            NodeRole::Storage { inventory, .. } | NodeRole::Gateway { inventory } => Some(inventory),
            _ => None,
        }
    }

    /// On-hand stock of `resource`; 0 when absent or not tracked.
    pub fn on_hand(&self, resource: &str) -> Quantity {
        self.inventory().and_then(|inv| inv.get(resource).copied()).unwrap_or(0)
    }

    /// Declared capacity for `resource`, if this is a storage node that has one.
    pub fn capacity(&self, resource: &str) -> Option<Quantity> {
        match &self.role {
            NodeRole::Storage { capacity, .. } => capacity.get(resource).copied(),
            _ => None,
        }
    }

    /// Units of `resource` delivered so far; 0 for non-customers.
    pub fn delivered(&self, resource: &str) -> Quantity {
        match &self.role {
            NodeRole::Customer { delivered } => delivered.get(resource).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Units of every resource delivered so far; 0 for non-customers.
    pub fn delivered_total(&self) -> Quantity {
        match &self.role {
            NodeRole::Customer { delivered } => delivered.values().sum(),
            _ => 0,
        }
    }

    /// Resources a vendor produces; empty for other kinds.
    pub fn produces(&self) -> &[ResourceKind] {
        match &self.role {
            NodeRole::Vendor { produces } => produces,
            _ => &[],
        }
    }

    // ── Controller-side mutation ──────────────────────────────────────────

    /// Account for an arriving shipment.
    pub(crate) fn receive(&mut self, resource: &ResourceKind, quantity: Quantity) {
        match &mut self.role {
            NodeRole::Storage { inventory, .. } | NodeRole::Gateway { inventory } => {
                *inventory.entry(resource.clone()).or_insert(0) += quantity;
            }
            NodeRole::Customer { delivered } => {
                *delivered.entry(resource.clone()).or_insert(0) += quantity;
            }
            NodeRole::Vendor { .. } => {}
        }
    }

    /// Remove stock for an outgoing shipment.  No-op on vendors and
    /// customers, which are not inventory holders.
    pub(crate) fn withdraw(&mut self, resource: &ResourceKind, quantity: Quantity) {
        if let Some(inv) = self.inventory_mut() {
            *inv.entry(resource.clone()).or_insert(0) -= quantity;
        }
    }
}
