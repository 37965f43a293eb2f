//! The network graph: node and edge storage, read-only aggregation queries,
//! and the two controller-only mutations (transit and dispatch).
//!
//! # Data layout
//!
//! Nodes and edges live in plain `Vec`s indexed by `NodeId` / `EdgeId`.
//! Name lookup and `(origin, destination)` lookup go through side indexes
//! built once by [`NetworkBuilder`][crate::NetworkBuilder].  Shipments are
//! stored on the edge they travel along and nowhere else.

use std::collections::HashMap;

use tracing::debug;

use sc_core::{EdgeId, EntityId, NodeId, Quantity, ResourceKind};

use crate::{Edge, NetworkError, NetworkResult, Node, NodeKind, Shipment};

/// A validated request to move `quantity` units of `resource` along the
/// `origin → destination` edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub id:          EntityId,
    pub resource:    ResourceKind,
    pub origin:      NodeId,
    pub destination: NodeId,
    pub quantity:    Quantity,
}

/// Directed resource-flow graph with in-flight shipments.
///
/// Do not construct directly; use [`NetworkBuilder`][crate::NetworkBuilder].
#[derive(Clone, Debug, Default)]
pub struct Network {
    pub(crate) nodes:      Vec<Node>,
    pub(crate) by_name:    HashMap<String, NodeId>,
    pub(crate) edges:      Vec<Edge>,
    pub(crate) edge_index: HashMap<(NodeId, NodeId), EdgeId>,
}

impl Network {
    /// A network with no nodes or edges.
    pub fn empty() -> Self {
        Self::default()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.node_id(name).and_then(|id| self.node(id))
    }

    /// Like [`node_id`](Self::node_id) but a missing name is an error.
    pub fn require_node(&self, name: &str) -> NetworkResult<NodeId> {
        self.node_id(name).ok_or_else(|| NetworkError::UnknownNode(name.to_owned()))
    }

    /// Human-readable name for `id`, for logs and error messages.
    pub fn name_of(&self, id: NodeId) -> &str {
        self.node(id).map_or("<unknown>", |n| n.name.as_str())
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Ids of every node of `kind`, in declaration order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| n.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// The single node of `kind`.  Zero or several such nodes is a
    /// [`NetworkError::MissingTopology`].
    pub fn sole_node_of_kind(&self, kind: NodeKind) -> NetworkResult<NodeId> {
        match self.nodes_of_kind(kind).as_slice() {
            [only] => Ok(*only),
            []     => Err(NetworkError::MissingTopology(format!("no {kind} node in network"))),
            many   => Err(NetworkError::MissingTopology(format!(
                "expected exactly one {kind} node, found {}",
                many.len()
            ))),
        }
    }

    // ── Edge lookup ───────────────────────────────────────────────────────

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, origin: NodeId, destination: NodeId) -> Option<&Edge> {
        self.edge_index
            .get(&(origin, destination))
            .map(|e| &self.edges[e.index()])
    }

    /// Edges whose destination is `node`.
    pub fn inbound_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.destination == node)
    }

    /// Edges whose origin is `node`.
    pub fn outbound_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.origin == node)
    }

    // ── Aggregation queries ───────────────────────────────────────────────
    //
    // A resource kind a node has never seen counts as zero.

    /// On-hand stock of `resource` at `node`.
    pub fn on_hand(&self, node: NodeId, resource: &str) -> Quantity {
        self.node(node).map_or(0, |n| n.on_hand(resource))
    }

    /// On-hand stock of `resource` summed over every inventory-holding node.
    pub fn total_on_hand(&self, resource: &str) -> Quantity {
        self.nodes.iter().map(|n| n.on_hand(resource)).sum()
    }

    /// Units of `resource` delivered to customers so far.
    pub fn total_delivered(&self, resource: &str) -> Quantity {
        self.nodes.iter().map(|n| n.delivered(resource)).sum()
    }

    /// Units of `resource` on every edge of the network.
    pub fn total_in_flight(&self, resource: &str) -> Quantity {
        self.edges.iter().map(|e| e.in_flight(resource)).sum()
    }

    /// Units of `resource` currently travelling towards `node`.
    pub fn in_flight_to(&self, node: NodeId, resource: &str) -> Quantity {
        self.inbound_edges(node).map(|e| e.in_flight(resource)).sum()
    }

    /// Units of `resource` travelling towards any storage or gateway node.
    pub fn in_flight_to_holding_nodes(&self, resource: &str) -> Quantity {
        self.edges
            .iter()
            .filter(|e| self.node(e.destination).is_some_and(Node::tracks_inventory))
            .map(|e| e.in_flight(resource))
            .sum()
    }

    /// In-flight `resource` towards `node`, bucketed by ticks until arrival.
    ///
    /// Bucket `i` holds the units arriving in `i + 1` ticks; shipments further
    /// out than `horizon` ticks are folded into the last bucket.
    pub fn in_flight_by_arrival(&self, node: NodeId, resource: &str, horizon: usize) -> Vec<Quantity> {
        let mut buckets = vec![0; horizon];
        if horizon == 0 {
            return buckets;
        }
        for shipment in self
            .inbound_edges(node)
            .flat_map(|e| e.shipments.iter())
            .filter(|s| s.resource.as_str() == resource)
        {
            let i = (shipment.ticks_until_arrival.max(1) as usize - 1).min(horizon - 1);
            buckets[i] += shipment.quantity;
        }
        buckets
    }

    // ── Controller-side mutation ──────────────────────────────────────────

    /// Move every in-flight shipment one tick closer to its destination and
    /// deliver those that have arrived.  Returns the delivered shipments.
    ///
    /// Shipments on each edge are visited newest first, so removing one does
    /// not disturb the indices still to be visited.
    pub fn advance_shipments(&mut self) -> Vec<Shipment> {
        let mut delivered = Vec::new();
        for edge in &mut self.edges {
            for i in (0..edge.shipments.len()).rev() {
                edge.shipments[i].ticks_until_arrival -= 1;
                if edge.shipments[i].ticks_until_arrival <= 0 {
                    delivered.push(edge.shipments.remove(i));
                }
            }
        }
        for s in &delivered {
            if let Some(dest) = self.nodes.get_mut(s.destination.index()) {
                dest.receive(&s.resource, s.quantity);
                debug!(
                    shipment = %s.id,
                    resource = %s.resource,
                    quantity = s.quantity,
                    destination = %dest.name,
                    "shipment delivered"
                );
            }
        }
        delivered
    }

    /// Check that `request` could be dispatched without touching any state.
    ///
    /// Returns the edge it would travel along.
    pub fn check_dispatch(&self, request: &Dispatch) -> NetworkResult<EdgeId> {
        let origin = self.node(request.origin).ok_or(NetworkError::UnknownNodeId(request.origin))?;
        let destination = self
            .node(request.destination)
            .ok_or(NetworkError::UnknownNodeId(request.destination))?;

        let edge = *self
            .edge_index
            .get(&(request.origin, request.destination))
            .ok_or_else(|| NetworkError::NoEdge {
                origin:      origin.name.clone(),
                destination: destination.name.clone(),
            })?;

        if !destination.can_receive() {
            return Err(NetworkError::CannotReceive {
                node: destination.name.clone(),
                kind: destination.kind(),
            });
        }

        if origin.tracks_inventory() && !origin.allow_negative {
            let available = origin.on_hand(request.resource.as_str());
            if available < request.quantity {
                return Err(NetworkError::InsufficientInventory {
                    node:      origin.name.clone(),
                    resource:  request.resource.clone(),
                    requested: request.quantity,
                    available,
                });
            }
        }
        Ok(edge)
    }

    /// Withdraw stock at the origin and put a new shipment on the edge.
    ///
    /// Validation happens first; on error the network is left untouched.
    pub fn dispatch(&mut self, request: Dispatch) -> NetworkResult<&Shipment> {
        let edge_id = self.check_dispatch(&request)?;

        self.nodes[request.origin.index()].withdraw(&request.resource, request.quantity);

        let edge = &mut self.edges[edge_id.index()];
        debug!(
            shipment = %request.id,
            resource = %request.resource,
            quantity = request.quantity,
            edge = %edge_id,
            transit = edge.transit_ticks,
            "shipment dispatched"
        );
        edge.shipments.push(Shipment {
            id:                  request.id,
            resource:            request.resource,
            origin:              request.origin,
            destination:         request.destination,
            quantity:            request.quantity,
            ticks_until_arrival: i64::from(edge.transit_ticks),
        });
        Ok(&edge.shipments[edge.shipments.len() - 1])
    }
}
