//! Incremental, name-addressed network construction.
//!
//! Several Environment modules contribute to the same builder.  Edges refer
//! to their endpoints by name and are only resolved in [`NetworkBuilder::build`],
//! so an edge may be declared before either endpoint exists.

use std::collections::HashMap;

use sc_core::{EdgeId, NodeId};

use crate::{Edge, Network, NetworkError, NetworkResult, Node};

struct RawEdge {
    origin:        String,
    destination:   String,
    transit_ticks: u32,
}

/// Collects nodes and edges, then validates them into a [`Network`].
#[derive(Default)]
pub struct NetworkBuilder {
    nodes:     Vec<Node>,
    raw_edges: Vec<RawEdge>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.  Returns the `NodeId` it will have in the built network.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Declare a directed edge between two named nodes.
    pub fn add_edge(
        &mut self,
        origin:        impl Into<String>,
        destination:   impl Into<String>,
        transit_ticks: u32,
    ) -> &mut Self {
        self.raw_edges.push(RawEdge {
            origin:      origin.into(),
            destination: destination.into(),
            transit_ticks,
        });
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Resolve names and build the network.
    ///
    /// # Errors
    /// * [`NetworkError::DuplicateNode`] if two nodes share a name.
    /// * [`NetworkError::UnknownEdgeEndpoint`] if an edge names a missing node.
    /// * [`NetworkError::DuplicateEdge`] if an ordered pair is declared twice.
    pub fn build(self) -> NetworkResult<Network> {
        let mut by_name = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if by_name.insert(node.name.clone(), NodeId(i as u32)).is_some() {
                return Err(NetworkError::DuplicateNode(node.name.clone()));
            }
        }

        let mut edges = Vec::with_capacity(self.raw_edges.len());
        let mut edge_index = HashMap::with_capacity(self.raw_edges.len());
        for raw in self.raw_edges {
            let (Some(&o), Some(&d)) = (by_name.get(&raw.origin), by_name.get(&raw.destination)) else {
                return Err(NetworkError::UnknownEdgeEndpoint {
                    origin:      raw.origin,
                    destination: raw.destination,
                });
            };
            let id = EdgeId(edges.len() as u32);
            if edge_index.insert((o, d), id).is_some() {
                return Err(NetworkError::DuplicateEdge {
                    origin:      raw.origin,
                    destination: raw.destination,
                });
            }
            edges.push(Edge::new(id, o, d, raw.transit_ticks));
        }

        Ok(Network { nodes: self.nodes, by_name, edges, edge_index })
    }
}
