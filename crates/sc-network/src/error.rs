//! Network error type.

use thiserror::Error;

use sc_core::{NodeId, Quantity, ResourceKind};

use crate::NodeKind;

/// Errors produced while building or mutating a [`Network`][crate::Network].
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0:?} not found in network")]
    UnknownNode(String),

    #[error("node {0} not found in network")]
    UnknownNodeId(NodeId),

    #[error("node {0:?} declared more than once")]
    DuplicateNode(String),

    #[error("edge {origin:?} -> {destination:?} refers to an undeclared node")]
    UnknownEdgeEndpoint { origin: String, destination: String },

    #[error("edge {origin:?} -> {destination:?} declared more than once")]
    DuplicateEdge { origin: String, destination: String },

    #[error("no edge from {origin:?} to {destination:?}")]
    NoEdge { origin: String, destination: String },

    #[error("{kind} node {node:?} cannot receive shipments")]
    CannotReceive { node: String, kind: NodeKind },

    #[error(
        "cannot ship {requested} units of {resource} from {node:?}: only {available} on hand"
    )]
    InsufficientInventory {
        node:      String,
        resource:  ResourceKind,
        requested: Quantity,
        available: Quantity,
    },

    #[error("missing topology element: {0}")]
    MissingTopology(String),
}

impl NetworkError {
    /// `true` when the error describes a malformed topology (detected while
    /// building or inspecting the network) rather than an invalid request.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            NetworkError::DuplicateNode(_)
                | NetworkError::UnknownEdgeEndpoint { .. }
                | NetworkError::DuplicateEdge { .. }
                | NetworkError::MissingTopology(_)
        )
    }
}

pub type NetworkResult<T> = Result<T, NetworkError>;
