//! Strongly typed identifier wrappers.
//!
//! `NodeId` and `EdgeId` index directly into the network's node and edge
//! vectors.  `EntityId` names an order and, once the order ships, the
//! shipment that replaced it; all fresh `EntityId`s come from one
//! [`IdAllocator`] owned by the simulation state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a node in the network.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed transit edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Identity of an order, carried over to the shipment that fulfils it.
    pub struct EntityId(u64);
}

// ── IdAllocator ───────────────────────────────────────────────────────────────

/// Process-local, monotonically increasing source of fresh [`EntityId`]s.
///
/// Ids are never reused within an episode, so an id is unique across both
/// order collections and every edge's shipments.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next unused id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Record an id chosen elsewhere so `allocate` never hands it out.
    pub fn observe(&mut self, id: EntityId) {
        if id != EntityId::INVALID {
            self.next = self.next.max(id.0 + 1);
        }
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}
