use sc_core::{GeoPoint, Quantity, RunParameters};
use sc_module::{Context, Environment, Module, SimResult};
use sc_network::{NetworkBuilder, Node};

use super::{CUSTOMER, IOWA_WAREHOUSE, KANSAS_CITY_WAREHOUSE, MANUFACTURER, PORT, SEATTLE_WAREHOUSE};

/// The six-node ports network.  Every edge's transit time is an offset from
/// the base `transit_time`.
pub struct PortsTopology {
    initial_inventory: Quantity,
    transit_time:      u32,
}

impl PortsTopology {
    pub const DEFAULT_INITIAL_INVENTORY: Quantity = 1;
    pub const DEFAULT_TRANSIT_TIME: u32 = 2;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            initial_inventory: params.get_or("initial_inventory", Self::DEFAULT_INITIAL_INVENTORY)?,
            transit_time:      params.get_or("transit_time", Self::DEFAULT_TRANSIT_TIME)?,
        })
    }
}

impl Module for PortsTopology {
    fn name(&self) -> &str {
        "network"
    }
    fn as_environment(&self) -> Option<&dyn Environment> {
        Some(self)
    }
}

impl Environment for PortsTopology {
    fn contribute_network(&self, ctx: &Context, network: &mut NetworkBuilder) -> SimResult<()> {
        let resources = ctx.resources();
        let stocked = |node: Node| {
            resources
                .iter()
                .fold(node, |n, r| n.with_stock(r.clone(), self.initial_inventory))
        };

        network.add_node(Node::vendor(MANUFACTURER, GeoPoint::new(39.9042, 116.4074), resources.iter().cloned()));
        network.add_node(stocked(Node::gateway(PORT, GeoPoint::new(47.6062, -122.3321))));
        network.add_node(stocked(Node::storage(IOWA_WAREHOUSE, GeoPoint::new(41.743_616_9, -92.728_129_1))));
        network.add_node(stocked(Node::storage(KANSAS_CITY_WAREHOUSE, GeoPoint::new(39.0997, -94.5786))));
        network.add_node(stocked(Node::storage(SEATTLE_WAREHOUSE, GeoPoint::new(47.6062, -122.3321))));
        network.add_node(Node::customer(CUSTOMER, GeoPoint::new(41.833_903_7, -87.872_046_8)));

        let t = self.transit_time;
        network
            .add_edge(MANUFACTURER, PORT, t + 5)
            .add_edge(PORT, IOWA_WAREHOUSE, t)
            .add_edge(PORT, KANSAS_CITY_WAREHOUSE, t + 1)
            .add_edge(PORT, SEATTLE_WAREHOUSE, t.saturating_sub(2))
            .add_edge(IOWA_WAREHOUSE, CUSTOMER, t.saturating_sub(1))
            .add_edge(KANSAS_CITY_WAREHOUSE, CUSTOMER, t)
            .add_edge(SEATTLE_WAREHOUSE, CUSTOMER, t + 2);
        Ok(())
    }
}
