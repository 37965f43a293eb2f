use tracing::debug;

use sc_core::{GeoPoint, Quantity, ResourceKind, ResourceSelection, RunParameters};
use sc_module::{ConfigError, Context, ContextBuilder, Environment, Module, SimResult};
use sc_network::{NetworkBuilder, Node};

use super::{CUSTOMER, DEFAULT_RESOURCE, MANUFACTURER, NEWSVENDOR};

/// Chooses the simulated resource kinds.
///
/// `resource_selection = 1` picks the default book; an explicit list is used
/// verbatim.  Any other code is rejected.
pub struct Selection {
    resources: Vec<ResourceKind>,
}

impl Selection {
    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        let resources = match &params.resource_selection {
            ResourceSelection::Count(1) => vec![ResourceKind::from(DEFAULT_RESOURCE)],
            ResourceSelection::Explicit(list) if !list.is_empty() => {
                list.iter().map(|r| ResourceKind::from(r.as_str())).collect()
            }
            ResourceSelection::Explicit(_) => {
                return Err(ConfigError::ResourceSelection("empty resource list".to_owned()).into());
            }
            ResourceSelection::Count(n) => {
                return Err(ConfigError::ResourceSelection(format!(
                    "the newsvendor demo supports a single resource, not code {n}"
                ))
                .into());
            }
        };
        debug!(?resources, "resources selected");
        Ok(Self { resources })
    }
}

impl Module for Selection {
    fn name(&self) -> &str {
        "resource_selection"
    }
    fn as_environment(&self) -> Option<&dyn Environment> {
        Some(self)
    }
}

impl Environment for Selection {
    fn contribute_context(&self, ctx: &mut ContextBuilder) -> SimResult<()> {
        ctx.set_resources(self.name(), self.resources.clone())
    }
}

/// The three-node newsvendor network.
pub struct Topology {
    initial_inventory: Quantity,
    transit_time:      u32,
}

impl Topology {
    pub const DEFAULT_INITIAL_INVENTORY: Quantity = 1;
    pub const DEFAULT_TRANSIT_TIME: u32 = 2;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            initial_inventory: params.get_or("initial_inventory", Self::DEFAULT_INITIAL_INVENTORY)?,
            transit_time:      params.get_or("transit_time", Self::DEFAULT_TRANSIT_TIME)?,
        })
    }
}

impl Module for Topology {
    fn name(&self) -> &str {
        "network"
    }
    fn as_environment(&self) -> Option<&dyn Environment> {
        Some(self)
    }
}

impl Environment for Topology {
    fn contribute_network(&self, ctx: &Context, network: &mut NetworkBuilder) -> SimResult<()> {
        let resources = ctx.resources();

        network.add_node(Node::vendor(
            MANUFACTURER,
            GeoPoint::new(39.0997, -94.5786),
            resources.iter().cloned(),
        ));

        let mut store = Node::storage(NEWSVENDOR, GeoPoint::new(41.743_616_9, -92.728_129_1));
        for r in resources {
            store = store.with_stock(r.clone(), self.initial_inventory);
        }
        network.add_node(store);
        network.add_node(Node::customer(CUSTOMER, GeoPoint::new(41.833_903_7, -87.872_046_8)));

        network
            .add_edge(MANUFACTURER, NEWSVENDOR, self.transit_time)
            .add_edge(NEWSVENDOR, CUSTOMER, self.transit_time);
        Ok(())
    }
}
