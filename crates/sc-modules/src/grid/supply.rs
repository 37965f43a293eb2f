use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use sc_core::{NodeId, Quantity, ResourceKind, RunParameters};
use sc_module::{Action, Agent, Module, ServiceRegistry, SimResult, SimulationState};
use sc_network::{Network, NetworkError, Node, NodeKind};

use super::BALANCE_SOURCE;
use crate::services::{ElectricitySupplyForecast, SUPPLY_FORECAST};

/// The one resource a generation source produces.
fn generation_type(node: &Node) -> SimResult<&ResourceKind> {
    match node.produces() {
        [only] => Ok(only),
        other => Err(NetworkError::MissingTopology(format!(
            "source {:?} must produce exactly one resource, produces {}",
            node.name,
            other.len()
        ))
        .into()),
    }
}

/// Every vendor node with its generation type.
fn sources(net: &Network) -> SimResult<Vec<(NodeId, &Node, &ResourceKind)>> {
    net.nodes_of_kind(NodeKind::Vendor)
        .into_iter()
        .filter_map(|id| net.node(id).map(|n| (id, n)))
        .map(|(id, n)| generation_type(n).map(|r| (id, n, r)))
        .collect()
}

/// Every source, the balance source included, ships a fixed amount into the
/// substation each tick.
pub struct ConstantSupply {
    amount: Quantity,
}

impl ConstantSupply {
    pub const DEFAULT_AMOUNT: Quantity = 10;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self { amount: params.get_or("constant_supply_amount", Self::DEFAULT_AMOUNT)? })
    }
}

impl Module for ConstantSupply {
    fn name(&self) -> &str {
        "vendor"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for ConstantSupply {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let substation = net.sole_node_of_kind(NodeKind::Gateway)?;
        Ok(sources(net)?
            .into_iter()
            .map(|(id, node, resource)| {
                debug!(source = %node.name, resource = %resource, quantity = self.amount, "constant supply");
                Action::inbound_shipment(resource.clone(), id, substation, self.amount, state.clock)
            })
            .collect())
    }
}

/// Every generation source ships its forecast output into the substation
/// each tick.  The balance source is left to the balancing modules.
pub struct ForecastSupply {
    forecast: Rc<RefCell<ElectricitySupplyForecast>>,
}

impl ForecastSupply {
    pub fn from_params(params: &RunParameters, services: &mut ServiceRegistry) -> SimResult<Self> {
        Ok(Self { forecast: services.load(SUPPLY_FORECAST, params)? })
    }
}

impl Module for ForecastSupply {
    fn name(&self) -> &str {
        "vendor"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for ForecastSupply {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let substation = net.sole_node_of_kind(NodeKind::Gateway)?;
        let forecast = self.forecast.borrow();

        let mut actions = Vec::new();
        for (id, node, resource) in sources(net)? {
            if node.name == BALANCE_SOURCE {
                continue;
            }
            let quantity = forecast.forecast(resource.as_str(), state.date_time)?;
            debug!(source = %node.name, resource = %resource, quantity, "forecast supply");
            actions.push(Action::inbound_shipment(resource.clone(), id, substation, quantity, state.clock));
        }
        Ok(actions)
    }
}
