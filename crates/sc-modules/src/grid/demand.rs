use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use tracing::debug;

use sc_core::{NodeId, Quantity, ResourceKind, RunParameters};
use sc_module::{
    Action, ActionKind, Agent, Context, Module, RuntimeError, ServiceRegistry, SimResult,
    SimulationState,
};
use sc_network::{NetworkError, NodeKind};

use super::{CONSUMERS, ELECTRICITY};
use crate::closest_node;
use crate::services::{DEMAND_FORECAST, ElectricityDemandForecast};

fn demand_resource(params: &RunParameters) -> SimResult<ResourceKind> {
    Ok(ResourceKind::new(params.get_or("constant_demand_asin", ELECTRICITY.to_owned())?))
}

fn demand_customer(params: &RunParameters) -> SimResult<String> {
    Ok(params.get_or("constant_demand_customer", CONSUMERS.to_owned())?)
}

/// A single customer ordering a fixed amount every tick.
pub struct ConstantDemand {
    amount:   Quantity,
    resource: ResourceKind,
    customer: String,
    target:   Option<NodeId>,
}

impl ConstantDemand {
    pub const DEFAULT_AMOUNT: Quantity = 10;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            amount:   params.get_or("constant_demand_amount", Self::DEFAULT_AMOUNT)?,
            resource: demand_resource(params)?,
            customer: demand_customer(params)?,
            target:   None,
        })
    }
}

impl Module for ConstantDemand {
    fn name(&self) -> &str {
        "constant_demand"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for ConstantDemand {
    fn reset(&mut self, _ctx: &Context, state: &SimulationState) -> SimResult<Option<Value>> {
        self.target = Some(state.network.require_node(&self.customer)?);
        Ok(Some(json!({ "customer": self.customer, "amount": self.amount })))
    }

    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let customer = self.target.ok_or(RuntimeError::NotStarted)?;
        debug!(customer = %self.customer, resource = %self.resource, quantity = self.amount, "constant demand");
        Ok(vec![Action::customer_order(self.resource.clone(), customer, self.amount, state.clock)])
    }
}

/// A single customer ordering the demand forecast for the current time
/// every tick.
pub struct ForecastDemand {
    forecast: Rc<RefCell<ElectricityDemandForecast>>,
    resource: ResourceKind,
    customer: String,
    target:   Option<NodeId>,
}

impl ForecastDemand {
    pub fn from_params(params: &RunParameters, services: &mut ServiceRegistry) -> SimResult<Self> {
        Ok(Self {
            forecast: services.load(DEMAND_FORECAST, params)?,
            resource: demand_resource(params)?,
            customer: demand_customer(params)?,
            target:   None,
        })
    }
}

impl Module for ForecastDemand {
    fn name(&self) -> &str {
        "constant_demand"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for ForecastDemand {
    fn reset(&mut self, _ctx: &Context, state: &SimulationState) -> SimResult<Option<Value>> {
        self.target = Some(state.network.require_node(&self.customer)?);
        Ok(None)
    }

    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let customer = self.target.ok_or(RuntimeError::NotStarted)?;
        let quantity = self.forecast.borrow().forecast(state.date_time);
        debug!(customer = %self.customer, resource = %self.resource, quantity, "forecast demand");
        Ok(vec![Action::customer_order(self.resource.clone(), customer, quantity, state.clock)])
    }
}

/// Serves every electricity order from the substation closest to the
/// customer, in full.  Substations may run negative.
pub struct ClosestGatewayFulfillment;

impl ClosestGatewayFulfillment {
    pub fn from_params(_params: &RunParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl Module for ClosestGatewayFulfillment {
    fn name(&self) -> &str {
        "fulfiller"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for ClosestGatewayFulfillment {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let gateways = net.nodes_of_kind(NodeKind::Gateway);
        if gateways.is_empty() {
            return Err(NetworkError::MissingTopology("no gateway (substation) node".to_owned()).into());
        }

        let mut actions = Vec::with_capacity(state.customer_orders.len());
        for order in &state.customer_orders {
            if order.resource.as_str() != ELECTRICITY {
                return Err(RuntimeError::UnsupportedAction {
                    kind:   ActionKind::CustomerOrder,
                    reason: "substations only fulfil electricity orders",
                }
                .into());
            }
            let customer = order.destination.ok_or(RuntimeError::MissingField {
                kind:  ActionKind::CustomerOrder,
                field: "destination",
            })?;
            let to = net.node(customer).ok_or(NetworkError::UnknownNodeId(customer))?.location;
            let Some(gateway) = closest_node(net, gateways.iter().copied(), to) else { continue };

            debug!(order = %order.id, gateway = net.name_of(gateway), "fulfilling order");
            actions.push(
                Action::outbound_shipment(order.resource.clone(), gateway, customer, order.quantity, order.schedule)
                    .with_id(order.id),
            );
        }
        Ok(actions)
    }
}
