use std::collections::BTreeMap;

use rand_distr::Poisson;
use serde_json::{Value, json};
use tracing::debug;

use sc_core::{CoreError, NodeId, Quantity, ResourceKind, RunParameters, SimRng};
use sc_module::{
    Action, ActionKind, Agent, Context, Module, RuntimeError, SimResult, SimulationState,
};
use sc_network::{NetworkError, NodeKind};

use super::{BUYING_STREAM, CUSTOMER_STREAM};
use crate::closest_node;

/// Default upper bound of the per-tick mean demand.
const DEFAULT_MAX_MEAN: f64 = 10.0;

fn module_rng(params: &RunParameters, stream: u64) -> SimRng {
    SimRng::new(params.simulation_seed).child(stream)
}

/// One Poisson draw with mean `mean`; a zero mean always yields zero.
fn poisson_draw(rng: &mut SimRng, mean: f64) -> SimResult<Quantity> {
    if mean <= 0.0 {
        return Ok(0);
    }
    let dist = Poisson::new(mean).map_err(|e| CoreError::InvalidParameter {
        name:   "customer_max_mean".to_owned(),
        reason: e.to_string(),
    })?;
    let draw: f64 = rng.sample(&dist);
    Ok(draw as Quantity)
}

/// Smallest `k` with `P(X <= k) >= q` for `X ~ Poisson(mean)`.
pub fn poisson_quantile(q: f64, mean: f64) -> Quantity {
    if mean <= 0.0 || q <= 0.0 {
        return 0;
    }
    let mut pmf = (-mean).exp();
    let mut cdf = pmf;
    let mut k: Quantity = 0;
    // The cap only matters for q within rounding of 1.
    while cdf < q && k < 10_000 {
        k += 1;
        pmf *= mean / k as f64;
        cdf += pmf;
    }
    k
}

// ── Customer ──────────────────────────────────────────────────────────────────

/// Retail demand.  Every tick, for every resource, orders
/// `max(1, Poisson(U · max_mean))` units, `U` uniform in `[0, 1)`.
///
/// Orders go to the node named by the `customer` parameter, or to the
/// network's only customer node when it is unset.
pub struct PoissonCustomer {
    rng:       SimRng,
    max_mean:  f64,
    customer:  Option<String>,
    target:    Option<NodeId>,
    resources: Vec<ResourceKind>,
}

impl PoissonCustomer {
    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            rng:       module_rng(params, CUSTOMER_STREAM),
            max_mean:  params.get_or("customer_max_mean", DEFAULT_MAX_MEAN)?,
            customer:  params.get_or("customer", None)?,
            target:    None,
            resources: Vec::new(),
        })
    }
}

impl Module for PoissonCustomer {
    fn name(&self) -> &str {
        "order_generator"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for PoissonCustomer {
    fn reset(&mut self, ctx: &Context, state: &SimulationState) -> SimResult<Option<Value>> {
        self.resources = ctx.resources().to_vec();
        let net = &state.network;
        let target = match &self.customer {
            Some(name) => net.require_node(name)?,
            None => net.sole_node_of_kind(NodeKind::Customer)?,
        };
        self.target = Some(target);
        Ok(Some(json!({ "customer": net.name_of(target), "max_mean": self.max_mean })))
    }

    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let customer = self.target.ok_or(RuntimeError::NotStarted)?;
        let mut actions = Vec::with_capacity(self.resources.len());
        for resource in &self.resources {
            let mean = self.rng.unit() * self.max_mean;
            let demand = poisson_draw(&mut self.rng, mean)?.max(1);
            debug!(customer = state.network.name_of(customer), resource = %resource, demand, "customer order");
            actions.push(Action::customer_order(resource.clone(), customer, demand, state.clock));
        }
        Ok(actions)
    }
}

// ── Buying ────────────────────────────────────────────────────────────────────

/// Order-up-to buying at the national level.
///
/// The target inventory position is the service-level quantile of Poisson
/// demand summed over the planning horizon.  On-hand stock plus stock in
/// flight to storage counts towards it.
pub struct ServiceLevelBuying {
    rng:              SimRng,
    service_level:    f64,
    planning_horizon: u32,
    max_mean:         f64,
    resources:        Vec<ResourceKind>,
}

impl ServiceLevelBuying {
    pub const DEFAULT_SERVICE_LEVEL: f64 = 0.9;
    pub const DEFAULT_PLANNING_HORIZON: u32 = 1;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            rng:              module_rng(params, BUYING_STREAM),
            service_level:    params.get_or("service_level", Self::DEFAULT_SERVICE_LEVEL)?,
            planning_horizon: params.get_or("planning_horizon", Self::DEFAULT_PLANNING_HORIZON)?,
            max_mean:         params.get_or("customer_max_mean", DEFAULT_MAX_MEAN)?,
            resources:        Vec::new(),
        })
    }

    fn target_position(&mut self) -> Quantity {
        (0..self.planning_horizon)
            .map(|_| {
                let mean = self.rng.unit() * self.max_mean;
                poisson_quantile(self.service_level, mean)
            })
            .sum()
    }
}

impl Module for ServiceLevelBuying {
    fn name(&self) -> &str {
        "buying"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for ServiceLevelBuying {
    fn reset(&mut self, ctx: &Context, _state: &SimulationState) -> SimResult<Option<Value>> {
        self.resources = ctx.resources().to_vec();
        Ok(None)
    }

    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let mut actions = Vec::new();
        for resource in self.resources.clone() {
            let target = self.target_position();
            let position = net.total_on_hand(resource.as_str())
                + net.in_flight_to_holding_nodes(resource.as_str());
            let quantity = (target - position).max(0);
            debug!(resource = %resource, target, position, quantity, "buying decision");
            if quantity > 0 {
                actions.push(Action::purchase_order(resource, quantity, state.clock));
            }
        }
        Ok(actions)
    }
}

// ── Vendor ────────────────────────────────────────────────────────────────────

/// A vendor with unlimited stock.  Ships every open purchase order in full,
/// immediately, to the closest stock-holding node it has an edge to.
pub struct InfiniteVendor;

impl InfiniteVendor {
    pub fn from_params(_params: &RunParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl Module for InfiniteVendor {
    fn name(&self) -> &str {
        "vendor"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for InfiniteVendor {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        if state.purchase_orders.is_empty() {
            return Ok(Vec::new());
        }
        let net = &state.network;
        let vendor = net.sole_node_of_kind(NodeKind::Vendor)?;
        let location = net.node(vendor).map(|n| n.location).unwrap_or_default();
        let receivers = net
            .outbound_edges(vendor)
            .map(|e| e.destination)
            .filter(|&d| net.node(d).is_some_and(|n| n.tracks_inventory()));
        let store = closest_node(net, receivers, location).ok_or_else(|| {
            NetworkError::MissingTopology(format!("{} has no edge to a stock-holding node", net.name_of(vendor)))
        })?;

        Ok(state
            .purchase_orders
            .iter()
            .map(|po| {
                debug!(order = %po.id, quantity = po.quantity, "shipping purchase order");
                Action::inbound_shipment(po.resource.clone(), vendor, store, po.quantity, state.clock)
                    .with_id(po.id)
            })
            .collect())
    }
}

// ── Fulfillment ───────────────────────────────────────────────────────────────

/// Serves each customer order from the closest storage node holding enough
/// stock for the whole order.  Stock promised to earlier orders this tick is
/// not offered again.  Orders nobody can serve stay open.
pub struct ClosestStorageFulfillment;

impl ClosestStorageFulfillment {
    pub fn from_params(_params: &RunParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl Module for ClosestStorageFulfillment {
    fn name(&self) -> &str {
        "fulfiller"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for ClosestStorageFulfillment {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;

        let mut available: BTreeMap<NodeId, BTreeMap<ResourceKind, Quantity>> = net
            .nodes_of_kind(NodeKind::Storage)
            .into_iter()
            .filter_map(|id| Some((id, net.node(id)?.inventory()?.clone())))
            .collect();

        let mut actions = Vec::new();
        for order in &state.customer_orders {
            let customer = order.destination.ok_or(RuntimeError::MissingField {
                kind:  ActionKind::CustomerOrder,
                field: "destination",
            })?;
            let to = net.node(customer).ok_or(NetworkError::UnknownNodeId(customer))?.location;

            let candidates = available
                .iter()
                .filter(|(_, stock)| stock.get(&order.resource).copied().unwrap_or(0) >= order.quantity)
                .map(|(id, _)| *id);
            let Some(store) = closest_node(net, candidates, to) else {
                debug!(order = %order.id, resource = %order.resource, "no store can fill order");
                continue;
            };

            debug!(order = %order.id, store = net.name_of(store), "fulfilling order");
            if let Some(stock) = available.get_mut(&store).and_then(|s| s.get_mut(&order.resource)) {
                *stock -= order.quantity;
            }
            actions.push(
                Action::outbound_shipment(order.resource.clone(), store, customer, order.quantity, order.schedule)
                    .with_id(order.id),
            );
        }
        Ok(actions)
    }
}
