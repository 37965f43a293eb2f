//! Battery and balance-mechanism placement.
//!
//! Run these after supply, demand and fulfillment, and in this order:
//! drawdown before balancing demand, storing before balancing supply.
//! Each balancing module only covers what the battery module before it left.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use sc_core::{NodeId, Quantity, RunParameters, TimeIncrement};
use sc_module::{Action, Agent, Module, ServiceRegistry, SimResult, SimulationState};
use sc_network::{Network, NodeKind};

use super::{BALANCE_SINK, BALANCE_SOURCE, ELECTRICITY};
use crate::services::{DEMAND_FORECAST, ElectricityDemandForecast};

/// Forecast electricity shortfall of every gateway for the next tick:
/// forecast demand minus what is on hand and already on its way.
fn gateway_deficits(net: &Network, forecast_demand: Quantity) -> Vec<(NodeId, Quantity)> {
    net.nodes_of_kind(NodeKind::Gateway)
        .into_iter()
        .map(|g| (g, forecast_demand - net.in_flight_to(g, ELECTRICITY) - net.on_hand(g, ELECTRICITY)))
        .collect()
}

// ── Battery drawdown ──────────────────────────────────────────────────────────

/// Covers forecast substation deficits from battery stock.
///
/// Batteries are drained in network order, each transfer limited to what
/// the battery holds on hand.
pub struct BatteryDrawdown {
    demand:    Rc<RefCell<ElectricityDemandForecast>>,
    increment: TimeIncrement,
}

impl BatteryDrawdown {
    pub fn from_params(params: &RunParameters, services: &mut ServiceRegistry) -> SimResult<Self> {
        Ok(Self {
            demand:    services.load(DEMAND_FORECAST, params)?,
            increment: params.increment()?,
        })
    }
}

impl Module for BatteryDrawdown {
    fn name(&self) -> &str {
        "battery_drawdown"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for BatteryDrawdown {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let forecast = self.demand.borrow().forecast(state.date_time.advanced(self.increment));

        let deficits = gateway_deficits(net, forecast);
        let total_deficit: Quantity = deficits.iter().map(|(_, d)| (*d).max(0)).sum();
        if total_deficit == 0 {
            debug!("no forecast deficit");
            return Ok(Vec::new());
        }

        let mut batteries: Vec<(NodeId, Quantity)> = net
            .nodes_of_kind(NodeKind::Storage)
            .into_iter()
            .map(|b| (b, net.on_hand(b, ELECTRICITY)))
            .filter(|(_, stock)| *stock > 0)
            .collect();
        let stored: Quantity = batteries.iter().map(|(_, s)| s).sum();
        if stored == 0 {
            debug!("no stored electricity in the network");
            return Ok(Vec::new());
        }
        if total_deficit > stored {
            warn!(total_deficit, stored, "battery fleet cannot cover the forecast deficit; batteries will be depleted");
        }

        let mut actions = Vec::new();
        for (gateway, deficit) in deficits {
            let mut remaining = deficit;
            for (battery, stock) in batteries.iter_mut() {
                if remaining <= 0 {
                    break;
                }
                let amount = remaining.min(*stock);
                if amount == 0 {
                    continue;
                }
                *stock -= amount;
                remaining -= amount;
                debug!(
                    battery = net.name_of(*battery),
                    gateway = net.name_of(gateway),
                    amount,
                    "drawing down battery"
                );
                actions.push(Action::transfer(ELECTRICITY, *battery, gateway, amount, state.clock));
            }
            if remaining > 0 {
                debug!(gateway = net.name_of(gateway), remaining, "forecast deficit left uncovered");
            }
        }
        Ok(actions)
    }
}

// ── Balance excess demand ─────────────────────────────────────────────────────

/// Covers any forecast substation deficit still left by requesting
/// electricity from the balance source.
pub struct BalanceExcessDemand {
    demand:    Rc<RefCell<ElectricityDemandForecast>>,
    increment: TimeIncrement,
}

impl BalanceExcessDemand {
    pub fn from_params(params: &RunParameters, services: &mut ServiceRegistry) -> SimResult<Self> {
        Ok(Self {
            demand:    services.load(DEMAND_FORECAST, params)?,
            increment: params.increment()?,
        })
    }
}

impl Module for BalanceExcessDemand {
    fn name(&self) -> &str {
        "balance_excess_demand"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for BalanceExcessDemand {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let source = net.require_node(BALANCE_SOURCE)?;
        let forecast = self.demand.borrow().forecast(state.date_time.advanced(self.increment));

        let mut actions = Vec::new();
        for (gateway, deficit) in gateway_deficits(net, forecast) {
            if deficit <= 0 {
                debug!(gateway = net.name_of(gateway), "no deficit in next tick");
                continue;
            }
            debug!(gateway = net.name_of(gateway), deficit, "sourcing deficit from balance mechanism");
            actions.push(Action::inbound_shipment(ELECTRICITY, source, gateway, deficit, state.clock));
        }
        Ok(actions)
    }
}

// ── Store excess supply ───────────────────────────────────────────────────────

/// Moves surplus substation electricity into batteries, filling each in
/// network order up to its capacity.  A battery without a declared capacity
/// takes any amount.
pub struct StoreExcessSupply;

impl StoreExcessSupply {
    pub fn from_params(_params: &RunParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl Module for StoreExcessSupply {
    fn name(&self) -> &str {
        "store_excess_supply"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for StoreExcessSupply {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;

        let mut headroom: Vec<(NodeId, Quantity)> = net
            .nodes_of_kind(NodeKind::Storage)
            .into_iter()
            .filter_map(|b| {
                let node = net.node(b)?;
                let room = node.capacity(ELECTRICITY).map_or(Quantity::MAX, |cap| cap - node.on_hand(ELECTRICITY));
                Some((b, room))
            })
            .collect();

        let mut actions = Vec::new();
        for gateway in net.nodes_of_kind(NodeKind::Gateway) {
            let mut surplus = net.on_hand(gateway, ELECTRICITY);
            if surplus <= 0 {
                continue;
            }
            for (battery, room) in headroom.iter_mut() {
                if surplus == 0 {
                    break;
                }
                if *room <= 0 {
                    debug!(battery = net.name_of(*battery), "battery already full");
                    continue;
                }
                let amount = surplus.min(*room);
                *room -= amount;
                surplus -= amount;
                debug!(
                    gateway = net.name_of(gateway),
                    battery = net.name_of(*battery),
                    amount,
                    "storing surplus"
                );
                actions.push(Action::transfer(ELECTRICITY, gateway, *battery, amount, state.clock));
            }
            if surplus > 0 {
                debug!(gateway = net.name_of(gateway), surplus, "surplus left at substation");
            }
        }
        Ok(actions)
    }
}

// ── Balance excess supply ─────────────────────────────────────────────────────

/// Sends whatever surplus electricity remains at each substation to the
/// balance sink.
pub struct BalanceExcessSupply;

impl BalanceExcessSupply {
    pub fn from_params(_params: &RunParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl Module for BalanceExcessSupply {
    fn name(&self) -> &str {
        "balance_excess_supply"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for BalanceExcessSupply {
    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let sink = net.require_node(BALANCE_SINK)?;

        let mut actions = Vec::new();
        for gateway in net.nodes_of_kind(NodeKind::Gateway) {
            let surplus = net.on_hand(gateway, ELECTRICITY);
            if surplus > 0 {
                debug!(gateway = net.name_of(gateway), surplus, "disposing surplus to balance sink");
                actions.push(Action::outbound_shipment(ELECTRICITY, gateway, sink, surplus, state.clock));
            }
        }
        Ok(actions)
    }
}
