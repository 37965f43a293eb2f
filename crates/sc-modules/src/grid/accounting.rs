use std::collections::HashSet;

use tracing::debug;

use sc_core::{EntityId, NodeId, RunParameters, TimeIncrement};
use sc_module::{
    Action, ActionKind, Context, Metrics, Module, Reward, RuntimeError, SimResult, SimulationState,
};
use sc_network::{Network, NodeKind};

use super::{BALANCE_SINK, BALANCE_SOURCE};

const SECONDS_PER_YEAR: f64 = 365.0 * 86_400.0;

/// Prices, all per unit unless noted.
#[derive(Clone, Debug)]
struct Tariff {
    source_request:   f64,
    sink_deposit:     f64,
    battery_charging: f64,
    battery_drawdown: f64,
    transfer:         f64,
    holding_cost:     f64,
    lost_demand:      f64,
    /// Battery capital cost per unit of capacity (negative).
    battery_penalty:      f64,
    max_battery_capacity: f64,
    num_batteries:        f64,
    lifetime_years:       f64,
}

impl Tariff {
    fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            source_request:       params.get_or("source_request", -36.65)?,
            sink_deposit:         params.get_or("sink_deposit", -36.65)?,
            battery_charging:     params.get_or("battery_charging", 3.665)?,
            battery_drawdown:     params.get_or("battery_drawdown", 3.665)?,
            transfer:             params.get_or("transfer", 0.0)?,
            holding_cost:         params.get_or("holding_cost", 0.0)?,
            lost_demand:          params.get_or("lost_demand", 0.0)?,
            battery_penalty:      params.get_or("battery_penalty", -250_000.0)?,
            max_battery_capacity: params.get_or("max_battery_capacity", 100.0)?,
            num_batteries:        params.get_or("num_batteries", 1.0)?,
            lifetime_years:       params.get_or("lifetime_years", 10.0)?,
        })
    }

    /// The battery fleet's capital cost spread evenly over every tick of its
    /// lifetime.
    fn amortised_battery_cost(&self, increment: TimeIncrement) -> f64 {
        let upfront = self.battery_penalty * self.max_battery_capacity * self.num_batteries;
        let periods_per_year = SECONDS_PER_YEAR / increment.secs() as f64;
        upfront / (self.lifetime_years * periods_per_year)
    }
}

/// Cash accounting for the national grid.
///
/// | Action                               | Reward                        |
/// |--------------------------------------|-------------------------------|
/// | `InboundShipment` from Balance Source | `source_request · quantity`  |
/// | `OutboundShipment` to Balance Sink   | `sink_deposit · quantity`     |
/// | `Transfer` substation → battery      | `battery_charging · quantity` |
/// | `Transfer` battery → substation      | `battery_drawdown · quantity` |
/// | `AdvanceTime`                        | holding and lost-demand costs, plus the amortised battery cost after tick 0 |
///
/// Ordinary supply and consumer deliveries are free.
pub struct GridCashAccounting {
    tariff:    Tariff,
    increment: TimeIncrement,

    seen_orders: HashSet<EntityId>,
}

impl GridCashAccounting {
    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            tariff:      Tariff::from_params(params)?,
            increment:   params.increment()?,
            seen_orders: HashSet::new(),
        })
    }

    fn is_node(net: &Network, node: Option<NodeId>, name: &str) -> bool {
        node.is_some() && node == net.node_id(name)
    }

    fn kind_of(net: &Network, node: Option<NodeId>) -> Option<NodeKind> {
        node.and_then(|id| net.node(id)).map(|n| n.kind())
    }

    fn transfer_price(&self, net: &Network, action: &Action) -> f64 {
        match (Self::kind_of(net, action.origin), Self::kind_of(net, action.destination)) {
            (Some(NodeKind::Gateway), Some(NodeKind::Storage)) => self.tariff.battery_charging,
            (Some(NodeKind::Storage), Some(NodeKind::Gateway)) => self.tariff.battery_drawdown,
            _ => self.tariff.transfer,
        }
    }

    fn end_of_tick(&mut self, state: &SimulationState) -> Reward {
        let net = &state.network;
        let mut reward = Reward::zero();

        for id in net.nodes_of_kind(NodeKind::Storage) {
            let Some(stock) = net.node(id).and_then(|n| n.inventory()) else { continue };
            for (resource, &on_hand) in stock {
                reward.credit(resource, -self.tariff.holding_cost * on_hand as f64);
            }
        }

        for order in &state.customer_orders {
            if self.seen_orders.insert(order.id) {
                reward.credit(&order.resource, -self.tariff.lost_demand * order.quantity as f64);
            }
        }

        if state.clock.0 != 0 {
            let battery = self.tariff.amortised_battery_cost(self.increment);
            reward.total += battery;
            debug!(tick = %state.clock, battery, "amortised battery cost");
        }
        reward
    }
}

impl Module for GridCashAccounting {
    fn name(&self) -> &str {
        "cash_accounting"
    }
    fn as_metrics(&mut self) -> Option<&mut dyn Metrics> {
        Some(self)
    }
}

impl Metrics for GridCashAccounting {
    fn reset(&mut self, _ctx: &Context, _state: &SimulationState) -> SimResult<()> {
        self.seen_orders.clear();
        Ok(())
    }

    fn compute_reward(&mut self, state: &SimulationState, action: &Action) -> SimResult<Reward> {
        if action.kind == ActionKind::AdvanceTime {
            return Ok(self.end_of_tick(state));
        }
        let net = &state.network;
        let resource = action.resource.clone().ok_or(RuntimeError::MissingField {
            kind:  action.kind,
            field: "resource",
        })?;
        let quantity = action.quantity as f64;

        let price = match action.kind {
            ActionKind::InboundShipment if Self::is_node(net, action.origin, BALANCE_SOURCE) => {
                self.tariff.source_request
            }
            ActionKind::OutboundShipment if Self::is_node(net, action.destination, BALANCE_SINK) => {
                self.tariff.sink_deposit
            }
            ActionKind::InboundShipment | ActionKind::OutboundShipment => 0.0,
            ActionKind::Transfer => self.transfer_price(net, action),
            kind => {
                return Err(RuntimeError::UnsupportedAction {
                    kind,
                    reason: "grid accounting prices only shipments and transfers",
                }
                .into());
            }
        };
        let amount = price * quantity;
        if amount != 0.0 {
            debug!(kind = action.kind.as_str(), resource = %resource, amount, "grid cash flow");
        }
        Ok(Reward::for_resource(resource, amount))
    }
}
