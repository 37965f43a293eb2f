use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use sc_core::{EntityId, RunParameters};
use sc_module::{
    Action, ActionKind, Context, Metrics, Module, Reward, RuntimeError, ServiceRegistry, SimResult,
    SimulationState,
};
use sc_network::NodeKind;

use crate::services::{HOLDING_COST, HoldingCost};

/// Running totals for the tick in progress, logged and cleared when time
/// advances.
#[derive(Default, Debug)]
struct TickLedger {
    revenue:        f64,
    vendor_cost:    f64,
    transfer_cost:  f64,
    holding_cost:   f64,
    sales_quantity: i64,
}

/// Cash accounting for the newsvendor.
///
/// | Action             | Reward                                               |
/// |--------------------|------------------------------------------------------|
/// | `OutboundShipment` | `+price · quantity`                                  |
/// | `InboundShipment`  | `−cost · quantity`                                   |
/// | `Transfer`         | `−transfer_cost · quantity`, only when `transfer_cost` is set |
/// | `AdvanceTime`      | `−holding · on-hand` per stored resource, `−penalty · quantity` per newly seen customer order |
///
/// Any other action kind is an error.
pub struct CashAccounting {
    cost:                f64,
    price:               f64,
    lost_demand_penalty: f64,
    transfer_cost:       Option<f64>,
    holding:             Rc<RefCell<HoldingCost>>,

    seen_orders: HashSet<EntityId>,
    ledger:      TickLedger,
}

impl CashAccounting {
    pub const DEFAULT_COST: f64 = 5.0;
    pub const DEFAULT_PRICE: f64 = 10.0;

    pub fn from_params(params: &RunParameters, services: &mut ServiceRegistry) -> SimResult<Self> {
        Ok(Self {
            cost:                params.get_or("vendor_cost", Self::DEFAULT_COST)?,
            price:               params.get_or("customer_price", Self::DEFAULT_PRICE)?,
            lost_demand_penalty: params.get_or("lost_demand_penalty", 0.0)?,
            transfer_cost:       params.get_or("transfer_cost", None)?,
            holding:             services.load::<HoldingCost>(HOLDING_COST, params)?,
            seen_orders:         HashSet::new(),
            ledger:              TickLedger::default(),
        })
    }

    fn end_of_tick(&mut self, state: &SimulationState) -> SimResult<Reward> {
        let mut reward = Reward::zero();
        let net = &state.network;

        let holding = self.holding.borrow();
        for id in net.nodes_of_kind(NodeKind::Storage) {
            let Some(stock) = net.node(id).and_then(|n| n.inventory()) else { continue };
            for (resource, &on_hand) in stock {
                let cost = holding.cost(resource.as_str())? * on_hand as f64;
                self.ledger.holding_cost += cost;
                reward.credit(resource, -cost);
            }
        }

        let mut unfilled = 0;
        for order in &state.customer_orders {
            if self.seen_orders.insert(order.id) {
                unfilled += order.quantity;
                reward.credit(&order.resource, -self.lost_demand_penalty * order.quantity as f64);
            }
        }

        debug!(
            tick = %state.clock,
            revenue = self.ledger.revenue,
            vendor_cost = self.ledger.vendor_cost,
            transfer_cost = self.ledger.transfer_cost,
            holding_cost = self.ledger.holding_cost,
            customer_demand = self.ledger.sales_quantity + unfilled,
            sales = self.ledger.sales_quantity,
            unfilled,
            "newsvendor accounts"
        );
        self.ledger = TickLedger::default();
        Ok(reward)
    }
}

impl Module for CashAccounting {
    fn name(&self) -> &str {
        "cash_accounting"
    }
    fn as_metrics(&mut self) -> Option<&mut dyn Metrics> {
        Some(self)
    }
}

impl Metrics for CashAccounting {
    fn reset(&mut self, _ctx: &Context, _state: &SimulationState) -> SimResult<()> {
        self.seen_orders.clear();
        self.ledger = TickLedger::default();
        Ok(())
    }

    fn compute_reward(&mut self, state: &SimulationState, action: &Action) -> SimResult<Reward> {
        if action.kind == ActionKind::AdvanceTime {
            return self.end_of_tick(state);
        }
        let resource = action.resource.clone().ok_or(RuntimeError::MissingField {
            kind:  action.kind,
            field: "resource",
        })?;
        let quantity = action.quantity as f64;

        match (action.kind, self.transfer_cost) {
            (ActionKind::OutboundShipment, _) => {
                let revenue = self.price * quantity;
                self.ledger.revenue += revenue;
                self.ledger.sales_quantity += action.quantity;
                Ok(Reward::for_resource(resource, revenue))
            }
            (ActionKind::InboundShipment, _) => {
                let cost = self.cost * quantity;
                self.ledger.vendor_cost += cost;
                Ok(Reward::for_resource(resource, -cost))
            }
            (ActionKind::Transfer, Some(rate)) => {
                let cost = rate * quantity;
                self.ledger.transfer_cost += cost;
                Ok(Reward::for_resource(resource, -cost))
            }
            (kind, _) => Err(RuntimeError::UnsupportedAction {
                kind,
                reason: "newsvendor accounting prices transfers only when transfer_cost is set",
            }
            .into()),
        }
    }
}
