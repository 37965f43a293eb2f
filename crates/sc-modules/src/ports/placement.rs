use serde_json::Value;
use tracing::debug;

use sc_core::{NodeId, ResourceKind, RunParameters};
use sc_module::{Action, Agent, Context, Module, SimResult, SimulationState};
use sc_network::{Network, NodeKind};

/// Splits each gateway's stock evenly over the storage nodes it feeds.
///
/// Every tick, for every resource and gateway, each downstream storage node
/// receives `⌊on_hand / n⌋` units, `n` being the number of such nodes.  A
/// gateway holding fewer than `n` units keeps them.
pub struct EvenPortPlacement {
    resources: Vec<ResourceKind>,
}

impl EvenPortPlacement {
    pub fn from_params(_params: &RunParameters) -> SimResult<Self> {
        Ok(Self { resources: Vec::new() })
    }
}

fn downstream_storage(net: &Network, gateway: NodeId) -> Vec<NodeId> {
    net.outbound_edges(gateway)
        .map(|e| e.destination)
        .filter(|&d| net.node(d).is_some_and(|n| n.kind() == NodeKind::Storage))
        .collect()
}

impl Module for EvenPortPlacement {
    fn name(&self) -> &str {
        "placement"
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for EvenPortPlacement {
    fn reset(&mut self, ctx: &Context, _state: &SimulationState) -> SimResult<Option<Value>> {
        self.resources = ctx.resources().to_vec();
        Ok(None)
    }

    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let mut actions = Vec::new();
        for gateway in net.nodes_of_kind(NodeKind::Gateway) {
            let targets = downstream_storage(net, gateway);
            if targets.is_empty() {
                continue;
            }
            for resource in &self.resources {
                let share = net.on_hand(gateway, resource.as_str()) / targets.len() as i64;
                if share <= 0 {
                    continue;
                }
                debug!(gateway = net.name_of(gateway), resource = %resource, share, "spreading port stock");
                actions.extend(
                    targets
                        .iter()
                        .map(|&to| Action::transfer(resource.clone(), gateway, to, share, state.clock)),
                );
            }
        }
        Ok(actions)
    }
}
