//! Integration tests for sc-sim.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use serde_json::json;

use sc_core::{Calendar, DateTime, EntityId, GeoPoint, RunParameters, Tick, TimeIncrement};
use sc_module::{
    Action, ActionKind, Agent, Context, ContextBuilder, Environment, LoadedModules, Metrics,
    Module, ModuleRegistry, Profile, Reward, RuntimeError, ServiceRegistry, SimError, SimResult,
    SimulationState, StepReward,
};
use sc_network::{NetworkBuilder, NetworkError, Node};

use crate::{Phase, RunStatus, SimBuilder, SimObserver, SupplyChainSim, TimeProfile};

// ── Helpers ───────────────────────────────────────────────────────────────────

const BOOK: &str = "book";

/// factory → shop (5 books) → buyer, transit 2 on both edges.
struct Line;

impl Module for Line {
    fn name(&self) -> &str {
        "line"
    }
    fn as_environment(&self) -> Option<&dyn Environment> {
        Some(self)
    }
}

impl Environment for Line {
    fn contribute_context(&self, ctx: &mut ContextBuilder) -> SimResult<()> {
        ctx.set_resources("line", vec![BOOK.into()])?;
        ctx.insert("line", json!({ "transit": 2 }))
    }

    fn contribute_network(&self, _ctx: &Context, network: &mut NetworkBuilder) -> SimResult<()> {
        let here = GeoPoint::new(0.0, 0.0);
        network.add_node(Node::vendor("factory", here, [BOOK]));
        network.add_node(Node::storage("shop", here).with_stock(BOOK, 5));
        network.add_node(Node::customer("buyer", here));
        network.add_edge("factory", "shop", 2).add_edge("shop", "buyer", 2);
        Ok(())
    }

    fn initial_state(&self, _ctx: &Context) -> SimResult<Option<serde_json::Value>> {
        Ok(Some(json!({ "built": true })))
    }
}

/// What a scripted agent does at one tick.
#[derive(Clone)]
enum Step {
    Ship { from: &'static str, to: &'static str, quantity: i64, delay: u64 },
    Raw(Action),
}

/// Emits a fixed list of actions per tick and records the shop's stock each
/// time it is asked.
struct Script {
    name:  &'static str,
    plan:  Vec<(u64, Step)>,
    seen:  Rc<RefCell<Vec<i64>>>,
}

impl Script {
    fn new(name: &'static str, plan: Vec<(u64, Step)>) -> Self {
        Self { name, plan, seen: Rc::default() }
    }
}

impl Module for Script {
    fn name(&self) -> &str {
        self.name
    }
    fn as_agent(&mut self) -> Option<&mut dyn Agent> {
        Some(self)
    }
}

impl Agent for Script {
    fn reset(&mut self, _ctx: &Context, _state: &SimulationState) -> SimResult<Option<serde_json::Value>> {
        Ok(Some(json!({ "steps": self.plan.len() })))
    }

    fn compute_actions(&mut self, state: &SimulationState) -> SimResult<Vec<Action>> {
        let net = &state.network;
        let shop = net.require_node("shop")?;
        self.seen.borrow_mut().push(net.on_hand(shop, BOOK));

        let mut out = Vec::new();
        for (tick, step) in &self.plan {
            if *tick != state.clock.0 {
                continue;
            }
            out.push(match step {
                Step::Ship { from, to, quantity, delay } => Action::transfer(
                    BOOK,
                    net.require_node(from)?,
                    net.require_node(to)?,
                    *quantity,
                    state.clock + *delay,
                ),
                Step::Raw(a) => a.clone(),
            });
        }
        Ok(out)
    }
}

/// Rewards each shipped unit with +1 and every tick with -0.5.
struct Tally;

impl Module for Tally {
    fn name(&self) -> &str {
        "tally"
    }
    fn as_metrics(&mut self) -> Option<&mut dyn Metrics> {
        Some(self)
    }
}

impl Metrics for Tally {
    fn reset(&mut self, _ctx: &Context, _state: &SimulationState) -> SimResult<()> {
        Ok(())
    }

    fn compute_reward(&mut self, _state: &SimulationState, action: &Action) -> SimResult<Reward> {
        Ok(match (&action.kind, &action.resource) {
            (ActionKind::AdvanceTime, _) => Reward { total: -0.5, ..Reward::zero() },
            (_, Some(r)) => Reward::for_resource(r.clone(), action.quantity as f64),
            (_, None) => Reward::zero(),
        })
    }
}

fn daily(horizon: u64) -> RunParameters {
    RunParameters { time_horizon: horizon, ..RunParameters::default() }
}

/// Controller over `agents` with the `Line` environment and `Tally` metrics.
fn sim_with(horizon: u64, agents: Vec<Box<dyn Module>>) -> SupplyChainSim {
    let params = daily(horizon);
    let mut modules: Vec<Box<dyn Module>> = vec![Box::new(Line)];
    modules.extend(agents);
    let loaded = LoadedModules {
        metrics:  Box::new(Tally),
        modules,
        services: ServiceRegistry::new(),
    };
    let calendar = Calendar {
        start:     DateTime::from_ymd(2019, 1, 1).unwrap(),
        increment: TimeIncrement::Daily,
    };
    SupplyChainSim::from_parts(params, calendar, loaded, BTreeSet::new(), TimeProfile::new())
}

fn shipper(quantity: i64, delay: u64) -> Box<dyn Module> {
    Box::new(Script::new(
        "shipper",
        vec![(0, Step::Ship { from: "shop", to: "buyer", quantity, delay })],
    ))
}

fn shop_stock(sim: &SupplyChainSim) -> i64 {
    let net = &sim.state().unwrap().network;
    net.on_hand(net.node_id("shop").unwrap(), BOOK)
}

fn delivered(sim: &SupplyChainSim) -> i64 {
    sim.state().unwrap().network.total_delivered(BOOK)
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn next_before_start_is_rejected() {
        let mut sim = sim_with(3, vec![]);
        assert_eq!(sim.phase(), Phase::Ready);
        assert!(matches!(sim.next(), Err(SimError::Runtime(RuntimeError::NotStarted))));
    }

    #[test]
    fn clock_and_date_advance_to_horizon() {
        let mut sim = sim_with(3, vec![]);
        let state = sim.start().unwrap();
        assert_eq!(state.clock, Tick(0));
        assert_eq!(state.date_time.to_string(), "2019-01-01 00:00:00");

        assert_eq!(sim.run().unwrap(), RunStatus::Completed);
        let state = sim.state().unwrap();
        assert_eq!(state.clock, Tick(3));
        assert_eq!(state.date_time.to_string(), "2019-01-04 00:00:00");
        assert_eq!(sim.phase(), Phase::Terminated);
    }

    #[test]
    fn stepping_past_horizon_is_an_error() {
        let mut sim = sim_with(1, vec![]);
        sim.start().unwrap();
        sim.next().unwrap();
        assert!(matches!(
            sim.next(),
            Err(SimError::Runtime(RuntimeError::EpisodeTerminated(Tick(1))))
        ));
    }

    #[test]
    fn zero_horizon_terminates_immediately() {
        let mut sim = sim_with(0, vec![]);
        sim.start().unwrap();
        assert_eq!(sim.phase(), Phase::Terminated);
        assert_eq!(sim.run().unwrap(), RunStatus::Completed);
        assert_eq!(sim.clock(), Tick(0));
    }

    #[test]
    fn initial_fragments_are_stored_by_module_name() {
        let mut sim = sim_with(2, vec![shipper(1, 0)]);
        let state = sim.start().unwrap();
        assert_eq!(state.module_state("line"), Some(&json!({ "built": true })));
        assert_eq!(state.module_state("shipper"), Some(&json!({ "steps": 1 })));
        assert!(sim.context().has_resource(BOOK));
        assert_eq!(sim.context().get("line"), Some(&json!({ "transit": 2 })));
    }

    #[test]
    fn restart_begins_a_fresh_episode() {
        let mut sim = sim_with(3, vec![shipper(2, 0)]);
        sim.run().unwrap();
        assert_eq!(shop_stock(&sim), 3);

        let state = sim.start().unwrap();
        assert_eq!(state.clock, Tick(0));
        assert_eq!(sim.episode_reward(), 0.0);
        assert_eq!(shop_stock(&sim), 5);
        assert_eq!(sim.phase(), Phase::Running);
    }

    #[test]
    fn low_level_protocol_matches_high_level() {
        let mut sim = sim_with(4, vec![shipper(2, 0)]);
        let (ctx, mut state) = sim.get_initial_env_values().unwrap();
        sim.reset_agents(&ctx, &mut state).unwrap();
        let mut backlog = Vec::new();
        let mut last = None;
        while state.clock < Tick(4) {
            last = Some(sim.step(&mut state, &mut backlog).unwrap());
        }

        let mut high = sim_with(4, vec![shipper(2, 0)]);
        high.run().unwrap();
        assert_eq!(last.unwrap().episode_total, high.episode_reward());
        assert_eq!(state.network.total_delivered(BOOK), delivered(&high));
    }
}

// ── Shipments and orders ──────────────────────────────────────────────────────

#[cfg(test)]
mod execution {
    use super::*;

    #[test]
    fn shipment_arrives_after_transit_ticks() {
        let mut sim = sim_with(5, vec![shipper(2, 0)]);
        sim.start().unwrap();

        sim.next().unwrap();
        assert_eq!(shop_stock(&sim), 3);
        assert_eq!(sim.edges().iter().map(|e| e.shipments().len()).sum::<usize>(), 1);

        sim.next().unwrap();
        assert_eq!(delivered(&sim), 0);
        sim.next().unwrap();
        assert_eq!(delivered(&sim), 2);
        assert!(sim.edges().iter().all(|e| e.shipments().is_empty()));
    }

    #[test]
    fn insufficient_stock_leaves_state_untouched() {
        let mut sim = sim_with(3, vec![shipper(9, 0)]);
        sim.start().unwrap();

        let err = sim.next().unwrap_err();
        assert!(matches!(
            err,
            SimError::Network(NetworkError::InsufficientInventory { requested: 9, available: 5, .. })
        ));
        let state = sim.state().unwrap();
        assert_eq!(shop_stock(&sim), 5);
        assert_eq!(state.ids.allocated(), 0);
        assert_eq!(state.clock, Tick(0));
        assert!(sim.edges().iter().all(|e| e.shipments().is_empty()));
    }

    #[test]
    fn future_actions_wait_in_backlog() {
        let mut sim = sim_with(4, vec![shipper(2, 1)]);
        sim.start().unwrap();

        sim.next().unwrap();
        assert_eq!(sim.backlog().len(), 1);
        assert_eq!(shop_stock(&sim), 5);

        sim.next().unwrap();
        assert!(sim.backlog().is_empty());
        assert_eq!(shop_stock(&sim), 3);
    }

    #[test]
    fn injected_action_runs_with_next_agent_round() {
        let idle = Box::new(Script::new("idle", vec![]));
        let mut sim = sim_with(3, vec![idle]);
        let state = sim.start().unwrap();
        let shop = state.network.node_id("shop").unwrap();
        let buyer = state.network.node_id("buyer").unwrap();

        sim.inject(Action::outbound_shipment(BOOK, shop, buyer, 1, Tick(0)));
        sim.next().unwrap();
        assert_eq!(shop_stock(&sim), 4);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut sim = sim_with(3, vec![shipper(-1, 0)]);
        sim.start().unwrap();
        assert!(matches!(
            sim.next(),
            Err(SimError::Runtime(RuntimeError::NegativeQuantity { quantity: -1, .. }))
        ));
    }

    #[test]
    fn advance_time_from_an_agent_is_rejected() {
        let rogue = Script::new("rogue", vec![(0, Step::Raw(Action::advance_time(Tick(0))))]);
        let mut sim = sim_with(3, vec![Box::new(rogue)]);
        sim.start().unwrap();
        assert!(matches!(
            sim.next(),
            Err(SimError::Runtime(RuntimeError::UnsupportedAction { kind: ActionKind::AdvanceTime, .. }))
        ));
    }

    #[test]
    fn orders_are_recorded_and_consumed_by_shipments() {
        let order = Action::purchase_order(BOOK, 4, Tick(0));
        let buyer = Script::new("buyer", vec![(0, Step::Raw(order))]);
        let mut sim = sim_with(3, vec![Box::new(buyer)]);
        sim.start().unwrap();
        sim.next().unwrap();

        let state = sim.state().unwrap();
        assert_eq!(state.purchase_orders.len(), 1);
        let id = state.purchase_orders[0].id;
        let factory = state.network.node_id("factory").unwrap();
        let shop = state.network.node_id("shop").unwrap();

        // Same id replaces the order instead of duplicating it.
        sim.inject(Action::purchase_order(BOOK, 6, Tick(1)).with_id(id));
        sim.next().unwrap();
        let state = sim.state().unwrap();
        assert_eq!(state.purchase_orders.len(), 1);
        assert_eq!(state.purchase_orders[0].quantity, 6);

        // Fulfilling it removes the order and keeps the id.
        sim.inject(Action::inbound_shipment(BOOK, factory, shop, 6, Tick(2)).with_id(id));
        sim.next().unwrap();
        let state = sim.state().unwrap();
        assert!(state.purchase_orders.is_empty());
        assert_eq!(sim.edges().iter().flat_map(|e| e.shipments()).next().unwrap().id, id);
    }

    #[test]
    fn caller_supplied_ids_are_not_reissued() {
        let idle = Box::new(Script::new("idle", vec![]));
        let mut sim = sim_with(3, vec![idle]);
        let state = sim.start().unwrap();
        let buyer = state.network.node_id("buyer").unwrap();

        sim.inject(Action::purchase_order(BOOK, 2, Tick(0)).with_id(EntityId(0)));
        sim.inject(Action::customer_order(BOOK, buyer, 1, Tick(0)));
        sim.next().unwrap();

        let state = sim.state().unwrap();
        let purchase = state.purchase_orders[0].id;
        let customer = state.customer_orders[0].id;
        assert_eq!(purchase, EntityId(0));
        assert_ne!(purchase, customer);
        assert!(state.ids.allocated() > customer.0);
    }

    #[test]
    fn failed_tick_ends_the_episode_and_keeps_the_backlog() {
        let plan = vec![
            (0, Step::Ship { from: "shop", to: "buyer", quantity: 1, delay: 3 }),
            (0, Step::Ship { from: "shop", to: "buyer", quantity: 9, delay: 0 }),
        ];
        let mut sim = sim_with(5, vec![Box::new(Script::new("greedy", plan))]);
        sim.start().unwrap();

        assert!(sim.next().is_err());
        assert_eq!(sim.phase(), Phase::Failed);
        assert_eq!(sim.backlog().len(), 2);
        assert_eq!(sim.backlog()[0].schedule, Tick(3));
        assert_eq!(sim.backlog()[1].quantity, 9);

        assert!(matches!(
            sim.next(),
            Err(SimError::Runtime(RuntimeError::EpisodeFailed(Tick(0))))
        ));
        assert!(sim.run().is_err());
        assert_eq!(sim.clock(), Tick(0));

        sim.start().unwrap();
        assert_eq!(sim.phase(), Phase::Running);
        assert!(sim.backlog().is_empty());
    }

    #[test]
    fn shipment_without_endpoints_is_rejected() {
        let bad = Action::purchase_order(BOOK, 1, Tick(0));
        let bad = Action { kind: ActionKind::Transfer, ..bad };
        let agent = Script::new("bad", vec![(0, Step::Raw(bad))]);
        let mut sim = sim_with(3, vec![Box::new(agent)]);
        sim.start().unwrap();
        assert!(matches!(
            sim.next(),
            Err(SimError::Runtime(RuntimeError::MissingField { field: "origin", .. }))
        ));
    }
}

// ── Agent ordering ────────────────────────────────────────────────────────────

#[cfg(test)]
mod ordering {
    use super::*;

    fn watcher() -> (Box<dyn Module>, Rc<RefCell<Vec<i64>>>) {
        let p = Script::new("watcher", vec![]);
        let seen = p.seen.clone();
        (Box::new(p), seen)
    }

    #[test]
    fn later_agents_see_earlier_agents_effects() {
        let (p, seen) = watcher();
        let mut sim = sim_with(1, vec![shipper(2, 0), p]);
        sim.run().unwrap();
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn earlier_agents_do_not_see_later_effects() {
        let (p, seen) = watcher();
        let mut sim = sim_with(1, vec![p, shipper(2, 0)]);
        sim.run().unwrap();
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn first_agent_wins_contested_stock() {
        let a = Script::new("a", vec![(0, Step::Ship { from: "shop", to: "buyer", quantity: 4, delay: 0 })]);
        let b = Script::new("b", vec![(0, Step::Ship { from: "shop", to: "buyer", quantity: 4, delay: 0 })]);
        let mut sim = sim_with(1, vec![Box::new(a), Box::new(b)]);
        sim.start().unwrap();
        assert!(matches!(
            sim.next(),
            Err(SimError::Network(NetworkError::InsufficientInventory { available: 1, .. }))
        ));
    }
}

// ── Rewards ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rewards {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        ticks:  Vec<Tick>,
        totals: Vec<f64>,
        ended:  Option<Tick>,
    }

    impl SimObserver for Recorder {
        fn on_tick_end(&mut self, tick: Tick, _state: &SimulationState, reward: &StepReward) {
            self.ticks.push(tick);
            self.totals.push(reward.timestep.total);
        }
        fn on_sim_end(&mut self, final_tick: Tick, _state: &SimulationState) {
            self.ended = Some(final_tick);
        }
    }

    #[test]
    fn episode_reward_is_sum_of_timesteps() {
        let mut sim = sim_with(4, vec![shipper(3, 0)]);
        let mut rec = Recorder::default();
        sim.run_with(&mut rec).unwrap();

        assert_eq!(rec.ticks, vec![Tick(0), Tick(1), Tick(2), Tick(3)]);
        assert_eq!(rec.totals, vec![2.5, -0.5, -0.5, -0.5]);
        assert_eq!(rec.ended, Some(Tick(4)));
        let sum: f64 = rec.totals.iter().sum();
        assert!((sim.episode_reward() - sum).abs() < 1e-9);
    }

    #[test]
    fn timestep_reward_lists_every_context_resource() {
        let mut sim = sim_with(2, vec![]);
        sim.start().unwrap();
        let r = sim.next().unwrap();
        assert_eq!(r.timestep.by_resource.len(), 1);
        assert_eq!(r.timestep.of(BOOK), 0.0);
        assert_eq!(r.episode_total, -0.5);
    }
}

// ── Breakpoints ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod breakpoints {
    use super::*;

    #[test]
    fn run_halts_at_breakpoint_and_resumes() {
        let mut sim = sim_with(5, vec![]);
        sim.set_breakpoints([Tick(2), Tick(4)]);

        assert_eq!(sim.run().unwrap(), RunStatus::Breakpoint(Tick(2)));
        assert_eq!(sim.clock(), Tick(2));
        assert_eq!(sim.run().unwrap(), RunStatus::Breakpoint(Tick(4)));
        assert_eq!(sim.run().unwrap(), RunStatus::Completed);
        assert_eq!(sim.clock(), Tick(5));
    }

    #[test]
    fn breakpoint_at_start_tick_is_ignored() {
        let mut sim = sim_with(2, vec![]);
        sim.set_breakpoints([Tick(0)]);
        assert_eq!(sim.run().unwrap(), RunStatus::Completed);
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    fn line(_: &RunParameters, _: &mut ServiceRegistry) -> SimResult<Box<dyn Module>> {
        Ok(Box::new(Line))
    }

    fn tally(_: &RunParameters, _: &mut ServiceRegistry) -> SimResult<Box<dyn Module>> {
        Ok(Box::new(Tally))
    }

    fn registry() -> ModuleRegistry {
        let mut r = ModuleRegistry::new();
        r.register_module("test.line", line)
            .register_module("test.tally", tally)
            .register_profile("test", Profile::new(["test.tally"], ["test.line"]));
        r
    }

    fn params() -> RunParameters {
        RunParameters { profile: "test".into(), time_horizon: 3, ..RunParameters::default() }
    }

    #[test]
    fn builds_from_registry_profile() {
        let r = registry();
        let mut sim = SimBuilder::new(&r, params()).breakpoints([Tick(1)]).build().unwrap();
        assert_eq!(sim.module_names(), vec!["line"]);
        assert_eq!(sim.horizon(), Tick(3));
        assert_eq!(sim.run().unwrap(), RunStatus::Breakpoint(Tick(1)));
    }

    #[test]
    fn two_metrics_modules_fail_before_any_tick() {
        let r = registry();
        let profile = Profile::new(["test.tally", "test.tally"], ["test.line"]);
        let err = SimBuilder::new(&r, params()).profile(profile).build().err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn unsupported_increment_is_a_config_error() {
        let r = registry();
        let p = RunParameters { time_increment: "weekly".into(), ..params() };
        let err = SupplyChainSim::new(&r, p).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn half_hourly_calendar_advances_thirty_minutes() {
        let r = registry();
        let p = RunParameters { time_increment: "half-hourly".into(), ..params() };
        let mut sim = SupplyChainSim::new(&r, p).unwrap();
        assert_eq!(sim.increment(), TimeIncrement::HalfHourly);
        sim.start().unwrap();
        sim.next().unwrap();
        assert_eq!(sim.state().unwrap().date_time.to_string(), "2019-01-01 00:30:00");
    }
}
