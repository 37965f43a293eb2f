//! The `SupplyChainSim` controller and its per-tick algorithm.

use std::collections::BTreeSet;
use std::mem;
use std::time::Instant;

use tracing::{debug, info, warn};

use sc_core::{Calendar, EntityId, RunParameters, Tick, TimeIncrement};
use sc_module::{
    Action, ConfigError, Context, ContextBuilder, LoadedModules, Metrics, Module, ModuleRegistry,
    Order, OrderKind, Reward, RuntimeError, ServiceRegistry, SimResult, SimulationState,
    StepReward,
};
use sc_network::{Dispatch, Edge, NetworkBuilder};

use crate::{NoopObserver, SimBuilder, SimObserver, TimeProfile};

/// Lifecycle of one episode.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Modules constructed; no state yet.
    Ready,
    /// Initial state built and agents reset; `step` may be called.
    Running,
    /// The clock reached the horizon.
    Terminated,
    /// A tick returned an error.  The state is left as the error found it
    /// and no further tick is processed.
    Failed,
}

/// Why [`SupplyChainSim::run`] returned.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunStatus {
    Completed,
    /// Halted before processing this tick.
    Breakpoint(Tick),
}

/// The simulation controller.
///
/// Owns the modules, the service registry, the episode context and, once
/// started, the simulation state and action backlog.  It is the only writer
/// of the state.
///
/// Two levels of API are offered:
///
/// * Low level, caller owns the state: [`get_initial_env_values`],
///   [`reset_agents`], [`step`], [`execute_actions`].
/// * High level, state kept inside: [`start`], [`next`], [`run`],
///   [`inject`], [`state`].
///
/// [`get_initial_env_values`]: Self::get_initial_env_values
/// [`reset_agents`]: Self::reset_agents
/// [`step`]: Self::step
/// [`execute_actions`]: Self::execute_actions
/// [`start`]: Self::start
/// [`next`]: Self::next
/// [`run`]: Self::run
/// [`inject`]: Self::inject
/// [`state`]: Self::state
pub struct SupplyChainSim {
    params:   RunParameters,
    calendar: Calendar,
    horizon:  Tick,

    metrics:  Box<dyn Module>,
    modules:  Vec<Box<dyn Module>>,
    services: ServiceRegistry,

    context: Context,
    phase:   Phase,
    state:   Option<SimulationState>,
    backlog: Vec<Action>,

    episode_reward: f64,
    breakpoints:    BTreeSet<Tick>,
    profile:        TimeProfile,
}

impl SupplyChainSim {
    /// Resolve `params.profile` in `registry` and construct every module.
    pub fn new(registry: &ModuleRegistry, params: RunParameters) -> SimResult<Self> {
        SimBuilder::new(registry, params).build()
    }

    pub(crate) fn from_parts(
        params:      RunParameters,
        calendar:    Calendar,
        loaded:      LoadedModules,
        breakpoints: BTreeSet<Tick>,
        profile:     TimeProfile,
    ) -> Self {
        Self {
            horizon: Tick(params.time_horizon),
            params,
            calendar,
            metrics: loaded.metrics,
            modules: loaded.modules,
            services: loaded.services,
            context: Context::default(),
            phase: Phase::Ready,
            state: None,
            backlog: Vec::new(),
            episode_reward: 0.0,
            breakpoints,
            profile,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn horizon(&self) -> Tick {
        self.horizon
    }

    pub fn increment(&self) -> TimeIncrement {
        self.calendar.increment
    }

    /// The context of the current episode; empty before the first reset.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The internally held state, once [`start`](Self::start) has run.
    pub fn state(&self) -> Option<&SimulationState> {
        self.state.as_ref()
    }

    /// Network edges with their in-flight shipments; empty before start.
    pub fn edges(&self) -> &[Edge] {
        self.state.as_ref().map_or(&[], |s| s.network.edges())
    }

    /// Current clock of the internally held state.
    pub fn clock(&self) -> Tick {
        self.state.as_ref().map_or(Tick::ZERO, |s| s.clock)
    }

    /// Actions waiting for their scheduled tick.
    pub fn backlog(&self) -> &[Action] {
        &self.backlog
    }

    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    pub fn time_profile(&self) -> &TimeProfile {
        &self.profile
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Names of the configured modules, in profile order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Replace the set of ticks at which [`run`](Self::run) halts.
    pub fn set_breakpoints(&mut self, ticks: impl IntoIterator<Item = Tick>) {
        self.breakpoints = ticks.into_iter().collect();
    }

    // ── Low-level protocol ────────────────────────────────────────────────

    /// Build the episode context, network and initial state from the
    /// Environment modules.
    ///
    /// All context is collected first, then network contributions and
    /// initial state fragments, so environment order does not matter.
    pub fn get_initial_env_values(&mut self) -> SimResult<(Context, SimulationState)> {
        let start = Instant::now();

        let mut context = ContextBuilder::new();
        for module in &self.modules {
            if let Some(env) = module.as_environment() {
                debug!(module = module.name(), "collecting context");
                env.contribute_context(&mut context)?;
            }
        }
        let context = context.build();

        let mut network = NetworkBuilder::new();
        for module in &self.modules {
            if let Some(env) = module.as_environment() {
                env.contribute_network(&context, &mut network)?;
            }
        }
        let mut state = SimulationState::new(self.calendar.start, network.build()?);

        for module in &self.modules {
            if let Some(env) = module.as_environment() {
                debug!(module = module.name(), "collecting initial state");
                if let Some(fragment) = env.initial_state(&context)? {
                    state.modules.insert(module.name().to_owned(), fragment);
                }
            }
        }

        info!(
            resources = context.resources().len(),
            nodes = state.network.node_count(),
            edges = state.network.edge_count(),
            start = %state.date_time,
            "initial environment assembled"
        );

        self.context = context.clone();
        self.episode_reward = 0.0;
        self.profile.add("initial_env_values", start.elapsed());
        Ok((context, state))
    }

    /// Reset agents (in profile order), then metrics, then every signed-in
    /// service.  Moves the controller to [`Phase::Running`].
    pub fn reset_agents(&mut self, ctx: &Context, state: &mut SimulationState) -> SimResult<()> {
        for module in &mut self.modules {
            let name = module.name().to_owned();
            let Some(agent) = module.as_agent() else { continue };
            let start = Instant::now();
            debug!(module = %name, "resetting agent");
            if let Some(fragment) = agent.reset(ctx, state)? {
                state.modules.insert(name.clone(), fragment);
            }
            self.profile.add(&format!("{name} reset"), start.elapsed());
        }

        metrics_of(&mut self.metrics)?.reset(ctx, state)?;
        self.services.reset_signed_in_services(ctx)?;

        self.phase = if state.clock >= self.horizon { Phase::Terminated } else { Phase::Running };
        Ok(())
    }

    /// Advance the simulation by one tick.
    ///
    /// `backlog` holds actions carried over from earlier ticks; on return it
    /// holds those still not due.  On error it also keeps the failing action
    /// and every action not yet attempted, and the controller moves to
    /// [`Phase::Failed`].
    pub fn step(
        &mut self,
        state:   &mut SimulationState,
        backlog: &mut Vec<Action>,
    ) -> SimResult<StepReward> {
        if self.phase == Phase::Failed {
            return Err(RuntimeError::EpisodeFailed(state.clock).into());
        }
        if state.clock >= self.horizon {
            return Err(RuntimeError::EpisodeTerminated(state.clock).into());
        }
        let result = self.step_inner(state, backlog);
        if let Err(e) = &result {
            warn!(tick = %state.clock, error = %e, "tick failed");
            self.phase = Phase::Failed;
        }
        result
    }

    fn step_inner(
        &mut self,
        state:   &mut SimulationState,
        backlog: &mut Vec<Action>,
    ) -> SimResult<StepReward> {
        let now = state.clock;

        // ── ① Transit ─────────────────────────────────────────────────────
        let start = Instant::now();
        let arrived = state.network.advance_shipments();
        self.profile.add("transit", start.elapsed());
        if !arrived.is_empty() {
            debug!(tick = %now, count = arrived.len(), "shipments arrived");
        }

        // ── ② Agent rounds ────────────────────────────────────────────────
        //
        // After each agent the *whole* backlog is executed again, not only
        // that agent's new actions.
        let mut timestep = Reward::zero_for(self.context.resources());
        let metrics = metrics_of(&mut self.metrics)?;
        for module in &mut self.modules {
            let name = module.name().to_owned();
            let Some(agent) = module.as_agent() else { continue };

            let start = Instant::now();
            let actions = agent.compute_actions(state)?;
            self.profile.add(&format!("{name} compute_actions"), start.elapsed());
            debug!(module = %name, proposed = actions.len(), carried = backlog.len(), "agent round");
            backlog.extend(actions);

            let start = Instant::now();
            let reward = execute_due(metrics, backlog, state, &mut self.profile)?;
            self.profile.add("action_execution", start.elapsed());
            timestep += &reward;
        }

        // ── ③ Advance time ────────────────────────────────────────────────
        let start = Instant::now();
        let reward = metrics.compute_reward(state, &Action::advance_time(now))?;
        state.clock = now + 1;
        state.date_time = state.date_time.advanced(self.calendar.increment);
        self.profile.add("advance_time", start.elapsed());
        timestep += &reward;

        // ── ④ Episode reward ───────────────────────────────────────────────
        self.episode_reward += timestep.total;
        info!(
            tick = %state.clock,
            date_time = %state.date_time,
            timestep_reward = timestep.total,
            episode_reward = self.episode_reward,
            "step complete"
        );

        if state.clock >= self.horizon {
            self.phase = Phase::Terminated;
            self.profile.log();
        }

        Ok(StepReward { timestep, episode_total: self.episode_reward })
    }

    /// Execute the due actions in `actions` against `state`.
    ///
    /// Returns the not-yet-due remainder and the reward of the executed
    /// shipment-type actions.
    pub fn execute_actions(
        &mut self,
        actions: Vec<Action>,
        state:   &mut SimulationState,
    ) -> SimResult<(Vec<Action>, Reward)> {
        let metrics = metrics_of(&mut self.metrics)?;
        let mut backlog = actions;
        let reward = execute_due(metrics, &mut backlog, state, &mut self.profile)?;
        Ok((backlog, reward))
    }

    // ── High-level API ────────────────────────────────────────────────────

    /// Build the initial state, reset every agent and keep the state inside
    /// the controller.  Calling `start` again begins a fresh episode.
    pub fn start(&mut self) -> SimResult<&SimulationState> {
        info!(profile = %self.params.profile, horizon = %self.horizon, "simulation started");
        let (ctx, mut state) = self.get_initial_env_values()?;
        self.reset_agents(&ctx, &mut state)?;
        self.backlog.clear();
        Ok(self.state.insert(state))
    }

    /// Process one tick of the internally held state.
    pub fn next(&mut self) -> SimResult<StepReward> {
        match self.phase {
            Phase::Ready => return Err(RuntimeError::NotStarted.into()),
            Phase::Terminated => return Err(RuntimeError::EpisodeTerminated(self.clock()).into()),
            Phase::Failed => return Err(RuntimeError::EpisodeFailed(self.clock()).into()),
            Phase::Running => {}
        }
        let mut state = self.state.take().ok_or(RuntimeError::NotStarted)?;
        let mut backlog = mem::take(&mut self.backlog);
        let result = self.step(&mut state, &mut backlog);
        self.state = Some(state);
        self.backlog = backlog;
        result
    }

    /// Queue an action to be executed with the next agent round.
    pub fn inject(&mut self, action: Action) {
        debug!(kind = %action.kind, schedule = %action.schedule, "action injected");
        self.backlog.push(action);
    }

    /// Run to the horizon (starting the episode first if needed).
    ///
    /// Halts before any tick in the breakpoint set, except the tick the run
    /// resumed from.
    pub fn run(&mut self) -> SimResult<RunStatus> {
        self.run_with(&mut NoopObserver)
    }

    /// [`run`](Self::run) with observer callbacks at tick boundaries.
    pub fn run_with<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunStatus> {
        match self.phase {
            Phase::Ready => {
                self.start()?;
            }
            Phase::Failed => return Err(RuntimeError::EpisodeFailed(self.clock()).into()),
            Phase::Running | Phase::Terminated => {}
        }
        let resumed_at = self.clock();

        while self.phase == Phase::Running {
            let now = self.clock();
            if now != resumed_at && self.breakpoints.contains(&now) {
                info!(tick = %now, "breakpoint reached");
                return Ok(RunStatus::Breakpoint(now));
            }

            observer.on_tick_start(now);
            let reward = self.next()?;
            if let Some(state) = &self.state {
                observer.on_tick_end(now, state, &reward);
            }
        }

        if let Some(state) = &self.state {
            observer.on_sim_end(state.clock, state);
        }
        info!(episode_reward = self.episode_reward, "simulation completed");
        Ok(RunStatus::Completed)
    }
}

// ── Action execution ──────────────────────────────────────────────────────────

fn metrics_of(module: &mut Box<dyn Module>) -> SimResult<&mut dyn Metrics> {
    let name = module.name().to_owned();
    module
        .as_metrics()
        .ok_or_else(|| ConfigError::NotMetrics(name).into())
}

fn execute_due(
    metrics: &mut dyn Metrics,
    backlog: &mut Vec<Action>,
    state:   &mut SimulationState,
    profile: &mut TimeProfile,
) -> SimResult<Reward> {
    let mut reward = Reward::zero();
    let mut pending = mem::take(backlog).into_iter();

    while let Some(action) = pending.next() {
        if !action.is_due(state.clock) {
            backlog.push(action);
            continue;
        }
        match execute_one(metrics, action.clone(), state, profile) {
            Ok(r) => reward += &r,
            Err(e) => {
                backlog.push(action);
                backlog.extend(pending);
                return Err(e);
            }
        }
    }
    Ok(reward)
}

/// Execute one due action; shipment-type actions return their reward.
fn execute_one(
    metrics: &mut dyn Metrics,
    action:  Action,
    state:   &mut SimulationState,
    profile: &mut TimeProfile,
) -> SimResult<Reward> {
    if action.quantity < 0 {
        return Err(RuntimeError::NegativeQuantity {
            kind:     action.kind,
            quantity: action.quantity,
        }
        .into());
    }

    if let Some(kind) = OrderKind::from_action(action.kind) {
        create_order(state, kind, &action)?;
        Ok(Reward::zero())
    } else if action.kind.is_shipment() {
        let executed = create_shipment(state, action)?;
        let start = Instant::now();
        let reward = metrics.compute_reward(state, &executed)?;
        profile.add("metrics", start.elapsed());
        Ok(reward)
    } else {
        Err(RuntimeError::UnsupportedAction {
            kind:   action.kind,
            reason: "only the controller advances time",
        }
        .into())
    }
}

/// Create or replace an order.  An id already in use replaces that order.
fn create_order(state: &mut SimulationState, kind: OrderKind, action: &Action) -> SimResult<EntityId> {
    let resource = action.resource.clone().ok_or(RuntimeError::MissingField {
        kind:  action.kind,
        field: "resource",
    })?;

    let id = match action.id {
        Some(id) => {
            state.remove_order(id);
            state.ids.observe(id);
            id
        }
        None => state.ids.allocate(),
    };

    debug!(
        order = %id,
        kind = %action.kind,
        resource = %resource,
        quantity = action.quantity,
        "order placed"
    );
    let order = Order {
        id,
        kind,
        resource,
        quantity: action.quantity,
        origin: action.origin,
        destination: action.destination,
        schedule: action.schedule,
    };
    match kind {
        OrderKind::Customer => state.customer_orders.push(order),
        OrderKind::Purchase => state.purchase_orders.push(order),
    }
    Ok(id)
}

/// Turn a shipment-type action into an in-flight shipment.
///
/// Everything is validated before the state is touched; an invalid action
/// leaves orders, stock, edges and the id allocator as they were.  Returns
/// the action with its id filled in.
fn create_shipment(state: &mut SimulationState, mut action: Action) -> SimResult<Action> {
    let kind = action.kind;
    let missing = |field| RuntimeError::MissingField { kind, field };
    let resource = action.resource.clone().ok_or_else(|| missing("resource"))?;
    let origin = action.origin.ok_or_else(|| missing("origin"))?;
    let destination = action.destination.ok_or_else(|| missing("destination"))?;

    let mut request = Dispatch {
        id: action.id.unwrap_or(EntityId::INVALID),
        resource,
        origin,
        destination,
        quantity: action.quantity,
    };
    state.network.check_dispatch(&request)?;

    request.id = match action.id {
        Some(id) => {
            state.remove_order(id);
            state.ids.observe(id);
            id
        }
        None => state.ids.allocate(),
    };
    action.id = Some(request.id);
    state.network.dispatch(request)?;
    Ok(action)
}
