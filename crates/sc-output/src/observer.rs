//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use sc_core::Tick;
use sc_module::{SimulationState, StepReward};
use sc_sim::SimObserver;

use crate::row::{InventoryRow, RewardRow, TOTAL};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes per-tick rewards and inventory snapshots to
/// any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run_with()` returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:             W,
    inventory_interval: u64,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer` that snapshots inventory after
    /// every tick.
    pub fn new(writer: W) -> Self {
        Self { writer, inventory_interval: 1, last_error: None }
    }

    /// Snapshot inventory only after ticks divisible by `every` (builder
    /// style).  Zero is treated as one.
    pub fn inventory_every(mut self, every: u64) -> Self {
        self.inventory_interval = every.max(1);
        self
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

fn reward_rows(tick: Tick, state: &SimulationState, reward: &StepReward) -> Vec<RewardRow> {
    let date_time = state.date_time.to_string();
    let row = |resource: &str, timestep: f64| RewardRow {
        tick: tick.0,
        date_time: date_time.clone(),
        resource: resource.to_owned(),
        timestep,
        episode_total: reward.episode_total,
    };

    let mut rows = Vec::with_capacity(1 + reward.timestep.by_resource.len());
    rows.push(row(TOTAL, reward.timestep.total));
    rows.extend(reward.timestep.by_resource.iter().map(|(r, v)| row(r.as_str(), *v)));
    rows
}

fn inventory_rows(tick: Tick, state: &SimulationState) -> Vec<InventoryRow> {
    state
        .network
        .nodes()
        .filter_map(|(_, node)| Some((node, node.inventory()?)))
        .flat_map(|(node, stock)| {
            stock.iter().map(move |(resource, &on_hand)| InventoryRow {
                tick: tick.0,
                node: node.name.clone(),
                resource: resource.as_str().to_owned(),
                on_hand,
            })
        })
        .collect()
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, state: &SimulationState, reward: &StepReward) {
        let result = self.writer.write_rewards(&reward_rows(tick, state, reward));
        self.store_err(result);

        if tick.0 % self.inventory_interval == 0 {
            let rows = inventory_rows(tick, state);
            if !rows.is_empty() {
                let result = self.writer.write_inventory(&rows);
                self.store_err(result);
            }
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, _state: &SimulationState) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
