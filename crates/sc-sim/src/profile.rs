//! Wall-clock time spent per controller phase.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::info;

/// Accumulated wall-clock time per named phase (`"transit"`,
/// `"action_execution"`, `"<agent> compute_actions"`, …).
#[derive(Clone, Debug, Default)]
pub struct TimeProfile {
    phases: BTreeMap<String, Duration>,
    created: Option<Instant>,
}

impl TimeProfile {
    pub fn new() -> Self {
        Self { phases: BTreeMap::new(), created: Some(Instant::now()) }
    }

    pub fn add(&mut self, phase: &str, elapsed: Duration) {
        *self.phases.entry(phase.to_owned()).or_default() += elapsed;
    }

    /// Time `f`, charging it to `phase`.
    pub fn measure<T>(&mut self, phase: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.add(phase, start.elapsed());
        out
    }

    pub fn get(&self, phase: &str) -> Duration {
        self.phases.get(phase).copied().unwrap_or_default()
    }

    pub fn phases(&self) -> impl Iterator<Item = (&str, Duration)> + '_ {
        self.phases.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum over all measured phases.
    pub fn total_measured(&self) -> Duration {
        self.phases.values().sum()
    }

    /// Log every phase at `info` level.
    pub fn log(&self) {
        for (phase, d) in &self.phases {
            info!(phase = %phase, secs = d.as_secs_f64(), "time profile");
        }
        let total = self.created.map(|c| c.elapsed()).unwrap_or_default();
        info!(
            measured_secs = self.total_measured().as_secs_f64(),
            total_secs = total.as_secs_f64(),
            "time profile total"
        );
    }
}
