//! Reward records.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::Serialize;

use sc_core::ResourceKind;

/// A reward with its per-resource breakdown.
///
/// `by_resource` need not sum to `total`: some rewards (fixed periodic costs,
/// for example) belong to no single resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Reward {
    pub total:       f64,
    pub by_resource: BTreeMap<ResourceKind, f64>,
}

impl Reward {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Zero reward with an explicit zero entry for every listed resource.
    pub fn zero_for<'a>(resources: impl IntoIterator<Item = &'a ResourceKind>) -> Self {
        Self {
            total:       0.0,
            by_resource: resources.into_iter().map(|r| (r.clone(), 0.0)).collect(),
        }
    }

    /// `amount`, attributed entirely to `resource`.
    pub fn for_resource(resource: impl Into<ResourceKind>, amount: f64) -> Self {
        let mut by_resource = BTreeMap::new();
        by_resource.insert(resource.into(), amount);
        Self { total: amount, by_resource }
    }

    /// Add `amount` to both the total and `resource`'s share.
    pub fn credit(&mut self, resource: &ResourceKind, amount: f64) {
        self.total += amount;
        *self.by_resource.entry(resource.clone()).or_insert(0.0) += amount;
    }

    /// The share attributed to `resource`; 0 when absent.
    pub fn of(&self, resource: &str) -> f64 {
        self.by_resource.get(resource).copied().unwrap_or(0.0)
    }
}

impl AddAssign<&Reward> for Reward {
    fn add_assign(&mut self, rhs: &Reward) {
        self.total += rhs.total;
        for (r, v) in &rhs.by_resource {
            *self.by_resource.entry(r.clone()).or_insert(0.0) += v;
        }
    }
}

/// What one call to `step` returns.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StepReward {
    pub timestep:      Reward,
    /// Running sum of every timestep total so far in this episode.
    pub episode_total: f64,
}
