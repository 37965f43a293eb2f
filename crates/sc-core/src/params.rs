//! Run parameters shared by every module constructor.
//!
//! The well-known keys are typed fields; anything else a module wants to read
//! (`customer_max_mean`, `holding_cost`, …) lives in the flattened `extra`
//! map and is fetched with [`RunParameters::get_or`].
//!
//! ```json
//! {
//!   "profile": "newsvendor_demo_profile",
//!   "simulation_seed": 12345,
//!   "start_date": "2019-01-01",
//!   "time_increment": "daily",
//!   "time_horizon": 100,
//!   "resource_selection": 1,
//!   "customer_max_mean": 10
//! }
//! ```

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CoreError, CoreResult, DateTime, TimeIncrement};

/// Which resource kinds a run simulates.
///
/// An explicit list is used verbatim; an integer is a code interpreted by the
/// Environment module that owns resource selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceSelection {
    Count(u32),
    Explicit(Vec<String>),
}

impl Default for ResourceSelection {
    fn default() -> Self {
        ResourceSelection::Count(1)
    }
}

/// Flat configuration object passed to every module constructor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    /// Name (or path) of the profile listing the modules to load.
    pub profile: String,

    /// Master seed.  The same seed always produces identical episodes.
    pub simulation_seed: u64,

    /// `YYYY-MM-DD`; midnight UTC of this day is the wall-clock time of tick 0.
    pub start_date: String,

    /// `"daily"`, `"hourly"` or `"half-hourly"`.
    pub time_increment: String,

    /// Number of ticks in one episode.
    pub time_horizon: u64,

    pub resource_selection: ResourceSelection,

    /// Module-specific keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            profile:            "newsvendor_demo_profile".to_owned(),
            simulation_seed:    12_345,
            start_date:         "2019-01-01".to_owned(),
            time_increment:     "daily".to_owned(),
            time_horizon:       100,
            resource_selection: ResourceSelection::default(),
            extra:              BTreeMap::new(),
        }
    }
}

impl RunParameters {
    /// Parse a JSON object; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set a module-specific key (builder style).
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_owned(), value.into());
        self
    }

    /// Read a module-specific key, falling back to `default` when absent.
    ///
    /// A present key of the wrong shape is an error rather than a silent
    /// fallback.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> CoreResult<T> {
        match self.extra.get(key) {
            None => Ok(default),
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| CoreError::InvalidParameter {
                name:   key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    /// The parsed tick length.
    pub fn increment(&self) -> CoreResult<TimeIncrement> {
        self.time_increment.parse()
    }

    /// The parsed wall-clock time of tick 0.
    pub fn start(&self) -> CoreResult<DateTime> {
        DateTime::parse_date(&self.start_date)
    }
}
