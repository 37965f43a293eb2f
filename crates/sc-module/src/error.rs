//! Simulation error types.
//!
//! Every failure is fatal.  The split between [`ConfigError`] and
//! [`RuntimeError`] tells the caller whether the run was mis-assembled
//! (detected at construction or reset) or hit an invalid state while stepping.

use thiserror::Error;

use sc_core::{CoreError, Quantity, Tick};
use sc_network::NetworkError;

use crate::ActionKind;

/// Problems with how a run was put together.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("exactly one metrics module is required, {0} configured")]
    MetricsCount(usize),

    #[error("module {0:?} is listed as metrics but does not implement Metrics")]
    NotMetrics(String),

    #[error("no module registered under {0:?}")]
    UnknownModule(String),

    #[error("profile {name:?} could not be loaded: {reason}")]
    Profile { name: String, reason: String },

    #[error("service namespace {namespace:?} must hold exactly one implementation, found {found}")]
    ServiceResolution { namespace: String, found: usize },

    #[error("service {namespace:?} is not a {expected}")]
    ServiceType { namespace: String, expected: &'static str },

    #[error("context entry {name:?} contributed by both {first:?} and {second:?}")]
    DuplicateContext { name: String, first: String, second: String },

    #[error("context entry {name:?}: {reason}")]
    Context { name: String, reason: String },

    #[error("resource selection rejected: {0}")]
    ResourceSelection(String),
}

/// Invalid requests or states encountered while stepping.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{kind} action has negative quantity {quantity}")]
    NegativeQuantity { kind: ActionKind, quantity: Quantity },

    #[error("{kind} action is not supported here: {reason}")]
    UnsupportedAction { kind: ActionKind, reason: &'static str },

    #[error("{kind} action is missing its {field}")]
    MissingField { kind: ActionKind, field: &'static str },

    #[error("resource {0:?} is not simulated in this episode")]
    UnknownResource(String),

    #[error("simulation has not been started")]
    NotStarted,

    #[error("episode already reached its horizon at {0}")]
    EpisodeTerminated(Tick),

    #[error("episode failed during tick {0}; start a new episode")]
    EpisodeFailed(Tick),
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SimError {
    /// `true` when the run was mis-configured, `false` for step-time failures.
    pub fn is_config(&self) -> bool {
        match self {
            SimError::Config(_)  => true,
            SimError::Runtime(_) => false,
            SimError::Network(e) => e.is_config(),
            SimError::Core(e)    => e.is_config(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
