//! Resource kinds and quantities.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Signed whole-unit quantity.
///
/// Signed because balancing nodes may hold negative stock; actions reject
/// negative values at execution time.
pub type Quantity = i64;

/// Convert a floating-point amount (forecasts, quantiles) into a [`Quantity`].
///
/// Fails with [`CoreError::NonIntegralQuantity`] when `value` has a
/// fractional part or is not finite.  Callers that want rounding must round
/// first.
pub fn quantity_from_f64(value: f64) -> CoreResult<Quantity> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(CoreError::NonIntegralQuantity(value));
    }
    Ok(value as Quantity)
}

/// The kind of good or commodity moving through the network (a product code,
/// a generation type, `"electricity"`, …).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(String);

impl ResourceKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceKind {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ResourceKind {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for ResourceKind {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
