//! Services shared by the demo modules.
//!
//! Each lives in its own namespace with exactly one implementation, so
//! [`ServiceRegistry::load`] resolves it unambiguously.

use tracing::debug;

use sc_core::{DateTime, Quantity, ResourceKind, RunParameters};
use sc_module::{Context, RuntimeError, Service, ServiceRegistry, SimResult};

pub const HOLDING_COST: &str = "holding_cost";
pub const SUPPLY_FORECAST: &str = "electricity_supply_forecast";
pub const DEMAND_FORECAST: &str = "electricity_demand_forecast";

/// Add every demo service to `registry`'s catalog.
pub fn register_services(registry: &mut ServiceRegistry) {
    registry
        .register(HOLDING_COST, "HoldingCost", HoldingCost::from_params)
        .register(SUPPLY_FORECAST, "ElectricitySupplyForecast", ElectricitySupplyForecast::from_params)
        .register(DEMAND_FORECAST, "ElectricityDemandForecast", ElectricityDemandForecast::from_params);
}

fn ensure_known(resources: &[ResourceKind], resource: &str) -> SimResult<()> {
    if resources.iter().any(|r| r.as_str() == resource) {
        Ok(())
    } else {
        Err(RuntimeError::UnknownResource(resource.to_owned()).into())
    }
}

// ── Holding cost ──────────────────────────────────────────────────────────────

/// Per-unit, per-tick cost of keeping a resource in storage.
///
/// Run parameter `holding_cost` (default 0.5) applies to every resource.
pub struct HoldingCost {
    per_unit:  f64,
    resources: Vec<ResourceKind>,
}

impl HoldingCost {
    pub const DEFAULT: f64 = 0.5;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self { per_unit: params.get_or("holding_cost", Self::DEFAULT)?, resources: Vec::new() })
    }

    /// Cost of holding one unit of `resource` for one tick.
    pub fn cost(&self, resource: &str) -> SimResult<f64> {
        ensure_known(&self.resources, resource)?;
        Ok(self.per_unit)
    }
}

impl Service for HoldingCost {
    fn name(&self) -> &str {
        HOLDING_COST
    }

    fn reset(&mut self, ctx: &Context) -> SimResult<()> {
        debug!("resetting holding cost service");
        if self.resources.as_slice() != ctx.resources() {
            self.resources = ctx.resources().to_vec();
        }
        Ok(())
    }
}

// ── Electricity forecasts ─────────────────────────────────────────────────────

/// Forecast output of each generation source.
///
/// Deterministic: the same `(resource, time)` always yields the same value.
pub struct ElectricitySupplyForecast {
    amount:    Quantity,
    resources: Vec<ResourceKind>,
}

impl ElectricitySupplyForecast {
    pub const DEFAULT: Quantity = 10;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self {
            amount:    params.get_or("supply_forecast_amount", Self::DEFAULT)?,
            resources: Vec::new(),
        })
    }

    pub fn forecast(&self, resource: &str, _at: DateTime) -> SimResult<Quantity> {
        ensure_known(&self.resources, resource)?;
        Ok(self.amount)
    }
}

impl Service for ElectricitySupplyForecast {
    fn name(&self) -> &str {
        SUPPLY_FORECAST
    }

    fn reset(&mut self, ctx: &Context) -> SimResult<()> {
        debug!("resetting electricity supply forecast service");
        if self.resources.as_slice() != ctx.resources() {
            self.resources = ctx.resources().to_vec();
        }
        Ok(())
    }
}

/// Forecast total electricity demand.  Deterministic in time.
pub struct ElectricityDemandForecast {
    amount: Quantity,
}

impl ElectricityDemandForecast {
    pub const DEFAULT: Quantity = 40;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        Ok(Self { amount: params.get_or("demand_forecast_amount", Self::DEFAULT)? })
    }

    pub fn forecast(&self, _at: DateTime) -> Quantity {
        self.amount
    }
}

impl Service for ElectricityDemandForecast {
    fn name(&self) -> &str {
        DEMAND_FORECAST
    }
}
