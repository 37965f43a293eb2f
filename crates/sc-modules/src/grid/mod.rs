//! The national-grid demo.
//!
//! ```text
//!   Solar ─┐                          ┌──▶ Consumers
//!   Wind  ─┼──▶ Substation (gateway) ─┼──▶ Balance Sink
//!   Gas   ─┤        ▲   │  ▲   │      │
//!   Balance Source ─┘   ▼  │   ▼
//!                   Battery  Battery2
//! ```
//!
//! Generation sources ship their own resource kinds into the substation.
//! Consumers draw generic `electricity`, which the substation may owe
//! (negative holdings are allowed).  Batteries and the balance mechanism keep
//! the substation's electricity balance near zero.

mod accounting;
mod balance;
mod demand;
mod env;
mod supply;

pub use accounting::GridCashAccounting;
pub use balance::{BalanceExcessDemand, BalanceExcessSupply, BatteryDrawdown, StoreExcessSupply};
pub use demand::{ClosestGatewayFulfillment, ConstantDemand, ForecastDemand};
pub use env::{GridSelection, GridTopology};
pub use supply::{ConstantSupply, ForecastSupply};

pub const ELECTRICITY: &str = "electricity";
pub const SOLAR: &str = "solar";
pub const WIND_ONSHORE: &str = "wind_onshore";
pub const FOSSIL_GAS: &str = "fossil_gas";

pub const SUBSTATION: &str = "Substation";
/// Also the name prefix of a battery fleet: `Battery0`, `Battery1`, ...
pub const BATTERY: &str = "Battery";
pub const BATTERY_2: &str = "Battery2";
pub const CONSUMERS: &str = "Consumers";
pub const BALANCE_SOURCE: &str = "Balance Source";
pub const BALANCE_SINK: &str = "Balance Sink";

// Module identifiers, as named in profiles.
pub const SELECTION: &str = "grid.selection";
pub const TOPOLOGY: &str = "grid.topology";
pub const DYNAMIC_TOPOLOGY: &str = "grid.dynamic_topology";
pub const CONSTANT_SUPPLY: &str = "grid.constant_supply";
pub const FORECAST_SUPPLY: &str = "grid.forecast_supply";
pub const CONSTANT_DEMAND: &str = "grid.constant_demand";
pub const FORECAST_DEMAND: &str = "grid.forecast_demand";
pub const CLOSEST_GATEWAY_FULFILLMENT: &str = "grid.closest_gateway_fulfillment";
pub const BATTERY_DRAWDOWN: &str = "grid.battery_drawdown";
pub const BALANCE_EXCESS_DEMAND: &str = "grid.balance_excess_demand";
pub const STORE_EXCESS_SUPPLY: &str = "grid.store_excess_supply";
pub const BALANCE_EXCESS_SUPPLY: &str = "grid.balance_excess_supply";
pub const CASH_ACCOUNTING: &str = "grid.cash_accounting";
