//! The built-in module table, profiles and parameter presets.

use sc_core::{ResourceSelection, RunParameters};
use sc_module::{ModuleRegistry, Profile};

use crate::services::register_services;
use crate::{boxed, grid, newsvendor, ports};

pub const NEWSVENDOR_PROFILE: &str = "newsvendor_demo_profile";
pub const PORTS_PROFILE: &str = "ports_demo_profile";
pub const NATIONAL_GRID_PROFILE: &str = "national_grid_profile";
pub const NATIONAL_GRID_FLEET_PROFILE: &str = "national_grid_dynamic_profile";

pub fn newsvendor_profile() -> Profile {
    Profile::new(
        [newsvendor::CASH_ACCOUNTING],
        [
            newsvendor::SELECTION,
            newsvendor::TOPOLOGY,
            newsvendor::POISSON_CUSTOMER,
            newsvendor::SERVICE_LEVEL_BUYING,
            newsvendor::INFINITE_VENDOR,
            newsvendor::CLOSEST_STORAGE_FULFILLMENT,
        ],
    )
}

/// The newsvendor modules on the ports network, with the port's stock
/// spread over the warehouses before fulfillment runs.
pub fn ports_profile() -> Profile {
    Profile::new(
        [newsvendor::CASH_ACCOUNTING],
        [
            newsvendor::SELECTION,
            ports::TOPOLOGY,
            newsvendor::POISSON_CUSTOMER,
            newsvendor::SERVICE_LEVEL_BUYING,
            newsvendor::INFINITE_VENDOR,
            ports::EVEN_PLACEMENT,
            newsvendor::CLOSEST_STORAGE_FULFILLMENT,
        ],
    )
}

fn grid_profile(topology: &str) -> Profile {
    Profile::new(
        [grid::CASH_ACCOUNTING],
        [
            grid::SELECTION,
            topology,
            grid::FORECAST_SUPPLY,
            grid::CONSTANT_DEMAND,
            grid::CLOSEST_GATEWAY_FULFILLMENT,
            grid::BATTERY_DRAWDOWN,
            grid::BALANCE_EXCESS_DEMAND,
            grid::STORE_EXCESS_SUPPLY,
            grid::BALANCE_EXCESS_SUPPLY,
        ],
    )
}

pub fn national_grid_profile() -> Profile {
    grid_profile(grid::TOPOLOGY)
}

/// The national grid with a parameterised battery fleet.
pub fn national_grid_fleet_profile() -> Profile {
    grid_profile(grid::DYNAMIC_TOPOLOGY)
}

/// Newsvendor defaults on the ports network.  Transfers out of the port are
/// free.
pub fn ports_params() -> RunParameters {
    RunParameters { profile: PORTS_PROFILE.to_owned(), ..RunParameters::default() }.with_param("transfer_cost", 0.0)
}

/// One week of half-hourly national-grid ticks with every generation source.
pub fn national_grid_params() -> RunParameters {
    RunParameters {
        profile:            NATIONAL_GRID_PROFILE.to_owned(),
        time_increment:     "half-hourly".to_owned(),
        time_horizon:       336,
        resource_selection: ResourceSelection::Count(0),
        ..RunParameters::default()
    }
}

/// [`national_grid_params`] with a fleet of 25 batteries of 50 units each.
/// The fleet size feeds both the network and the amortised battery cost.
pub fn national_grid_fleet_params() -> RunParameters {
    RunParameters { profile: NATIONAL_GRID_FLEET_PROFILE.to_owned(), ..national_grid_params() }
        .with_param("num_batteries", 25)
        .with_param("max_battery_capacity", 50)
}

/// A registry holding every module, service and profile in this crate.
pub fn standard_registry() -> ModuleRegistry {
    use grid::*;
    use newsvendor::*;
    use ports::*;

    let mut registry = ModuleRegistry::new();
    register_services(registry.services_mut());

    registry
        // newsvendor
        .register_module(newsvendor::SELECTION, |p, _| boxed(Selection::from_params(p)?))
        .register_module(newsvendor::TOPOLOGY, |p, _| boxed(Topology::from_params(p)?))
        .register_module(POISSON_CUSTOMER, |p, _| boxed(PoissonCustomer::from_params(p)?))
        .register_module(SERVICE_LEVEL_BUYING, |p, _| boxed(ServiceLevelBuying::from_params(p)?))
        .register_module(INFINITE_VENDOR, |p, _| boxed(InfiniteVendor::from_params(p)?))
        .register_module(CLOSEST_STORAGE_FULFILLMENT, |p, _| {
            boxed(ClosestStorageFulfillment::from_params(p)?)
        })
        .register_module(newsvendor::CASH_ACCOUNTING, |p, s| boxed(CashAccounting::from_params(p, s)?))
        // ports
        .register_module(ports::TOPOLOGY, |p, _| boxed(PortsTopology::from_params(p)?))
        .register_module(EVEN_PLACEMENT, |p, _| boxed(EvenPortPlacement::from_params(p)?))
        // national grid
        .register_module(grid::SELECTION, |p, _| boxed(GridSelection::from_params(p)?))
        .register_module(grid::TOPOLOGY, |p, _| boxed(GridTopology::from_params(p)?))
        .register_module(DYNAMIC_TOPOLOGY, |p, _| boxed(GridTopology::fleet_from_params(p)?))
        .register_module(CONSTANT_SUPPLY, |p, _| boxed(ConstantSupply::from_params(p)?))
        .register_module(FORECAST_SUPPLY, |p, s| boxed(ForecastSupply::from_params(p, s)?))
        .register_module(CONSTANT_DEMAND, |p, _| boxed(ConstantDemand::from_params(p)?))
        .register_module(FORECAST_DEMAND, |p, s| boxed(ForecastDemand::from_params(p, s)?))
        .register_module(CLOSEST_GATEWAY_FULFILLMENT, |p, _| {
            boxed(ClosestGatewayFulfillment::from_params(p)?)
        })
        .register_module(BATTERY_DRAWDOWN, |p, s| boxed(BatteryDrawdown::from_params(p, s)?))
        .register_module(BALANCE_EXCESS_DEMAND, |p, s| boxed(BalanceExcessDemand::from_params(p, s)?))
        .register_module(STORE_EXCESS_SUPPLY, |p, _| boxed(StoreExcessSupply::from_params(p)?))
        .register_module(BALANCE_EXCESS_SUPPLY, |p, _| boxed(BalanceExcessSupply::from_params(p)?))
        .register_module(grid::CASH_ACCOUNTING, |p, _| boxed(GridCashAccounting::from_params(p)?))
        // profiles
        .register_profile(NEWSVENDOR_PROFILE, newsvendor_profile())
        .register_profile(PORTS_PROFILE, ports_profile())
        .register_profile(NATIONAL_GRID_PROFILE, national_grid_profile())
        .register_profile(NATIONAL_GRID_FLEET_PROFILE, national_grid_fleet_profile());

    registry
}
