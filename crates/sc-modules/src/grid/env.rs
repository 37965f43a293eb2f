use tracing::debug;

use sc_core::{CoreError, GeoPoint, Quantity, ResourceKind, ResourceSelection, RunParameters};
use sc_module::{ConfigError, Context, ContextBuilder, Environment, Module, SimResult};
use sc_network::{NetworkBuilder, Node};

use super::{
    BALANCE_SINK, BALANCE_SOURCE, BATTERY, BATTERY_2, CONSUMERS, ELECTRICITY, FOSSIL_GAS, SOLAR,
    SUBSTATION, WIND_ONSHORE,
};

/// Generation sources: node name, resource kind, location.
const SOURCES: [(&str, &str, GeoPoint); 3] = [
    ("Solar", SOLAR, GeoPoint::new(50.485_070_023_807_836, -3.762_590_485_010_641_7)),
    ("Wind Onshore", WIND_ONSHORE, GeoPoint::new(56.950_159_783_641_87, -4.369_099_752_793_398)),
    ("Fossil Gas", FOSSIL_GAS, GeoPoint::new(52.488_385_098_108_71, -3.472_611_507_984_427_5)),
];

/// Chooses the generation types to simulate, plus `electricity`.
///
/// `resource_selection = 0` picks every supported source; an explicit list
/// is used verbatim.  Any other code is rejected.
pub struct GridSelection {
    resources: Vec<ResourceKind>,
}

impl GridSelection {
    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        let mut resources: Vec<ResourceKind> = match &params.resource_selection {
            ResourceSelection::Count(0) => SOURCES.iter().map(|(_, r, _)| ResourceKind::from(*r)).collect(),
            ResourceSelection::Explicit(list) => list.iter().map(|r| ResourceKind::from(r.as_str())).collect(),
            ResourceSelection::Count(n) => {
                return Err(ConfigError::ResourceSelection(format!(
                    "the national grid takes every source (code 0) or an explicit list, not code {n}"
                ))
                .into());
            }
        };
        if !resources.iter().any(|r| r.as_str() == ELECTRICITY) {
            resources.push(ResourceKind::from(ELECTRICITY));
        }
        debug!(?resources, "electricity sources selected");
        Ok(Self { resources })
    }
}

impl Module for GridSelection {
    fn name(&self) -> &str {
        "resource_selection"
    }
    fn as_environment(&self) -> Option<&dyn Environment> {
        Some(self)
    }
}

impl Environment for GridSelection {
    fn contribute_context(&self, ctx: &mut ContextBuilder) -> SimResult<()> {
        ctx.set_resources(self.name(), self.resources.clone())
    }
}

/// One battery of the storage fleet.
#[derive(Clone, Debug)]
struct Battery {
    name:     String,
    location: GeoPoint,
    charge:   Quantity,
    capacity: Quantity,
}

/// The grid network.  Sources whose resource kind was not selected are left
/// out.
///
/// [`from_params`](Self::from_params) builds the two-battery reference grid;
/// [`fleet_from_params`](Self::fleet_from_params) builds `num_batteries`
/// identical batteries, all wired to the substation both ways.
pub struct GridTopology {
    initial_inventory: Quantity,
    transit_time:      u32,
    batteries:         Vec<Battery>,
}

impl GridTopology {
    pub const DEFAULT_INITIAL_INVENTORY: Quantity = 0;
    pub const DEFAULT_TRANSIT_TIME: u32 = 1;

    pub const DEFAULT_NUM_BATTERIES: u32 = 25;
    pub const DEFAULT_MAX_BATTERY_CAPACITY: Quantity = 50;

    /// Batteries start this fraction full unless `init_battery_capacity` is set.
    const DEFAULT_INITIAL_CHARGE_FRACTION: f64 = 0.2;

    pub fn from_params(params: &RunParameters) -> SimResult<Self> {
        let batteries = vec![
            Battery {
                name:     BATTERY.to_owned(),
                location: GeoPoint::new(51.429_278_171_678_41, -1.554_903_127_917_088_4),
                charge:   100,
                capacity: 200,
            },
            Battery {
                name:     BATTERY_2.to_owned(),
                location: GeoPoint::new(55.0, -2.0),
                charge:   10,
                capacity: 100,
            },
        ];
        Self::with_batteries(params, batteries)
    }

    /// A fleet of identical batteries sized by `num_batteries`,
    /// `max_battery_capacity` and `init_battery_capacity`.
    pub fn fleet_from_params(params: &RunParameters) -> SimResult<Self> {
        let count: u32 = params.get_or("num_batteries", Self::DEFAULT_NUM_BATTERIES)?;
        let capacity: Quantity = params.get_or("max_battery_capacity", Self::DEFAULT_MAX_BATTERY_CAPACITY)?;
        let default_charge = (capacity as f64 * Self::DEFAULT_INITIAL_CHARGE_FRACTION).floor() as Quantity;
        let charge: Quantity = params.get_or("init_battery_capacity", default_charge)?;
        if capacity < 0 || !(0..=capacity).contains(&charge) {
            return Err(CoreError::InvalidParameter {
                name:   "init_battery_capacity".to_owned(),
                reason: format!("initial charge {charge} must lie within 0..={capacity}"),
            }
            .into());
        }

        // Laid out in rows of ten, west to east then north to south.
        let batteries = (0..count)
            .map(|i| Battery {
                name:     format!("{BATTERY}{i}"),
                location: GeoPoint::new(51.0 - 0.4 * f64::from(i / 10), -3.0 + 0.4 * f64::from(i % 10)),
                charge,
                capacity,
            })
            .collect();
        Self::with_batteries(params, batteries)
    }

    fn with_batteries(params: &RunParameters, batteries: Vec<Battery>) -> SimResult<Self> {
        Ok(Self {
            initial_inventory: params.get_or("initial_inventory", Self::DEFAULT_INITIAL_INVENTORY)?,
            transit_time:      params.get_or("transit_time", Self::DEFAULT_TRANSIT_TIME)?,
            batteries,
        })
    }

    pub fn battery_count(&self) -> usize {
        self.batteries.len()
    }
}

impl Module for GridTopology {
    fn name(&self) -> &str {
        "network"
    }
    fn as_environment(&self) -> Option<&dyn Environment> {
        Some(self)
    }
}

impl Environment for GridTopology {
    fn contribute_network(&self, ctx: &Context, network: &mut NetworkBuilder) -> SimResult<()> {
        let transit = self.transit_time;

        for (name, resource, location) in SOURCES {
            if ctx.has_resource(resource) {
                network.add_node(Node::vendor(name, location, [resource]));
                network.add_edge(name, SUBSTATION, transit);
            }
        }
        network.add_node(Node::vendor(
            BALANCE_SOURCE,
            GeoPoint::new(54.107_893_307_767_526, -0.682_730_344_867_781_3),
            [ELECTRICITY],
        ));

        let mut substation =
            Node::gateway(SUBSTATION, GeoPoint::new(53.021_515_418_732_39, -1.475_919_780_694_84)).allowing_negative();
        for r in ctx.resources() {
            substation = substation.with_stock(r.clone(), self.initial_inventory);
        }
        network.add_node(substation);

        for battery in &self.batteries {
            network.add_node(
                Node::storage(battery.name.clone(), battery.location)
                    .with_stock(ELECTRICITY, battery.charge)
                    .with_capacity(ELECTRICITY, battery.capacity),
            );
            network
                .add_edge(SUBSTATION, battery.name.clone(), transit)
                .add_edge(battery.name.clone(), SUBSTATION, transit);
        }
        debug!(batteries = self.batteries.len(), "battery fleet placed");

        network.add_node(Node::customer(CONSUMERS, GeoPoint::new(51.633_920_790_187_155, -0.175_637_809_006_059_35)));
        network.add_node(Node::customer(BALANCE_SINK, GeoPoint::new(52.533_587_568_726_71, 1.074_088_760_318_544_7)));

        network
            .add_edge(SUBSTATION, CONSUMERS, transit)
            .add_edge(BALANCE_SOURCE, SUBSTATION, transit)
            .add_edge(SUBSTATION, BALANCE_SINK, transit);
        Ok(())
    }
}
