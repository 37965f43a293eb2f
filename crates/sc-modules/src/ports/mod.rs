//! The ports demo: imported goods land at a port and are spread over three
//! warehouses before reaching the customer.
//!
//! ```text
//!                                        ┌──2──▶ Iowa Warehouse ────────1──┐
//! Beijing Manufacturer ──7──▶ Seattle Port ──3──▶ Kansas City Warehouse ─2─┼──▶ Chicago Customer
//!                                        └──0──▶ Seattle Warehouse ─────4──┘
//! ```
//!
//! Reuses the newsvendor selection, customer, buying, vendor, fulfillment
//! and accounting modules; only the network and the port placement are
//! specific to this demo.

mod env;
mod placement;

pub use env::PortsTopology;
pub use placement::EvenPortPlacement;

pub const MANUFACTURER: &str = "Beijing Manufacturer";
pub const PORT: &str = "Seattle Port";
pub const IOWA_WAREHOUSE: &str = "Iowa Warehouse";
pub const KANSAS_CITY_WAREHOUSE: &str = "Kansas City Warehouse";
pub const SEATTLE_WAREHOUSE: &str = "Seattle Warehouse";
pub const CUSTOMER: &str = "Chicago Customer";

// Module identifiers, as named in profiles.
pub const TOPOLOGY: &str = "ports.topology";
pub const EVEN_PLACEMENT: &str = "ports.even_placement";
