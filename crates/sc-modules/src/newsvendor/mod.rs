//! The newsvendor demo: one book, one store, one customer.
//!
//! ```text
//! Manufacturer ──2──▶ Newsvendor (1 on hand) ──2──▶ Customer
//! ```
//!
//! Each tick the customer orders a Poisson-distributed quantity, the buyer
//! tops the network up to a service-level target, the vendor ships every
//! purchase order at once and the fulfiller serves customer orders from the
//! closest store with enough stock.

mod accounting;
mod agents;
mod env;

pub use accounting::CashAccounting;
pub use agents::{ClosestStorageFulfillment, InfiniteVendor, PoissonCustomer, ServiceLevelBuying, poisson_quantile};
pub use env::{Selection, Topology};

/// The single resource simulated by default.
pub const DEFAULT_RESOURCE: &str = "9780465024759";

pub const MANUFACTURER: &str = "Manufacturer";
pub const NEWSVENDOR: &str = "Newsvendor";
pub const CUSTOMER: &str = "Customer";

// Module identifiers, as named in profiles.
pub const SELECTION: &str = "newsvendor.selection";
pub const TOPOLOGY: &str = "newsvendor.topology";
pub const POISSON_CUSTOMER: &str = "newsvendor.poisson_customer";
pub const SERVICE_LEVEL_BUYING: &str = "newsvendor.service_level_buying";
pub const INFINITE_VENDOR: &str = "newsvendor.infinite_vendor";
pub const CLOSEST_STORAGE_FULFILLMENT: &str = "newsvendor.closest_storage_fulfillment";
pub const CASH_ACCOUNTING: &str = "newsvendor.cash_accounting";

/// Stream offsets so the stochastic modules never share random draws.
pub(crate) const CUSTOMER_STREAM: u64 = 1;
pub(crate) const BUYING_STREAM: u64 = 2;
