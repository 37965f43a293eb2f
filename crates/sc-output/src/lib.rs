//! `sc-output` — simulation output writers for the rust_sc simulator.
//!
//! | Backend | Files created                      |
//! |---------|------------------------------------|
//! | CSV     | `rewards.csv`, `inventory.csv`     |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `sc_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sc_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run_with(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{InventoryRow, RewardRow, TOTAL};
pub use writer::OutputWriter;
