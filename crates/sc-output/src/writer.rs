//! The `OutputWriter` trait implemented by backend writers.

use crate::{InventoryRow, OutputResult, RewardRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective; errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write the reward rows of one tick.
    fn write_rewards(&mut self, rows: &[RewardRow]) -> OutputResult<()>;

    /// Write a batch of inventory rows.
    fn write_inventory(&mut self, rows: &[InventoryRow]) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
