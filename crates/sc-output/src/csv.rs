//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `rewards.csv`
//! - `inventory.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{InventoryRow, OutputResult, RewardRow};

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    rewards:   Writer<File>,
    inventory: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the two CSV files in it and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut rewards = Writer::from_path(dir.join("rewards.csv"))?;
        rewards.write_record(["tick", "date_time", "resource", "timestep_reward", "episode_total"])?;

        let mut inventory = Writer::from_path(dir.join("inventory.csv"))?;
        inventory.write_record(["tick", "node", "resource", "on_hand"])?;

        Ok(Self { rewards, inventory, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_rewards(&mut self, rows: &[RewardRow]) -> OutputResult<()> {
        for row in rows {
            self.rewards.write_record(&[
                row.tick.to_string(),
                row.date_time.clone(),
                row.resource.clone(),
                row.timestep.to_string(),
                row.episode_total.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_inventory(&mut self, rows: &[InventoryRow]) -> OutputResult<()> {
        for row in rows {
            self.inventory.write_record(&[
                row.tick.to_string(),
                row.node.clone(),
                row.resource.clone(),
                row.on_hand.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rewards.flush()?;
        self.inventory.flush()?;
        Ok(())
    }
}
